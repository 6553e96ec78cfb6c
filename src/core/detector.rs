//! Anomaly evaluation
//!
//! Pure decision logic: given the stored baseline and a fresh observation,
//! decide whether the cycle-over-cycle change clears the subscriber's
//! threshold. The comparison is always a single cycle-to-cycle delta —
//! small consecutive moves never accumulate, because the caller advances
//! the baseline after every evaluation regardless of the outcome.

use crate::core::types::{AnomalyDecision, Observation};

/// Absolute relative change between two values, in percent
///
/// Returns 0.0 when the previous value is zero (the change is undefined
/// and must not raise).
#[inline]
pub fn change_percent(previous: f64, current: f64) -> f64 {
    if previous == 0.0 {
        return 0.0;
    }
    ((current - previous) / previous).abs() * 100.0
}

/// Evaluate one observation against its baseline
///
/// Rules:
/// - No baseline → seed only: never fires, change is 0.0
/// - Baseline of exactly 0.0 → never fires (division guard)
/// - Otherwise fires when the change meets or exceeds the threshold
///   (the exact boundary counts as an anomaly)
pub fn evaluate(
    previous: Option<f64>,
    current: &Observation,
    threshold_percent: f64,
) -> AnomalyDecision {
    let change = previous
        .map(|prev| change_percent(prev, current.value))
        .unwrap_or(0.0);

    let fired = match previous {
        Some(prev) if prev != 0.0 => change >= threshold_percent,
        _ => false,
    };

    AnomalyDecision {
        fired,
        symbol: current.symbol.clone(),
        change_percent: change,
        previous_value: previous,
        current_value: current.value,
        timestamp: current.timestamp,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn obs(value: f64) -> Observation {
        Observation::now("SBER", value)
    }

    #[test]
    fn test_first_observation_seeds_without_firing() {
        let decision = evaluate(None, &obs(100.0), 5.0);
        assert!(!decision.fired);
        assert_eq!(decision.change_percent, 0.0);
        assert_eq!(decision.previous_value, None);
        assert_eq!(decision.current_value, 100.0);
    }

    #[test]
    fn test_change_above_threshold_fires() {
        let decision = evaluate(Some(100.0), &obs(106.0), 5.0);
        assert!(decision.fired);
        assert!((decision.change_percent - 6.0).abs() < 1e-9);
        assert_eq!(decision.previous_value, Some(100.0));
    }

    #[test]
    fn test_exact_threshold_fires() {
        let decision = evaluate(Some(100.0), &obs(105.0), 5.0);
        assert!(decision.fired, "boundary is inclusive");
        assert!((decision.change_percent - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_change_below_threshold_does_not_fire() {
        let decision = evaluate(Some(106.0), &obs(107.0), 5.0);
        assert!(!decision.fired);
        assert!(decision.change_percent < 1.0);
    }

    #[test]
    fn test_drop_fires_same_as_rise() {
        let decision = evaluate(Some(100.0), &obs(94.0), 5.0);
        assert!(decision.fired);
        assert!((decision.change_percent - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_previous_never_fires() {
        let decision = evaluate(Some(0.0), &obs(1_000_000.0), 0.001);
        assert!(!decision.fired);
        assert_eq!(decision.change_percent, 0.0);
    }

    #[test]
    fn test_change_percent_zero_previous() {
        assert_eq!(change_percent(0.0, 42.0), 0.0);
    }

    proptest! {
        /// fired ⟺ |cur − prev| / prev * 100 ≥ threshold, for non-zero previous
        #[test]
        fn prop_fires_iff_change_clears_threshold(
            prev in 0.01f64..10_000.0,
            cur in 0.0f64..10_000.0,
            threshold in 0.01f64..50.0,
        ) {
            let decision = evaluate(Some(prev), &obs(cur), threshold);
            let expected = ((cur - prev) / prev).abs() * 100.0 >= threshold;
            prop_assert_eq!(decision.fired, expected);
        }

        /// A seeding evaluation never fires, whatever the values
        #[test]
        fn prop_seed_never_fires(cur in -10_000.0f64..10_000.0, threshold in 0.0f64..100.0) {
            prop_assert!(!evaluate(None, &obs(cur), threshold).fired);
        }
    }
}
