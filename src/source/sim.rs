//! Simulated quote source
//!
//! Random-walk price generator used by the binary when no live market
//! backend is wired in, and by tests that need a source with controllable
//! failure behavior. Each symbol walks independently from a common start
//! value; steps are uniform within ±`step_percent` of the current value.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use rand::Rng;

use crate::core::types::Observation;
use crate::source::errors::{FetchError, FetchResult};
use crate::source::traits::QuoteSource;

/// Default starting value for a symbol never seen before
const DEFAULT_START_VALUE: f64 = 100.0;

/// Default maximum per-fetch step, as a percentage of the current value
const DEFAULT_STEP_PERCENT: f64 = 1.0;

/// In-process random-walk quote source
pub struct SimulatedSource {
    start_value: f64,
    step_percent: f64,
    /// Symbols that always fail with `TransientUnavailable`
    failing: HashSet<String>,
    /// Current walk position per symbol
    values: Mutex<HashMap<String, f64>>,
}

impl SimulatedSource {
    pub fn new() -> Self {
        Self {
            start_value: DEFAULT_START_VALUE,
            step_percent: DEFAULT_STEP_PERCENT,
            failing: HashSet::new(),
            values: Mutex::new(HashMap::new()),
        }
    }

    /// Set the starting value for unseen symbols
    pub fn with_start_value(mut self, value: f64) -> Self {
        self.start_value = value;
        self
    }

    /// Set the maximum step size as a percentage of the current value
    pub fn with_step_percent(mut self, percent: f64) -> Self {
        self.step_percent = percent;
        self
    }

    /// Mark a symbol as permanently unavailable
    pub fn with_failing_symbol(mut self, symbol: &str) -> Self {
        self.failing.insert(symbol.to_string());
        self
    }

    fn next_value(&self, symbol: &str) -> f64 {
        let mut values = self.values.lock().unwrap();
        let current = values
            .entry(symbol.to_string())
            .or_insert(self.start_value);
        // Walks stay strictly positive; the step shrinks with the value.
        let max_step = (current.abs() * self.step_percent / 100.0).max(f64::MIN_POSITIVE);
        let step = rand::thread_rng().gen_range(-max_step..=max_step);
        *current = (*current + step).max(f64::MIN_POSITIVE);
        *current
    }
}

impl Default for SimulatedSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QuoteSource for SimulatedSource {
    async fn fetch(&self, credential: &str, symbol: &str) -> FetchResult<Observation> {
        if credential.trim().is_empty() {
            return Err(FetchError::InvalidCredential);
        }
        if symbol.is_empty() || !symbol.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(FetchError::SymbolNotFound(symbol.to_string()));
        }
        if self.failing.contains(symbol) {
            return Err(FetchError::TransientUnavailable(format!(
                "no data for {}",
                symbol
            )));
        }

        Ok(Observation::now(symbol, self.next_value(symbol)))
    }
}
