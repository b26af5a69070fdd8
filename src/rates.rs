use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Currency codes the expense form offers by default.
pub const SUPPORTED_CURRENCIES: [&str; 7] = ["TWD", "USD", "JPY", "EUR", "KRW", "HKD", "THB"];

/// Exchange rates keyed by currency code, each expressed against a common
/// base unit. Codes missing from the table resolve to rate 1, so an unknown
/// currency converts as identity instead of failing.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(transparent)]
pub struct RateTable {
    rates: HashMap<String, f64>,
}

impl RateTable {
    pub fn new(rates: HashMap<String, f64>) -> Self {
        Self { rates }
    }

    /// The built-in table, TWD-relative.
    pub fn builtin() -> Self {
        let rates = [
            ("TWD", 1.0),
            ("USD", 32.5),
            ("JPY", 0.21),
            ("EUR", 35.2),
            ("KRW", 0.024),
            ("HKD", 4.15),
            ("THB", 0.89),
        ]
        .into_iter()
        .map(|(code, rate)| (code.to_string(), rate))
        .collect();
        Self { rates }
    }

    pub fn contains(&self, code: &str) -> bool {
        self.rates.contains_key(code)
    }

    pub fn rate(&self, code: &str) -> f64 {
        self.rates.get(code).copied().unwrap_or(1.0)
    }

    /// Converts `amount` from one currency to another. No rounding happens
    /// here; rounding is deferred to display and settlement matching.
    pub fn convert(&self, amount: f64, from: &str, to: &str) -> f64 {
        amount * self.rate(from) / self.rate(to)
    }
}
