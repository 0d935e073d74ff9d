//! Monetary amounts in minor currency units.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A monetary amount with currency information.
///
/// The platform transports money as an integer number of minor units
/// (`centAmount`) plus an ISO 4217 currency code, so no floating point is
/// involved anywhere. Use [`Money::amount`] for display math.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Money {
    /// Amount in the smallest currency unit (e.g., cents for EUR/USD).
    pub cent_amount: i64,
    /// ISO 4217 currency code.
    pub currency_code: String,
    /// Number of digits after the decimal separator.
    #[serde(default = "default_fraction_digits")]
    pub fraction_digits: u32,
}

const fn default_fraction_digits() -> u32 {
    2
}

impl Money {
    /// Create a new amount from minor units.
    #[must_use]
    pub fn new(cent_amount: i64, currency_code: impl Into<String>) -> Self {
        Self {
            cent_amount,
            currency_code: currency_code.into(),
            fraction_digits: default_fraction_digits(),
        }
    }

    /// The amount in major units as a decimal (e.g., `12.50` for 1250 cents).
    #[must_use]
    pub fn amount(&self) -> Decimal {
        Decimal::new(self.cent_amount, self.fraction_digits)
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.amount(), self.currency_code)
    }
}
