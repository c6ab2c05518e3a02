//! Money and currency types
//!
//! Amounts arrive from clients in major units (rupees, dollars) and leave
//! for the provider in minor units (paise, cents). The conversion factor is
//! fixed at [`MINOR_UNIT_MULTIPLIER`] for every currency code the gateway
//! accepts.

use crate::error::{PaymentError, PaymentResult};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Major-to-minor unit factor
pub const MINOR_UNIT_MULTIPLIER: i64 = 100;

/// Currency code used when a request does not name one
pub const DEFAULT_CURRENCY: &str = "INR";

/// Convert a major-unit amount into minor units.
///
/// Rounds half away from zero, so `19.999` becomes `2000` and `0.005`
/// becomes `1`.
pub fn to_minor_units(amount: Decimal) -> PaymentResult<i64> {
    amount
        .checked_mul(Decimal::from(MINOR_UNIT_MULTIPLIER))
        .map(|scaled| scaled.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|rounded| rounded.to_i64())
        .ok_or_else(|| PaymentError::InvalidAmount(format!("{amount} is out of range")))
}

/// ISO 4217 currency code
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Currency(String);

impl Currency {
    /// Create from a code, normalized to upper case
    pub fn new(code: impl AsRef<str>) -> Self {
        Self(code.as_ref().trim().to_uppercase())
    }

    /// Indian rupee
    pub fn inr() -> Self {
        Self::new("INR")
    }

    /// Get currency code string
    pub fn code(&self) -> &str {
        &self.0
    }

    /// Get currency symbol, falling back to the code itself
    pub fn symbol(&self) -> &str {
        match self.0.as_str() {
            "INR" => "₹",
            "USD" | "CAD" | "AUD" | "NZD" | "SGD" | "HKD" => "$",
            "EUR" => "€",
            "GBP" => "£",
            "AED" => "AED ",
            other => other,
        }
    }
}

impl Default for Currency {
    fn default() -> Self {
        Self::new(DEFAULT_CURRENCY)
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Money amount with currency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// Amount in smallest currency unit (paise, cents, etc.)
    pub amount: i64,
    /// Currency
    pub currency: Currency,
}

impl Money {
    /// Create a new money amount from smallest unit
    pub fn new(amount: i64, currency: Currency) -> Self {
        Self { amount, currency }
    }

    /// Create from a major-unit decimal amount (e.g., 29.99)
    pub fn from_major(amount: Decimal, currency: Currency) -> PaymentResult<Self> {
        Ok(Self {
            amount: to_minor_units(amount)?,
            currency,
        })
    }

    /// Create INR amount from paise
    pub fn inr(paise: i64) -> Self {
        Self::new(paise, Currency::inr())
    }

    /// Get amount in major units
    pub fn to_major(&self) -> Decimal {
        Decimal::from(self.amount) / Decimal::from(MINOR_UNIT_MULTIPLIER)
    }

    /// Format for display
    pub fn format(&self) -> String {
        format!("{}{:.2}", self.currency.symbol(), self.to_major())
    }

    /// Check if zero
    pub fn is_zero(&self) -> bool {
        self.amount == 0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format())
    }
}
