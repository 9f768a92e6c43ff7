//! Monetary amounts in minor currency units.
//!
//! Amounts are integers in the currency's smallest denomination (cents for
//! USD). Arithmetic is checked; mixing currencies is an error rather than a
//! silent conversion.

mod currency;
mod formatter;

pub use currency::Currency;
pub use formatter::{Locale, MoneyFormatter, SymbolPosition};

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::de::Deserializer;
use serde::ser::{SerializeStruct, Serializer};
use serde::{Deserialize, Serialize};

/// Result type for money operations.
pub type Result<T> = std::result::Result<T, MoneyError>;

/// Errors raised by money arithmetic and formatting.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoneyError {
    #[error("Invalid currency code: '{0}'")]
    InvalidCurrency(String),

    #[error("Unsupported locale: '{0}'")]
    UnknownLocale(String),

    #[error("Currency mismatch: {left} vs {right}")]
    CurrencyMismatch { left: String, right: String },

    #[error("Invalid amount: '{0}'")]
    InvalidAmount(String),

    #[error("Amount overflow")]
    Overflow,
}

/// An amount of money in minor units of a single currency.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Money {
    amount: i64,
    currency: Currency,
}

impl Money {
    pub fn new(amount: i64, currency: Currency) -> Self {
        Self { amount, currency }
    }

    pub fn zero(currency: Currency) -> Self {
        Self::new(0, currency)
    }

    /// Amount in minor units.
    pub fn amount(&self) -> i64 {
        self.amount
    }

    pub fn currency(&self) -> &Currency {
        &self.currency
    }

    pub fn is_zero(&self) -> bool {
        self.amount == 0
    }

    pub fn is_negative(&self) -> bool {
        self.amount < 0
    }

    pub fn checked_mul(&self, factor: i64) -> Result<Money> {
        let amount = self.amount.checked_mul(factor).ok_or(MoneyError::Overflow)?;
        Ok(Money::new(amount, self.currency.clone()))
    }

    /// `percent`% of this amount, rounded half away from zero to a whole
    /// minor unit.
    pub fn percentage(&self, percent: i64) -> Result<Money> {
        let share = Decimal::from(self.amount)
            .checked_mul(Decimal::from(percent))
            .and_then(|product| product.checked_div(Decimal::ONE_HUNDRED))
            .ok_or(MoneyError::Overflow)?;
        let amount = share
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
            .ok_or(MoneyError::Overflow)?;
        Ok(Money::new(amount, self.currency.clone()))
    }

    /// Smaller of two amounts in the same currency.
    pub fn min(&self, other: &Money) -> Result<Money> {
        self.require_same_currency(other)?;
        Ok(if self.amount <= other.amount {
            self.clone()
        } else {
            other.clone()
        })
    }

    fn require_same_currency(&self, other: &Money) -> Result<()> {
        if self.currency != other.currency {
            return Err(MoneyError::CurrencyMismatch {
                left: self.currency.code().to_string(),
                right: other.currency.code().to_string(),
            });
        }
        Ok(())
    }
}

// Wire shape is `{"amount": "10000", "currency": "USD"}`. The amount is a
// string so 64-bit values survive JSON consumers that parse numbers as f64.
impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Money", 2)?;
        state.serialize_field("amount", &self.amount.to_string())?;
        state.serialize_field("currency", &self.currency)?;
        state.end()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AmountRepr {
    Int(i64),
    Text(String),
}

#[derive(Deserialize)]
struct MoneyRepr {
    amount: AmountRepr,
    currency: Currency,
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let repr = MoneyRepr::deserialize(deserializer)?;
        let amount = match repr.amount {
            AmountRepr::Int(n) => n,
            AmountRepr::Text(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| serde::de::Error::custom(MoneyError::InvalidAmount(s.clone())))?,
        };
        Ok(Money::new(amount, repr.currency))
    }
}
