//! Discount applied to an invoice total.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::money::{Currency, Money, MoneyError};

/// Factor between a money discount's stored value and its minor-unit amount.
///
/// A stored value of `100` becomes `10000` minor units. Fixed regardless of
/// the currency's own minor-unit exponent.
pub const MONEY_SCALE: i64 = 100;

/// How a discount's value is interpreted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    Percentage,
    Money,
}

impl DiscountType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Percentage => "percentage",
            Self::Money => "money",
        }
    }
}

impl fmt::Display for DiscountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DiscountType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "percentage" => Ok(Self::Percentage),
            "money" => Ok(Self::Money),
            other => Err(format!("unknown discount type '{other}'")),
        }
    }
}

/// Discount value object.
///
/// Carries no currency; one is supplied whenever the value is turned into
/// money.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Discount {
    #[serde(rename = "type")]
    discount_type: Option<DiscountType>,
    value: i64,
}

impl Discount {
    pub fn new(discount_type: DiscountType, value: i64) -> Self {
        Self {
            discount_type: Some(discount_type),
            value,
        }
    }

    pub fn discount_type(&self) -> Option<DiscountType> {
        self.discount_type
    }

    pub fn set_type(&mut self, discount_type: Option<DiscountType>) -> &mut Self {
        self.discount_type = discount_type;
        self
    }

    pub fn value(&self) -> i64 {
        self.value
    }

    pub fn set_value(&mut self, value: i64) -> &mut Self {
        self.value = value;
        self
    }

    /// The stored value as money, scaled by [`MONEY_SCALE`].
    pub fn value_money(&self, currency: &Currency) -> Result<Money, MoneyError> {
        Money::new(self.value, currency.clone()).checked_mul(MONEY_SCALE)
    }

    /// Amount taken off `total`. Never exceeds the total; an untyped
    /// discount takes nothing off.
    pub fn amount_off(&self, total: &Money) -> Result<Money, MoneyError> {
        match self.discount_type {
            Some(DiscountType::Percentage) => total.percentage(self.value),
            Some(DiscountType::Money) => self.value_money(total.currency())?.min(total),
            None => Ok(Money::zero(total.currency().clone())),
        }
    }
}
