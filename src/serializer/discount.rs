//! Wire format for [`Discount`].
//!
//! Outbound, a money discount's stored value is scaled by [`MONEY_SCALE`] and
//! emitted as a money object through the parent serializer:
//!
//! ```text
//! Discount { money, 100 }  ->  {"type": "money", "value": {"amount": "10000", "currency": "USD"}}
//! ```
//!
//! Inbound, `value` is taken as already being in stored units and is not
//! rescaled, so `{"type": "money", "value": 10000}` becomes
//! `Discount { money, 10000 }`.

use std::any::Any;
use std::sync::Arc;

use serde_json::{json, Map, Value};
use tracing::debug;

use super::{Denormalizer, Normalizer, ParentSerializer, SerializerError, SerializerResult, TypeIdentifier};
use crate::discount::{Discount, DiscountType, MONEY_SCALE};
use crate::money::{Currency, Money, MoneyFormatter};

impl TypeIdentifier for Discount {
    const TYPE_ID: &'static str = "Discount";
}

/// Normalizer and denormalizer for [`Discount`].
pub struct DiscountNormalizer {
    parent: Arc<dyn ParentSerializer>,
    formatter: MoneyFormatter,
    currency: Currency,
}

impl DiscountNormalizer {
    pub fn new(parent: Arc<dyn ParentSerializer>, formatter: MoneyFormatter, currency: Currency) -> Self {
        Self {
            parent,
            formatter,
            currency,
        }
    }

    pub fn currency(&self) -> &Currency {
        &self.currency
    }

    /// Human-readable form, e.g. `15%` or `$1.00`.
    pub fn describe(&self, discount: &Discount) -> String {
        match discount.discount_type() {
            Some(DiscountType::Percentage) => format!("{}%", discount.value()),
            Some(DiscountType::Money) => match discount.value_money(&self.currency) {
                Ok(money) => self.formatter.format(&money),
                Err(_) => discount.value().to_string(),
            },
            None => discount.value().to_string(),
        }
    }

    pub fn normalize_discount(&self, discount: &Discount) -> SerializerResult<Value> {
        let value = match discount.discount_type() {
            Some(DiscountType::Money) => {
                let money = discount.value_money(&self.currency)?;
                debug!(
                    stored = discount.value(),
                    scale = MONEY_SCALE,
                    major = %self.formatter.to_decimal(&money),
                    formatted = %self.formatter.format(&money),
                    "normalizing money discount"
                );
                self.parent.normalize(&money)?
            }
            _ => json!(discount.value()),
        };

        Ok(json!({
            "type": discount.discount_type().map(|t| t.as_str()),
            "value": value,
        }))
    }

    /// Rebuild a discount from `{type, value}`. `null` yields an empty
    /// discount; missing fields keep their defaults.
    pub fn denormalize_discount(&self, data: &Value) -> SerializerResult<Discount> {
        let mut discount = Discount::default();
        let fields = match data {
            Value::Null => return Ok(discount),
            Value::Object(fields) => fields,
            _ => {
                return Err(SerializerError::UnexpectedValue {
                    expected: Discount::TYPE_ID,
                })
            }
        };

        discount.set_type(read_type(fields)?);
        if let Some(value) = self.read_value(fields)? {
            discount.set_value(value);
        }
        Ok(discount)
    }

    fn read_value(&self, fields: &Map<String, Value>) -> SerializerResult<Option<i64>> {
        let invalid = |reason: String| SerializerError::InvalidValue {
            field: "value",
            reason,
        };

        match fields.get("value") {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Number(n)) => {
                if let Some(v) = n.as_i64() {
                    Ok(Some(v))
                } else {
                    match n.as_f64() {
                        Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(Some(f as i64)),
                        _ => Err(invalid(format!("{n} is not a whole number"))),
                    }
                }
            }
            Some(Value::String(s)) => s
                .trim()
                .parse::<i64>()
                .map(Some)
                .map_err(|_| invalid(format!("'{s}' is not a whole number"))),
            // A money object echoed back from normalize(); its amount is
            // taken as-is, like a bare number.
            Some(obj @ Value::Object(_)) => {
                let boxed = self.parent.denormalize(obj, Money::TYPE_ID)?;
                let money = boxed
                    .downcast::<Money>()
                    .map_err(|_| SerializerError::UnexpectedValue {
                        expected: Money::TYPE_ID,
                    })?;
                Ok(Some(money.amount()))
            }
            Some(other) => Err(invalid(format!("unexpected {other}"))),
        }
    }
}

fn read_type(fields: &Map<String, Value>) -> SerializerResult<Option<DiscountType>> {
    match fields.get("type") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(tag)) => tag
            .parse::<DiscountType>()
            .map(Some)
            .map_err(|reason| SerializerError::InvalidValue {
                field: "type",
                reason,
            }),
        Some(other) => Err(SerializerError::InvalidValue {
            field: "type",
            reason: format!("expected a string, got {other}"),
        }),
    }
}

impl Normalizer for DiscountNormalizer {
    fn supports_normalization(&self, data: &dyn Any) -> bool {
        data.is::<Discount>()
    }

    fn normalize(&self, data: &dyn Any) -> SerializerResult<Value> {
        let discount = data
            .downcast_ref::<Discount>()
            .ok_or(SerializerError::UnexpectedValue {
                expected: Discount::TYPE_ID,
            })?;
        self.normalize_discount(discount)
    }
}

impl Denormalizer for DiscountNormalizer {
    fn supports_denormalization(&self, _data: &Value, target: &str) -> bool {
        target == Discount::TYPE_ID
    }

    fn denormalize(&self, data: &Value, target: &str) -> SerializerResult<Box<dyn Any + Send>> {
        if target != Discount::TYPE_ID {
            return Err(SerializerError::NoDenormalizer(target.to_string()));
        }
        Ok(Box::new(self.denormalize_discount(data)?))
    }
}
