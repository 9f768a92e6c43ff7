use std::any::Any;

use serde_json::Value;

use super::{Denormalizer, Normalizer, SerializerResult, TypeIdentifier};
use crate::money::Money;

impl TypeIdentifier for Money {
    const TYPE_ID: &'static str = "Money";
}

/// Normalizes [`Money`] to `{"amount": "<minor units>", "currency": "<code>"}`.
#[derive(Clone, Copy, Debug, Default)]
pub struct MoneyNormalizer;

impl Normalizer for MoneyNormalizer {
    fn supports_normalization(&self, data: &dyn Any) -> bool {
        data.is::<Money>()
    }

    fn normalize(&self, data: &dyn Any) -> SerializerResult<Value> {
        let money = data
            .downcast_ref::<Money>()
            .ok_or(super::SerializerError::UnexpectedValue {
                expected: Money::TYPE_ID,
            })?;
        Ok(serde_json::to_value(money)?)
    }
}

impl Denormalizer for MoneyNormalizer {
    fn supports_denormalization(&self, _data: &Value, target: &str) -> bool {
        target == Money::TYPE_ID
    }

    fn denormalize(&self, data: &Value, _target: &str) -> SerializerResult<Box<dyn Any + Send>> {
        let money: Money = serde_json::from_value(data.clone())?;
        Ok(Box::new(money))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Currency;
    use serde_json::json;

    #[test]
    fn test_round_trip() {
        let money = Money::new(-450, Currency::new("GBP").unwrap());
        let value = MoneyNormalizer.normalize(&money).unwrap();
        assert_eq!(value, json!({"amount": "-450", "currency": "GBP"}));

        let back = MoneyNormalizer.denormalize(&value, "Money").unwrap();
        assert_eq!(back.downcast_ref::<Money>(), Some(&money));
    }

    #[test]
    fn test_normalize_rejects_other_values() {
        assert!(!MoneyNormalizer.supports_normalization(&"Money"));
        assert!(MoneyNormalizer.normalize(&10_i64).is_err());
    }
}
