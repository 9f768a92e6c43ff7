//! Conversion between domain values and their wire representation.
//!
//! A [`Normalizer`] turns a value into JSON; a [`Denormalizer`] rebuilds a
//! value from JSON for a named target type. Each implementation declares what
//! it handles through its `supports_*` checks, and [`Serializer`] dispatches
//! to the first implementation that accepts.
//!
//! ```rust,ignore
//! let serializer = Serializer::standard(currency, formatter);
//! let json = serializer.to_value(&discount)?;
//! let back: Discount = serializer.from_value(&json)?;
//! ```

mod discount;
mod money;

pub use discount::DiscountNormalizer;
pub use money::MoneyNormalizer;

use std::any::Any;
use std::sync::Arc;

use serde_json::Value;

use crate::money::{Currency, MoneyError, MoneyFormatter};

/// Result type for serializer operations.
pub type SerializerResult<T> = std::result::Result<T, SerializerError>;

/// Errors raised while normalizing or denormalizing.
#[derive(Debug, thiserror::Error)]
pub enum SerializerError {
    #[error("No normalizer supports the given value")]
    NoNormalizer,

    #[error("No denormalizer supports target type '{0}'")]
    NoDenormalizer(String),

    #[error("Unexpected value for {expected}")]
    UnexpectedValue { expected: &'static str },

    #[error("Invalid value for field '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("Money error: {0}")]
    Money(#[from] MoneyError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Names a type for denormalization dispatch.
pub trait TypeIdentifier: Any + Send {
    const TYPE_ID: &'static str;
}

/// Converts values to their wire representation.
pub trait Normalizer: Send + Sync {
    /// Whether `data` is a value this normalizer owns.
    fn supports_normalization(&self, data: &dyn Any) -> bool;

    fn normalize(&self, data: &dyn Any) -> SerializerResult<Value>;
}

/// Rebuilds values from their wire representation.
pub trait Denormalizer: Send + Sync {
    /// Whether this denormalizer produces `target`. The payload is not
    /// inspected by implementations in this crate.
    fn supports_denormalization(&self, data: &Value, target: &str) -> bool;

    fn denormalize(&self, data: &Value, target: &str) -> SerializerResult<Box<dyn Any + Send>>;
}

/// A collaborator that does both directions. Normalizers that delegate
/// nested values hold one of these as their parent.
pub trait ParentSerializer: Normalizer + Denormalizer {}

impl<T: Normalizer + Denormalizer + ?Sized> ParentSerializer for T {}

/// Ordered chain of normalizers; the first one that supports a value wins.
#[derive(Clone, Default)]
pub struct Serializer {
    normalizers: Vec<Arc<dyn ParentSerializer>>,
}

impl Serializer {
    pub fn new(normalizers: Vec<Arc<dyn ParentSerializer>>) -> Self {
        Self { normalizers }
    }

    /// Discount and money support for one currency.
    ///
    /// The discount normalizer's parent is a money-only chain, so nested
    /// money values are handled without a reference cycle.
    pub fn standard(currency: Currency, formatter: MoneyFormatter) -> Self {
        let money: Arc<dyn ParentSerializer> = Arc::new(MoneyNormalizer);
        let parent: Arc<dyn ParentSerializer> = Arc::new(Serializer::new(vec![money.clone()]));
        let discount: Arc<dyn ParentSerializer> =
            Arc::new(DiscountNormalizer::new(parent, formatter, currency));
        Self::new(vec![discount, money])
    }

    /// Append a normalizer with the lowest priority.
    pub fn with(mut self, normalizer: Arc<dyn ParentSerializer>) -> Self {
        self.normalizers.push(normalizer);
        self
    }

    pub fn to_value<T: Any>(&self, data: &T) -> SerializerResult<Value> {
        self.normalize(data)
    }

    pub fn from_value<T: TypeIdentifier>(&self, data: &Value) -> SerializerResult<T> {
        let boxed = self.denormalize(data, T::TYPE_ID)?;
        boxed
            .downcast::<T>()
            .map(|b| *b)
            .map_err(|_| SerializerError::UnexpectedValue { expected: T::TYPE_ID })
    }
}

impl Normalizer for Serializer {
    fn supports_normalization(&self, data: &dyn Any) -> bool {
        self.normalizers.iter().any(|n| n.supports_normalization(data))
    }

    fn normalize(&self, data: &dyn Any) -> SerializerResult<Value> {
        self.normalizers
            .iter()
            .find(|n| n.supports_normalization(data))
            .ok_or(SerializerError::NoNormalizer)?
            .normalize(data)
    }
}

impl Denormalizer for Serializer {
    fn supports_denormalization(&self, data: &Value, target: &str) -> bool {
        self.normalizers
            .iter()
            .any(|n| n.supports_denormalization(data, target))
    }

    fn denormalize(&self, data: &Value, target: &str) -> SerializerResult<Box<dyn Any + Send>> {
        self.normalizers
            .iter()
            .find(|n| n.supports_denormalization(data, target))
            .ok_or_else(|| SerializerError::NoDenormalizer(target.to_string()))?
            .denormalize(data, target)
    }
}
