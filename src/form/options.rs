//! Declarative option resolution for form handlers.
//!
//! A handler declares which options it accepts, which are required, their
//! defaults and allowed kinds. [`OptionsResolver::resolve`] checks caller
//! input against that declaration before any form is built.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde_json::{Map, Value};

use super::ConfigurationError;
use crate::invoice::{Invoice, InvoiceSubject, RecurringInvoice};

/// Kind of an option value, for allowed-type declarations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OptionKind {
    Invoice,
    RecurringInvoice,
    Bool,
    Int,
    String,
    Map,
    Null,
}

impl OptionKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Invoice => "Invoice",
            Self::RecurringInvoice => "RecurringInvoice",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::String => "string",
            Self::Map => "map",
            Self::Null => "null",
        }
    }
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single option value.
#[derive(Clone, Debug, PartialEq)]
pub enum OptionValue {
    Invoice(Box<InvoiceSubject>),
    Bool(bool),
    Int(i64),
    String(String),
    Map(Map<String, Value>),
    Null,
}

impl OptionValue {
    pub fn kind(&self) -> OptionKind {
        match self {
            Self::Invoice(subject) if subject.is_recurring() => OptionKind::RecurringInvoice,
            Self::Invoice(_) => OptionKind::Invoice,
            Self::Bool(_) => OptionKind::Bool,
            Self::Int(_) => OptionKind::Int,
            Self::String(_) => OptionKind::String,
            Self::Map(_) => OptionKind::Map,
            Self::Null => OptionKind::Null,
        }
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Map<String, Value>> for OptionValue {
    fn from(value: Map<String, Value>) -> Self {
        Self::Map(value)
    }
}

impl From<InvoiceSubject> for OptionValue {
    fn from(value: InvoiceSubject) -> Self {
        Self::Invoice(Box::new(value))
    }
}

impl From<Invoice> for OptionValue {
    fn from(value: Invoice) -> Self {
        InvoiceSubject::from(value).into()
    }
}

impl From<RecurringInvoice> for OptionValue {
    fn from(value: RecurringInvoice) -> Self {
        InvoiceSubject::from(value).into()
    }
}

/// Caller-supplied options before resolution.
pub type RawOptions = BTreeMap<String, OptionValue>;

/// Check run against the fully resolved options.
pub type OptionsValidator = Box<dyn Fn(&Options) -> Result<(), ConfigurationError> + Send + Sync>;

/// Options after defaults are applied and every check has passed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Options {
    values: BTreeMap<String, OptionValue>,
}

impl Options {
    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.values.get(name)
    }

    pub fn get_bool(&self, name: &str) -> Result<bool, ConfigurationError> {
        match self.require(name)? {
            OptionValue::Bool(b) => Ok(*b),
            other => Err(invalid_type(name, &[OptionKind::Bool], other)),
        }
    }

    pub fn get_map(&self, name: &str) -> Result<&Map<String, Value>, ConfigurationError> {
        match self.require(name)? {
            OptionValue::Map(m) => Ok(m),
            other => Err(invalid_type(name, &[OptionKind::Map], other)),
        }
    }

    pub fn get_invoice(&self, name: &str) -> Result<&InvoiceSubject, ConfigurationError> {
        match self.require(name)? {
            OptionValue::Invoice(subject) => Ok(subject),
            other => Err(invalid_type(
                name,
                &[OptionKind::Invoice, OptionKind::RecurringInvoice],
                other,
            )),
        }
    }

    fn require(&self, name: &str) -> Result<&OptionValue, ConfigurationError> {
        self.values
            .get(name)
            .ok_or_else(|| ConfigurationError::MissingRequired(name.to_string()))
    }
}

fn invalid_type(name: &str, allowed: &[OptionKind], actual: &OptionValue) -> ConfigurationError {
    ConfigurationError::InvalidType {
        option: name.to_string(),
        expected: allowed
            .iter()
            .map(OptionKind::as_str)
            .collect::<Vec<_>>()
            .join("|"),
        actual: actual.kind().as_str(),
    }
}

/// Declares and resolves a handler's options.
#[derive(Default)]
pub struct OptionsResolver {
    defined: BTreeSet<String>,
    required: BTreeSet<String>,
    defaults: BTreeMap<String, OptionValue>,
    allowed_kinds: BTreeMap<String, Vec<OptionKind>>,
    validators: Vec<OptionsValidator>,
}

impl OptionsResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_required(&mut self, name: &str) -> &mut Self {
        self.defined.insert(name.to_string());
        self.required.insert(name.to_string());
        self
    }

    pub fn set_default(&mut self, name: &str, value: impl Into<OptionValue>) -> &mut Self {
        self.defined.insert(name.to_string());
        self.defaults.insert(name.to_string(), value.into());
        self
    }

    pub fn set_allowed_kinds(&mut self, name: &str, kinds: &[OptionKind]) -> &mut Self {
        self.defined.insert(name.to_string());
        self.allowed_kinds.insert(name.to_string(), kinds.to_vec());
        self
    }

    /// Register a check over the resolved options, run after per-option
    /// checks in registration order.
    pub fn add_validator<F>(&mut self, validator: F) -> &mut Self
    where
        F: Fn(&Options) -> Result<(), ConfigurationError> + Send + Sync + 'static,
    {
        self.validators.push(Box::new(validator));
        self
    }

    fn is_defined(&self, name: &str) -> bool {
        self.defined.contains(name)
    }

    fn is_required(&self, name: &str) -> bool {
        self.required.contains(name)
    }

    /// Apply defaults and check the result.
    ///
    /// Fails on the first problem in this order: undefined option, missing
    /// required option, disallowed kind, cross-option validator.
    pub fn resolve(&self, raw: RawOptions) -> Result<Options, ConfigurationError> {
        if let Some(name) = raw.keys().find(|name| !self.is_defined(name)) {
            return Err(ConfigurationError::UndefinedOption {
                option: name.clone(),
                defined: self.defined.iter().cloned().collect(),
            });
        }

        if let Some(name) = self
            .defined
            .iter()
            .find(|name| self.is_required(name) && !raw.contains_key(*name))
        {
            return Err(ConfigurationError::MissingRequired(name.clone()));
        }

        let mut values = self.defaults.clone();
        values.extend(raw);

        for (name, allowed) in &self.allowed_kinds {
            if let Some(value) = values.get(name) {
                if !allowed.contains(&value.kind()) {
                    return Err(invalid_type(name, allowed, value));
                }
            }
        }

        let options = Options { values };
        for validator in &self.validators {
            validator(&options)?;
        }
        Ok(options)
    }
}
