//! Invoice forms: schema selection, field binding and validation.

mod options;

pub use options::{
    OptionKind, OptionValue, Options, OptionsResolver, OptionsValidator, RawOptions,
};

use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::discount::{Discount, DiscountType};
use crate::invoice::InvoiceSubject;
use crate::serializer::Serializer;

/// Invalid or missing handler/form options. Raised before any side effect.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("The required option '{0}' is missing")]
    MissingRequired(String),

    #[error("The option '{option}' does not exist. Defined options are: {}", defined.join(", "))]
    UndefinedOption { option: String, defined: Vec<String> },

    #[error("The option '{option}' is expected to be of type '{expected}', but is of type '{actual}'")]
    InvalidType {
        option: String,
        expected: String,
        actual: &'static str,
    },

    #[error("The option '{option}' is invalid: {reason}")]
    InvalidValue { option: String, reason: String },
}

/// Which set of fields a form exposes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormSchema {
    Invoice,
    RecurringInvoice,
}

const INVOICE_FIELDS: &[&str] = &["discount", "terms", "notes", "due"];
const RECURRING_INVOICE_FIELDS: &[&str] =
    &["discount", "terms", "notes", "frequency", "date_start", "date_end"];

/// Form options understood by [`InvoiceFormFactory`].
const FORM_OPTIONS: &[&str] = &["allow_extra_fields"];

impl FormSchema {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Invoice => "invoice",
            Self::RecurringInvoice => "recurring_invoice",
        }
    }

    pub fn fields(&self) -> &'static [&'static str] {
        match self {
            Self::Invoice => INVOICE_FIELDS,
            Self::RecurringInvoice => RECURRING_INVOICE_FIELDS,
        }
    }
}

/// A field-level validation failure.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FormError {
    pub field: String,
    pub message: String,
}

impl FormError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Submitted request data: the form fields plus the button that was used.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Submission {
    /// Which save button was pressed (`"pending"`, `"draft"`, ...).
    #[serde(default)]
    pub save: Option<String>,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl Submission {
    pub fn new(save: Option<&str>) -> Self {
        Self {
            save: save.map(str::to_string),
            fields: Map::new(),
        }
    }

    pub fn with_field(mut self, name: &str, value: Value) -> Self {
        self.fields.insert(name.to_string(), value);
        self
    }

    pub fn action(&self) -> Option<&str> {
        self.save.as_deref()
    }
}

/// Context handed to a handler's success callback.
#[derive(Clone, Debug)]
pub struct FormRequest {
    options: Options,
    submission: Submission,
}

impl FormRequest {
    pub fn new(options: Options, submission: Submission) -> Self {
        Self {
            options,
            submission,
        }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn submission(&self) -> &Submission {
        &self.submission
    }
}

/// A form bound to an invoice.
pub struct Form {
    schema: FormSchema,
    data: InvoiceSubject,
    allow_extra_fields: bool,
    serializer: Arc<Serializer>,
    submitted: bool,
    errors: Vec<FormError>,
}

impl Form {
    pub fn schema(&self) -> FormSchema {
        self.schema
    }

    pub fn data(&self) -> &InvoiceSubject {
        &self.data
    }

    pub fn into_data(self) -> InvoiceSubject {
        self.data
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    /// Valid once submitted without errors.
    pub fn is_valid(&self) -> bool {
        self.submitted && self.errors.is_empty()
    }

    pub fn errors(&self) -> &[FormError] {
        &self.errors
    }

    /// Bind submitted fields onto the invoice, then validate it.
    ///
    /// Absent fields keep their current value; `null` clears optional ones.
    pub fn submit(&mut self, fields: &Map<String, Value>) {
        self.submitted = true;
        self.errors.clear();

        for (name, value) in fields {
            if !self.schema.fields().contains(&name.as_str()) {
                if !self.allow_extra_fields {
                    self.errors
                        .push(FormError::new(name, "This form should not contain extra fields."));
                }
                continue;
            }
            if let Err(error) = self.bind(name, value) {
                self.errors.push(error);
            }
        }

        self.validate();
    }

    fn bind(&mut self, name: &str, value: &Value) -> Result<(), FormError> {
        match name {
            "discount" => {
                let discount: Discount = self
                    .serializer
                    .from_value(value)
                    .map_err(|e| FormError::new(name, e.to_string()))?;
                self.data.set_discount(discount);
            }
            "notes" => self.data.set_notes(read_text(name, value)?),
            "terms" => self.data.set_terms(read_text(name, value)?),
            "due" => {
                if let InvoiceSubject::Standard(invoice) = &mut self.data {
                    invoice.due = read_date(name, value)?;
                }
            }
            "frequency" => {
                if let InvoiceSubject::Recurring(invoice) = &mut self.data {
                    invoice.frequency = read_text(name, value)?;
                }
            }
            "date_start" => {
                if let InvoiceSubject::Recurring(invoice) = &mut self.data {
                    invoice.date_start = read_date(name, value)?;
                }
            }
            "date_end" => {
                if let InvoiceSubject::Recurring(invoice) = &mut self.data {
                    invoice.date_end = read_date(name, value)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn validate(&mut self) {
        let discount = self.data.discount();
        if discount.value() < 0 {
            self.errors
                .push(FormError::new("discount", "The discount cannot be negative."));
        }
        if discount.discount_type() == Some(DiscountType::Percentage) && discount.value() > 100 {
            self.errors.push(FormError::new(
                "discount",
                "A percentage discount cannot exceed 100.",
            ));
        }

        if let InvoiceSubject::Recurring(invoice) = &self.data {
            if let (Some(start), Some(end)) = (invoice.date_start, invoice.date_end) {
                if end < start {
                    self.errors.push(FormError::new(
                        "date_end",
                        "The end date must not be before the start date.",
                    ));
                }
            }
        }
    }
}

fn read_text(field: &str, value: &Value) -> Result<Option<String>, FormError> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        _ => Err(FormError::new(field, "This value should be of type string.")),
    }
}

fn read_date(field: &str, value: &Value) -> Result<Option<NaiveDate>, FormError> {
    match read_text(field, value)? {
        None => Ok(None),
        Some(text) => NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
            .map(Some)
            .map_err(|_| FormError::new(field, "Please enter a valid date (YYYY-MM-DD).")),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "map",
    }
}

/// Creates forms for a schema.
pub trait FormFactory: Send + Sync {
    fn create(
        &self,
        schema: FormSchema,
        data: InvoiceSubject,
        options: &Map<String, Value>,
    ) -> Result<Form, ConfigurationError>;
}

/// Factory for invoice forms. Discount fields are read through the
/// serializer so the form accepts the same wire shape as the API.
pub struct InvoiceFormFactory {
    serializer: Arc<Serializer>,
}

impl InvoiceFormFactory {
    pub fn new(serializer: Arc<Serializer>) -> Self {
        Self { serializer }
    }
}

impl FormFactory for InvoiceFormFactory {
    fn create(
        &self,
        schema: FormSchema,
        data: InvoiceSubject,
        options: &Map<String, Value>,
    ) -> Result<Form, ConfigurationError> {
        if let Some(name) = options.keys().find(|k| !FORM_OPTIONS.contains(&k.as_str())) {
            return Err(ConfigurationError::UndefinedOption {
                option: name.clone(),
                defined: FORM_OPTIONS.iter().map(|s| s.to_string()).collect(),
            });
        }

        let allow_extra_fields = match options.get("allow_extra_fields") {
            None => false,
            Some(Value::Bool(b)) => *b,
            Some(other) => {
                return Err(ConfigurationError::InvalidType {
                    option: "allow_extra_fields".to_string(),
                    expected: "bool".to_string(),
                    actual: json_kind(other),
                })
            }
        };

        Ok(Form {
            schema,
            data,
            allow_extra_fields,
            serializer: self.serializer.clone(),
            submitted: false,
            errors: Vec::new(),
        })
    }
}
