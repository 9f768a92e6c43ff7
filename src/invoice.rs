//! Invoice entities.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::discount::Discount;
use crate::workflow::{InvoiceStatus, Workflowable};

/// Storage identity. Absent until the invoice is first saved.
pub type InvoiceId = i64;

/// A one-off invoice.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: Option<InvoiceId>,
    pub uuid: Uuid,
    pub status: String,
    #[serde(default)]
    pub discount: Discount,
    pub terms: Option<String>,
    pub notes: Option<String>,
    pub due: Option<NaiveDate>,
}

impl Invoice {
    pub fn new() -> Self {
        Self {
            id: None,
            uuid: Uuid::new_v4(),
            status: InvoiceStatus::New.to_string(),
            discount: Discount::default(),
            terms: None,
            notes: None,
            due: None,
        }
    }

    pub fn with_id(mut self, id: InvoiceId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }
}

impl Default for Invoice {
    fn default() -> Self {
        Self::new()
    }
}

/// An invoice template issued on a schedule.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecurringInvoice {
    pub id: Option<InvoiceId>,
    pub uuid: Uuid,
    pub status: String,
    #[serde(default)]
    pub discount: Discount,
    pub terms: Option<String>,
    pub notes: Option<String>,
    /// Cron-style schedule, e.g. `0 0 1 * *`.
    pub frequency: Option<String>,
    pub date_start: Option<NaiveDate>,
    pub date_end: Option<NaiveDate>,
}

impl RecurringInvoice {
    pub fn new() -> Self {
        Self {
            id: None,
            uuid: Uuid::new_v4(),
            status: InvoiceStatus::New.to_string(),
            discount: Discount::default(),
            terms: None,
            notes: None,
            frequency: None,
            date_start: None,
            date_end: None,
        }
    }

    pub fn with_id(mut self, id: InvoiceId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }
}

impl Default for RecurringInvoice {
    fn default() -> Self {
        Self::new()
    }
}

impl Workflowable for Invoice {
    fn marking(&self) -> &str {
        &self.status
    }

    fn set_marking(&mut self, place: &str) {
        self.status = place.to_string();
    }
}

impl Workflowable for RecurringInvoice {
    fn marking(&self) -> &str {
        &self.status
    }

    fn set_marking(&mut self, place: &str) {
        self.status = place.to_string();
    }
}

/// Either kind of invoice, as handed to the form handler.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InvoiceSubject {
    Standard(Invoice),
    Recurring(RecurringInvoice),
}

impl InvoiceSubject {
    pub fn is_recurring(&self) -> bool {
        matches!(self, Self::Recurring(_))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Standard(_) => "invoice",
            Self::Recurring(_) => "recurring_invoice",
        }
    }

    pub fn id(&self) -> Option<InvoiceId> {
        match self {
            Self::Standard(i) => i.id,
            Self::Recurring(r) => r.id,
        }
    }

    pub fn set_id(&mut self, id: InvoiceId) {
        match self {
            Self::Standard(i) => i.id = Some(id),
            Self::Recurring(r) => r.id = Some(id),
        }
    }

    pub fn is_new(&self) -> bool {
        self.id().is_none()
    }

    pub fn status(&self) -> &str {
        self.marking()
    }

    pub fn discount(&self) -> &Discount {
        match self {
            Self::Standard(i) => &i.discount,
            Self::Recurring(r) => &r.discount,
        }
    }

    pub fn set_discount(&mut self, discount: Discount) {
        match self {
            Self::Standard(i) => i.discount = discount,
            Self::Recurring(r) => r.discount = discount,
        }
    }

    pub fn set_notes(&mut self, notes: Option<String>) {
        match self {
            Self::Standard(i) => i.notes = notes,
            Self::Recurring(r) => r.notes = notes,
        }
    }

    pub fn set_terms(&mut self, terms: Option<String>) {
        match self {
            Self::Standard(i) => i.terms = terms,
            Self::Recurring(r) => r.terms = terms,
        }
    }
}

impl Workflowable for InvoiceSubject {
    fn marking(&self) -> &str {
        match self {
            Self::Standard(i) => i.marking(),
            Self::Recurring(r) => r.marking(),
        }
    }

    fn set_marking(&mut self, place: &str) {
        match self {
            Self::Standard(i) => i.set_marking(place),
            Self::Recurring(r) => r.set_marking(place),
        }
    }
}

impl From<Invoice> for InvoiceSubject {
    fn from(invoice: Invoice) -> Self {
        Self::Standard(invoice)
    }
}

impl From<RecurringInvoice> for InvoiceSubject {
    fn from(invoice: RecurringInvoice) -> Self {
        Self::Recurring(invoice)
    }
}
