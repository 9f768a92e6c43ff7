//! Invoice persistence.

use async_trait::async_trait;

use crate::invoice::{InvoiceId, InvoiceSubject};

pub mod memory;

pub use memory::InMemoryInvoiceStore;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Invoice not found: kind={kind}, id={id}")]
    NotFound { kind: String, id: InvoiceId },

    #[error("Storage backend error: {0}")]
    Backend(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// Persists invoices of either kind.
#[async_trait]
pub trait InvoiceStore: Send + Sync {
    /// Insert or update the invoice. New invoices are assigned an id,
    /// which is written back onto `invoice` and returned.
    async fn save(&self, invoice: &mut InvoiceSubject) -> Result<InvoiceId>;

    /// Fetch an invoice by kind (`"invoice"` or `"recurring_invoice"`) and id.
    async fn get(&self, kind: &str, id: InvoiceId) -> Result<InvoiceSubject>;
}
