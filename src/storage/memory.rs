//! In-memory invoice store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

use crate::invoice::{InvoiceId, InvoiceSubject};
use crate::storage::{InvoiceStore, Result, StorageError};

/// Keeps invoices in a map keyed by kind and id.
///
/// Ids are sequential per kind, starting at 1.
#[derive(Default)]
pub struct InMemoryInvoiceStore {
    invoices: RwLock<HashMap<(String, InvoiceId), InvoiceSubject>>,
    last_ids: RwLock<HashMap<String, InvoiceId>>,
    fail_on_save: RwLock<bool>,
    save_count: RwLock<usize>,
}

impl InMemoryInvoiceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_fail_on_save(&self, fail: bool) {
        *self.fail_on_save.write().await = fail;
    }

    /// Number of successful saves.
    pub async fn save_count(&self) -> usize {
        *self.save_count.read().await
    }

    pub async fn len(&self) -> usize {
        self.invoices.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.invoices.read().await.is_empty()
    }
}

#[async_trait]
impl InvoiceStore for InMemoryInvoiceStore {
    async fn save(&self, invoice: &mut InvoiceSubject) -> Result<InvoiceId> {
        if *self.fail_on_save.read().await {
            return Err(StorageError::Backend("save failed".to_string()));
        }

        let kind = invoice.kind();
        let id = match invoice.id() {
            Some(id) => id,
            None => {
                let mut last_ids = self.last_ids.write().await;
                let next = last_ids.entry(kind.to_string()).or_default();
                *next += 1;
                invoice.set_id(*next);
                *next
            }
        };

        self.invoices
            .write()
            .await
            .insert((kind.to_string(), id), invoice.clone());
        *self.save_count.write().await += 1;

        info!(kind, id, status = %invoice.status(), "invoice saved");
        Ok(id)
    }

    async fn get(&self, kind: &str, id: InvoiceId) -> Result<InvoiceSubject> {
        self.invoices
            .read()
            .await
            .get(&(kind.to_string(), id))
            .cloned()
            .ok_or_else(|| StorageError::NotFound {
                kind: kind.to_string(),
                id,
            })
    }
}
