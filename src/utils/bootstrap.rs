//! Bootstrap utilities for invoicing binaries.

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{AppConfig, ConfigError, LOG_ENV_VAR};
use crate::form::InvoiceFormFactory;
use crate::handler::InvoiceHandler;
use crate::serializer::Serializer;
use crate::storage::InMemoryInvoiceStore;

/// Initialize tracing with the INVOICING_LOG environment variable.
///
/// Defaults to "info" level if INVOICING_LOG is not set.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env(LOG_ENV_VAR)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Everything needed to process invoice submissions.
pub struct Services {
    pub serializer: Arc<Serializer>,
    pub form_factory: InvoiceFormFactory,
    pub store: Arc<InMemoryInvoiceStore>,
    pub handler: InvoiceHandler,
}

impl Services {
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        let currency = config.currency()?;
        let formatter = config.formatter()?;
        let serializer = Arc::new(Serializer::standard(currency, formatter));

        let invoice_state_machine = config.workflows.invoice_state_machine()?;
        let recurring_invoice_state_machine = config.workflows.recurring_invoice_state_machine()?;

        let store = Arc::new(InMemoryInvoiceStore::new());
        let handler = InvoiceHandler::new(
            Arc::new(invoice_state_machine),
            Arc::new(recurring_invoice_state_machine),
            Arc::new(config.route_table()),
            store.clone(),
        )?;

        info!(
            currency = %config.currency,
            locale = %config.locale,
            "invoicing services ready"
        );

        Ok(Self {
            form_factory: InvoiceFormFactory::new(serializer.clone()),
            serializer,
            store,
            handler,
        })
    }
}
