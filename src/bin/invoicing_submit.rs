//! invoicing-submit: process one invoice form submission
//!
//! Reads a submission document, runs it through the invoice handler and
//! prints the outcome as JSON.
//!
//! ## Usage
//! ```text
//! invoicing-submit <submission.json> [config.yaml]
//! ```
//!
//! ## Submission document
//! ```json
//! {
//!   "recurring": false,
//!   "invoice": null,
//!   "form_options": {},
//!   "save": "pending",
//!   "fields": {"discount": {"type": "money", "value": 100}, "terms": "Net 30"}
//! }
//! ```
//! `invoice` may be omitted to create a new invoice of the requested kind.
//!
//! ## Configuration
//! - INVOICING_CONFIG: Path to a config file (optional)
//! - INVOICING_LOG: Log filter (default: info)

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::info;

use invoicing::config::AppConfig;
use invoicing::form::{RawOptions, Submission};
use invoicing::handler::{process, OPTION_FORM_OPTIONS, OPTION_INVOICE, OPTION_RECURRING};
use invoicing::invoice::{Invoice, InvoiceSubject, RecurringInvoice};
use invoicing::utils::bootstrap::{init_tracing, Services};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SubmissionDocument {
    recurring: bool,
    invoice: Option<InvoiceSubject>,
    form_options: Map<String, Value>,
    #[serde(flatten)]
    submission: Submission,
}

impl SubmissionDocument {
    fn into_parts(self) -> (RawOptions, Submission) {
        let invoice = self.invoice.unwrap_or_else(|| {
            if self.recurring {
                RecurringInvoice::new().into()
            } else {
                Invoice::new().into()
            }
        });

        let mut options = RawOptions::new();
        options.insert(OPTION_INVOICE.to_string(), invoice.into());
        options.insert(OPTION_RECURRING.to_string(), self.recurring.into());
        options.insert(OPTION_FORM_OPTIONS.to_string(), self.form_options.into());
        (options, self.submission)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let mut args = std::env::args().skip(1);
    let submission_path = args
        .next()
        .ok_or("usage: invoicing-submit <submission.json> [config.yaml]")?;
    let config_path = args.next();

    let config = AppConfig::load(config_path.as_deref())?;
    let services = Services::from_config(&config)?;

    let document: SubmissionDocument =
        serde_json::from_str(&std::fs::read_to_string(&submission_path)?)?;
    let (options, submission) = document.into_parts();

    info!(path = %submission_path, action = ?submission.action(), "processing submission");
    let outcome = process(&services.handler, &services.form_factory, options, submission).await?;

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}
