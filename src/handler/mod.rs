//! Invoice form handling.
//!
//! A [`FormHandler`] declares its options, builds a form from them and acts
//! on a valid submission. [`process`] drives one submission through those
//! steps. [`InvoiceHandler`] is the handler for invoice create/edit forms:
//! on success it moves the invoice through its workflow, saves it and
//! redirects to its view page.

mod response;

pub use response::{Flash, FlashLevel, FlashRedirect};

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Map;
use tracing::{debug, info};

use crate::form::{
    ConfigurationError, Form, FormError, FormFactory, FormRequest, FormSchema, OptionKind,
    Options, OptionsResolver, RawOptions, Submission,
};
use crate::invoice::InvoiceSubject;
use crate::routing::{RouteParams, RoutingError, UrlGenerator};
use crate::storage::{InvoiceStore, StorageError};
use crate::workflow::{InvoiceStatus, StateMachine, Transition, TransitionError};

pub const INVOICE_VIEW_ROUTE: &str = "_invoices_view";
pub const RECURRING_INVOICE_VIEW_ROUTE: &str = "_invoices_view_recurring";
pub const CREATE_SUCCESS_MESSAGE: &str = "invoice.create.success";

/// Save-button value that asks for the invoice to go live.
pub const PENDING_ACTION: &str = InvoiceStatus::Pending.as_str();

pub const OPTION_INVOICE: &str = "invoice";
pub const OPTION_FORM_OPTIONS: &str = "form_options";
pub const OPTION_RECURRING: &str = "recurring";

#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Routing(#[from] RoutingError),
}

pub type Result<T> = std::result::Result<T, HandlerError>;

/// Result of processing one submission.
#[derive(Debug, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum HandlerOutcome {
    Success {
        response: FlashRedirect,
        invoice: InvoiceSubject,
    },
    Invalid { errors: Vec<FormError> },
}

#[async_trait]
pub trait FormHandler: Send + Sync {
    /// Declare accepted options, defaults and checks.
    fn configure_options(&self, resolver: &mut OptionsResolver);

    fn build_form(&self, factory: &dyn FormFactory, options: &Options) -> Result<Form>;

    /// Act on a valid submission. `invoice` is updated once it has been
    /// saved, and left as it was when a transition or the save fails.
    async fn on_success(
        &self,
        request: &FormRequest,
        invoice: &mut InvoiceSubject,
    ) -> Result<FlashRedirect>;
}

/// Run one submission through `handler`.
///
/// Option errors fail before a form is built; an invalid form returns
/// [`HandlerOutcome::Invalid`] without calling `on_success`.
pub async fn process<H>(
    handler: &H,
    factory: &dyn FormFactory,
    raw_options: RawOptions,
    submission: Submission,
) -> Result<HandlerOutcome>
where
    H: FormHandler + ?Sized,
{
    let mut resolver = OptionsResolver::new();
    handler.configure_options(&mut resolver);
    let options = resolver.resolve(raw_options)?;

    let mut form = handler.build_form(factory, &options)?;
    form.submit(&submission.fields);
    if !form.is_valid() {
        info!(
            form = form.schema().name(),
            errors = form.errors().len(),
            "form submission invalid"
        );
        return Ok(HandlerOutcome::Invalid {
            errors: form.errors().to_vec(),
        });
    }

    let mut invoice = form.into_data();
    let request = FormRequest::new(options, submission);
    let response = handler.on_success(&request, &mut invoice).await?;
    Ok(HandlerOutcome::Success { response, invoice })
}

/// Create/edit handler for standard and recurring invoices.
pub struct InvoiceHandler {
    invoice_state_machine: Arc<StateMachine>,
    recurring_invoice_state_machine: Arc<StateMachine>,
    router: Arc<dyn UrlGenerator>,
    store: Arc<dyn InvoiceStore>,
}

impl InvoiceHandler {
    /// Wire a handler.
    ///
    /// Both view routes must generate from an `id` parameter alone, so a
    /// saved invoice can always be redirected to.
    pub fn new(
        invoice_state_machine: Arc<StateMachine>,
        recurring_invoice_state_machine: Arc<StateMachine>,
        router: Arc<dyn UrlGenerator>,
        store: Arc<dyn InvoiceStore>,
    ) -> std::result::Result<Self, RoutingError> {
        for route in [INVOICE_VIEW_ROUTE, RECURRING_INVOICE_VIEW_ROUTE] {
            router.generate(route, &view_params(0))?;
        }

        Ok(Self {
            invoice_state_machine,
            recurring_invoice_state_machine,
            router,
            store,
        })
    }

    fn state_machine(&self, recurring: bool) -> &StateMachine {
        if recurring {
            &self.recurring_invoice_state_machine
        } else {
            &self.invoice_state_machine
        }
    }
}

fn view_params(id: i64) -> RouteParams {
    RouteParams::from([("id".to_string(), id.to_string())])
}

fn recurring_matches_invoice(options: &Options) -> std::result::Result<(), ConfigurationError> {
    let recurring = options.get_bool(OPTION_RECURRING)?;
    let invoice = options.get_invoice(OPTION_INVOICE)?;
    if recurring != invoice.is_recurring() {
        return Err(ConfigurationError::InvalidValue {
            option: OPTION_RECURRING.to_string(),
            reason: format!(
                "is {} but the invoice is a {}",
                recurring,
                invoice.kind()
            ),
        });
    }
    Ok(())
}

#[async_trait]
impl FormHandler for InvoiceHandler {
    fn configure_options(&self, resolver: &mut OptionsResolver) {
        resolver
            .set_required(OPTION_INVOICE)
            .set_allowed_kinds(
                OPTION_INVOICE,
                &[OptionKind::Invoice, OptionKind::RecurringInvoice],
            )
            .set_default(OPTION_FORM_OPTIONS, Map::new())
            .set_allowed_kinds(OPTION_FORM_OPTIONS, &[OptionKind::Map])
            .set_default(OPTION_RECURRING, false)
            .set_allowed_kinds(OPTION_RECURRING, &[OptionKind::Bool])
            .add_validator(recurring_matches_invoice);
    }

    fn build_form(&self, factory: &dyn FormFactory, options: &Options) -> Result<Form> {
        let schema = if options.get_bool(OPTION_RECURRING)? {
            FormSchema::RecurringInvoice
        } else {
            FormSchema::Invoice
        };
        let invoice = options.get_invoice(OPTION_INVOICE)?.clone();
        let form_options = options.get_map(OPTION_FORM_OPTIONS)?;
        Ok(factory.create(schema, invoice, form_options)?)
    }

    async fn on_success(
        &self,
        request: &FormRequest,
        invoice: &mut InvoiceSubject,
    ) -> Result<FlashRedirect> {
        let recurring = request.options().get_bool(OPTION_RECURRING)?;
        let state_machine = self.state_machine(recurring);

        // Transitions run on a copy so a rejected transition or failed save
        // leaves the caller's invoice as it was.
        let mut working = invoice.clone();

        if working.is_new() {
            state_machine.apply(&mut working, Transition::New)?;
        }

        if request.submission().action() == Some(PENDING_ACTION) {
            let go_live = if recurring {
                Transition::Activate
            } else {
                Transition::Accept
            };
            state_machine.apply(&mut working, go_live)?;
        }

        let id = self.store.save(&mut working).await?;
        // The store has committed; the caller sees what was saved even if
        // the redirect cannot be built.
        *invoice = working;

        let route = if recurring {
            RECURRING_INVOICE_VIEW_ROUTE
        } else {
            INVOICE_VIEW_ROUTE
        };
        let url = self.router.generate(route, &view_params(id))?;
        debug!(%url, id, status = %invoice.status(), "redirecting after save");

        Ok(FlashRedirect::success(url, CREATE_SUCCESS_MESSAGE))
    }
}
