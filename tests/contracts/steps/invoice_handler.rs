//! Invoice handler step definitions.

use cucumber::gherkin::Step;
use cucumber::{given, then, when, World};
use invoicing::config::AppConfig;
use invoicing::form::{RawOptions, Submission};
use invoicing::handler::{
    process, FlashLevel, HandlerError, HandlerOutcome, OPTION_INVOICE, OPTION_RECURRING,
};
use invoicing::invoice::{Invoice, InvoiceSubject, RecurringInvoice};
use invoicing::storage::InvoiceStore;
use invoicing::utils::bootstrap::Services;
use serde_json::{Map, Value};

/// Test context for invoice handler scenarios.
#[derive(World)]
#[world(init = Self::new)]
pub struct InvoiceHandlerWorld {
    services: Services,
    invoice: Option<InvoiceSubject>,
    recurring_override: Option<bool>,
    outcome: Option<HandlerOutcome>,
    last_error: Option<HandlerError>,
}

impl std::fmt::Debug for InvoiceHandlerWorld {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvoiceHandlerWorld")
            .field("invoice", &self.invoice)
            .field("outcome", &self.outcome)
            .field("last_error", &self.last_error)
            .finish()
    }
}

impl InvoiceHandlerWorld {
    fn new() -> Self {
        Self {
            services: Services::from_config(&AppConfig::default())
                .expect("Default configuration must wire"),
            invoice: None,
            recurring_override: None,
            outcome: None,
            last_error: None,
        }
    }

    fn options(&self) -> RawOptions {
        let invoice = self.invoice.clone().expect("No invoice given");
        let recurring = self.recurring_override.unwrap_or(invoice.is_recurring());

        let mut options = RawOptions::new();
        options.insert(OPTION_INVOICE.to_string(), invoice.into());
        options.insert(OPTION_RECURRING.to_string(), recurring.into());
        options
    }

    async fn submit(&mut self, submission: Submission) {
        let result = process(
            &self.services.handler,
            &self.services.form_factory,
            self.options(),
            submission,
        )
        .await;
        match result {
            Ok(outcome) => self.outcome = Some(outcome),
            Err(e) => self.last_error = Some(e),
        }
    }

    fn saved_invoice(&self) -> &InvoiceSubject {
        match &self.outcome {
            Some(HandlerOutcome::Success { invoice, .. }) => invoice,
            other => panic!("Expected a successful submission, got {:?} / {:?}", other, self.last_error),
        }
    }
}

// --- Given steps ---

#[given("a new invoice")]
async fn given_new_invoice(world: &mut InvoiceHandlerWorld) {
    world.invoice = Some(Invoice::new().into());
}

#[given("a new recurring invoice")]
async fn given_new_recurring_invoice(world: &mut InvoiceHandlerWorld) {
    world.invoice = Some(RecurringInvoice::new().into());
}

#[given(expr = "an existing invoice {int} in status {string}")]
async fn given_existing_invoice(world: &mut InvoiceHandlerWorld, id: i64, status: String) {
    world.invoice = Some(Invoice::new().with_id(id).with_status(status).into());
}

#[given(expr = "an existing recurring invoice {int} in status {string}")]
async fn given_existing_recurring_invoice(world: &mut InvoiceHandlerWorld, id: i64, status: String) {
    world.invoice = Some(RecurringInvoice::new().with_id(id).with_status(status).into());
}

#[given("the form is configured as recurring")]
async fn given_recurring_override(world: &mut InvoiceHandlerWorld) {
    world.recurring_override = Some(true);
}

#[given("the store rejects saves")]
async fn given_store_rejects_saves(world: &mut InvoiceHandlerWorld) {
    world.services.store.set_fail_on_save(true).await;
}

// --- When steps ---

#[when(expr = "I submit the form with action {string}")]
async fn when_submit_with_action(world: &mut InvoiceHandlerWorld, action: String) {
    world.submit(Submission::new(Some(&action))).await;
}

#[when("I submit the form without an action")]
async fn when_submit_without_action(world: &mut InvoiceHandlerWorld) {
    world.submit(Submission::new(None)).await;
}

#[when(expr = "I submit the form with action {string} and fields:")]
async fn when_submit_with_fields(world: &mut InvoiceHandlerWorld, action: String, step: &Step) {
    let raw = step.docstring.as_deref().expect("Step requires a JSON doc string");
    let fields: Map<String, Value> = serde_json::from_str(raw).expect("Doc string is not a JSON object");
    world
        .submit(Submission {
            save: Some(action),
            fields,
        })
        .await;
}

// --- Then steps ---

#[then(expr = "the invoice status is {string}")]
async fn then_status_is(world: &mut InvoiceHandlerWorld, status: String) {
    assert_eq!(world.saved_invoice().status(), status);
}

#[then(expr = "the {word} {int} is stored with status {string}")]
async fn then_stored_with_status(
    world: &mut InvoiceHandlerWorld,
    kind: String,
    id: i64,
    status: String,
) {
    let stored = world
        .services
        .store
        .get(&kind, id)
        .await
        .expect("Invoice was not stored");
    assert_eq!(stored.status(), status);
}

#[then(expr = "I am redirected to {string}")]
async fn then_redirected_to(world: &mut InvoiceHandlerWorld, url: String) {
    match &world.outcome {
        Some(HandlerOutcome::Success { response, .. }) => assert_eq!(response.url, url),
        other => panic!("Expected a redirect, got {:?} / {:?}", other, world.last_error),
    }
}

#[then(expr = "a success flash {string} is shown")]
async fn then_success_flash(world: &mut InvoiceHandlerWorld, key: String) {
    match &world.outcome {
        Some(HandlerOutcome::Success { response, .. }) => {
            assert_eq!(response.flash.level, FlashLevel::Success);
            assert_eq!(response.flash.message_key, key);
        }
        other => panic!("Expected a flash message, got {:?}", other),
    }
}

#[then("the submission fails with a transition error")]
async fn then_transition_error(world: &mut InvoiceHandlerWorld) {
    assert!(
        matches!(world.last_error, Some(HandlerError::Transition(_))),
        "got {:?}",
        world.last_error
    );
}

#[then("the submission fails with a configuration error")]
async fn then_configuration_error(world: &mut InvoiceHandlerWorld) {
    assert!(
        matches!(world.last_error, Some(HandlerError::Configuration(_))),
        "got {:?}",
        world.last_error
    );
}

#[then("the submission fails with a storage error")]
async fn then_storage_error(world: &mut InvoiceHandlerWorld) {
    assert!(
        matches!(world.last_error, Some(HandlerError::Storage(_))),
        "got {:?}",
        world.last_error
    );
}

#[then(expr = "the form is rejected on field {string}")]
async fn then_form_rejected(world: &mut InvoiceHandlerWorld, field: String) {
    match &world.outcome {
        Some(HandlerOutcome::Invalid { errors }) => {
            assert!(errors.iter().any(|e| e.field == field), "errors: {:?}", errors)
        }
        other => panic!("Expected form errors, got {:?}", other),
    }
}

#[then(expr = "the discount value is {int}")]
async fn then_discount_value(world: &mut InvoiceHandlerWorld, value: i64) {
    assert_eq!(world.saved_invoice().discount().value(), value);
}

#[then("nothing is saved")]
async fn then_nothing_saved(world: &mut InvoiceHandlerWorld) {
    assert_eq!(world.services.store.save_count().await, 0);
}
