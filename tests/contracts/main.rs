//! Contract tests for the discount normalizer and the invoice form handler.
//!
//! ```bash
//! cargo test --test contracts
//! ```
//!
//! Both suites always run; the process fails if either had a failing,
//! skipped or unparsable scenario.

mod steps;

use cucumber::writer::Stats as _;
use cucumber::World;
use steps::discount_normalizer::DiscountNormalizerWorld;
use steps::invoice_handler::InvoiceHandlerWorld;

#[tokio::main]
async fn main() {
    let mut failed = Vec::new();

    println!("\n=== Running Discount Normalizer Contract Tests ===\n");
    let writer = DiscountNormalizerWorld::cucumber()
        .fail_on_skipped()
        .run("tests/contracts/features/discount_normalizer.feature")
        .await;
    if writer.execution_has_failed() {
        failed.push("discount normalizer");
    }

    println!("\n=== Running Invoice Handler Contract Tests ===\n");
    let writer = InvoiceHandlerWorld::cucumber()
        .fail_on_skipped()
        .run("tests/contracts/features/invoice_handler.feature")
        .await;
    if writer.execution_has_failed() {
        failed.push("invoice handler");
    }

    if !failed.is_empty() {
        panic!("Contract tests failed: {}", failed.join(", "));
    }
}
