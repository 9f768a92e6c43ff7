//! Step definitions.

pub mod discount_normalizer;
pub mod invoice_handler;
