//! Invoicing - invoice lifecycle and discount serialization
//!
//! Drives standard and recurring invoices through their workflow graphs
//! on form submission, and converts discounts to and from their wire
//! representation using currency-aware money values.

pub mod config;
pub mod discount;
pub mod form;
pub mod handler;
pub mod invoice;
pub mod money;
pub mod routing;
pub mod serializer;
pub mod storage;
pub mod utils;
pub mod workflow;
