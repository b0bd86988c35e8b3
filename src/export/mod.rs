//! Deals export
//!
//! Collects every variant on deal from the Qogita catalog and writes their
//! GTINs, one per line, to a CSV file.

mod collector;
pub mod writer;

pub use collector::{Collected, DealsExporter, ExportError, ExportSummary, PAGE_SIZE};
