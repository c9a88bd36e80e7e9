//! Extraction module: HTML to records
//!
//! This module contains:
//! - The selector-driven [`Extractor`]
//! - The [`Record`] type it produces
//! - Per-field outcomes, so extraction failures are data

mod extractor;
mod label;
mod record;

pub use extractor::{EmptyReason, Extractor, FieldOutcome, FIELD_SEPARATOR};
pub use label::{label_from_href, title_case};
pub use record::Record;
