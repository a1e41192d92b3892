//! Document ingestion: fetch one organization's index document and extract
//! its plan records.
//!
//! This crate provides:
//! - [`FetchClient`] — HTTP retrieval and JSON decoding of index documents
//! - [`extract_records`] — typed navigation of a decoded document into the
//!   two index record shapes

pub mod extract;
pub mod fetcher;

pub use extract::{ExtractedRecords, extract_records};
pub use fetcher::FetchClient;
