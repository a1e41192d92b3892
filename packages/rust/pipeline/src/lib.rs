//! Concurrent index build pipeline: URL list → fetch/extract fan-out →
//! single-consumer aggregation → immutable snapshot.
//!
//! This crate provides:
//! - [`aggregator`] — single-writer merge of unit results into both indexes
//! - [`pipeline`] — the end-to-end [`build_index`] entry point and its
//!   progress hook
//! - a bounded worker pool (internal) delivering completions in arrival
//!   order

pub mod aggregator;
pub mod pipeline;
mod scheduler;

pub use aggregator::Aggregator;
pub use pipeline::{ProgressReporter, SilentProgress, build_index, read_url_list};
