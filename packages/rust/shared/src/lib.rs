//! Shared types, error model, and configuration for planindex.
//!
//! This crate is the foundation depended on by all other planindex crates.
//! It provides:
//! - [`PlanIndexError`] — the unified error type
//! - Domain types ([`NameRecord`], [`IdentifierRecord`], [`IndexSnapshot`], [`IndexManifest`])
//! - Configuration ([`AppConfig`], [`PipelineConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, FailurePolicy, HttpConfig, PipelineConfig, config_dir,
    config_file_path, init_config, load_config, load_config_from,
};
pub use error::{PlanIndexError, Result};
pub use types::{
    CURRENT_SCHEMA_VERSION, IdentifierIndex, IdentifierRecord, IndexManifest, IndexSnapshot,
    NameIndex, NameRecord, RunId,
};
