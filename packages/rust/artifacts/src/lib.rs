//! Index artifact persistence and lookup.
//!
//! The pipeline hands over an immutable [`IndexSnapshot`]; this crate
//! writes it out as two JSON artifacts plus a run manifest, and reads
//! persisted artifacts back for point queries.

pub mod lookup;

use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{info, instrument};

use planindex_shared::{
    CURRENT_SCHEMA_VERSION, IndexManifest, IndexSnapshot, PlanIndexError, Result, RunId,
};

pub use lookup::{ArtifactStore, QueryResult};

/// File name of the organization-name index artifact.
pub const NAME_INDEX_FILE: &str = "name_index.json";

/// File name of the plan-identifier index artifact.
pub const PLAN_INDEX_FILE: &str = "plan_index.json";

/// File name of the run manifest.
pub const MANIFEST_FILE: &str = "manifest.json";

// ---------------------------------------------------------------------------
// Write side
// ---------------------------------------------------------------------------

/// Output from a successful artifact write.
#[derive(Debug, Clone)]
pub struct WriteResult {
    /// Directory the artifacts were written into.
    pub output_dir: PathBuf,
    /// The run manifest that was written.
    pub manifest: IndexManifest,
}

/// Serialize both indexes and the run manifest into `output_dir`.
///
/// Failing to write either index artifact is fatal for the run; no
/// partial output is considered valid.
#[instrument(skip_all, fields(output_dir = %output_dir.display()))]
pub fn write_artifacts(
    output_dir: &Path,
    snapshot: &IndexSnapshot,
    source_count: usize,
    tool_version: &str,
) -> Result<WriteResult> {
    std::fs::create_dir_all(output_dir).map_err(|e| PlanIndexError::io(output_dir, e))?;

    write_json(&output_dir.join(NAME_INDEX_FILE), &snapshot.by_name)?;
    write_json(&output_dir.join(PLAN_INDEX_FILE), &snapshot.by_identifier)?;

    let manifest = IndexManifest {
        schema_version: CURRENT_SCHEMA_VERSION,
        id: RunId::new(),
        tool_version: tool_version.to_string(),
        created_at: Utc::now(),
        source_count,
        organization_count: snapshot.organization_count(),
        plan_count: snapshot.plan_count(),
    };
    write_json(&output_dir.join(MANIFEST_FILE), &manifest)?;

    info!(
        organizations = manifest.organization_count,
        plans = manifest.plan_count,
        "index artifacts written"
    );

    Ok(WriteResult {
        output_dir: output_dir.to_path_buf(),
        manifest,
    })
}

/// Verify that a directory holds a complete, readable set of artifacts.
pub fn validate_artifacts(dir: &Path) -> Result<IndexManifest> {
    for file in [NAME_INDEX_FILE, PLAN_INDEX_FILE, MANIFEST_FILE] {
        if !dir.join(file).exists() {
            return Err(PlanIndexError::validation(format!(
                "missing {file} in {}",
                dir.display()
            )));
        }
    }

    let manifest: IndexManifest = read_json(&dir.join(MANIFEST_FILE))?;
    if manifest.schema_version != CURRENT_SCHEMA_VERSION {
        return Err(PlanIndexError::validation(format!(
            "unsupported schema_version: {} (expected {CURRENT_SCHEMA_VERSION})",
            manifest.schema_version
        )));
    }

    Ok(manifest)
}

// ---------------------------------------------------------------------------
// JSON helpers
// ---------------------------------------------------------------------------

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(|e| {
        PlanIndexError::validation(format!("failed to serialize {}: {e}", path.display()))
    })?;
    std::fs::write(path, json).map_err(|e| PlanIndexError::io(path, e))
}

pub(crate) fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path).map_err(|e| PlanIndexError::io(path, e))?;
    serde_json::from_str(&content)
        .map_err(|e| PlanIndexError::validation(format!("invalid {}: {e}", path.display())))
}
