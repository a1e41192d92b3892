//! Core domain types for planindex lookup indexes.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Current schema version for the index artifact format.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// RunId
// ---------------------------------------------------------------------------

/// A UUID v7 wrapper for index build run identifiers (time-sortable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub Uuid);

impl RunId {
    /// Generate a new time-sortable run identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for RunId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// One plan as it appears in an organization's own catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameRecord {
    /// Human-readable plan name.
    pub plan_name: String,
    /// Numeric plan identifier, kept as a string.
    pub plan_id: String,
    /// Rate-file URLs in document order.
    pub urls: Vec<String>,
}

/// The same plan, indexed by its identifier rather than by organization.
///
/// The identifier itself is the index key and is not duplicated here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifierRecord {
    /// The organization that published the plan.
    pub company_name: String,
    /// Human-readable plan name.
    pub plan_name: String,
    /// Rate-file URLs in document order.
    pub urls: Vec<String>,
}

// ---------------------------------------------------------------------------
// Indexes
// ---------------------------------------------------------------------------

/// Organization name → the plans it has exposed across merges.
///
/// `BTreeMap` keeps serialized artifacts byte-stable for identical input.
pub type NameIndex = BTreeMap<String, Vec<NameRecord>>;

/// Plan identifier → singleton list holding the most recently merged record.
pub type IdentifierIndex = BTreeMap<String, Vec<IdentifierRecord>>;

/// Immutable result of a finished aggregation run, handed to persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexSnapshot {
    /// The organization-name index.
    pub by_name: NameIndex,
    /// The plan-identifier index.
    pub by_identifier: IdentifierIndex,
}

impl IndexSnapshot {
    /// Number of distinct organizations in the name index.
    pub fn organization_count(&self) -> usize {
        self.by_name.len()
    }

    /// Number of distinct plan identifiers in the identifier index.
    pub fn plan_count(&self) -> usize {
        self.by_identifier.len()
    }
}

// ---------------------------------------------------------------------------
// IndexManifest
// ---------------------------------------------------------------------------

/// The `manifest.json` structure written alongside the two index artifacts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexManifest {
    /// Schema version for forward compatibility.
    pub schema_version: u32,
    /// Unique identifier for this build run.
    pub id: RunId,
    /// Tool version that produced the artifacts.
    pub tool_version: String,
    /// When the artifacts were written.
    pub created_at: DateTime<Utc>,
    /// Number of source URLs the run was given.
    pub source_count: usize,
    /// Number of organizations in the name index.
    pub organization_count: usize,
    /// Number of plan identifiers in the identifier index.
    pub plan_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_id_roundtrip() {
        let id = RunId::new();
        let s = id.to_string();
        let parsed: RunId = s.parse().expect("parse RunId");
        assert_eq!(id, parsed);
    }

    #[test]
    fn record_serialization() {
        let record = NameRecord {
            plan_name: "ACME PPO".into(),
            plan_id: "880123456".into(),
            urls: vec!["https://example.com/rates-1.json".into()],
        };

        let json = serde_json::to_string(&record).expect("serialize");
        let parsed: NameRecord = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, record);
    }

    #[test]
    fn snapshot_counts() {
        let mut by_name = NameIndex::new();
        by_name.insert(
            "Acme".into(),
            vec![NameRecord {
                plan_name: "ACME PPO".into(),
                plan_id: "1".into(),
                urls: vec!["https://example.com/a.json".into()],
            }],
        );

        let snapshot = IndexSnapshot {
            by_name,
            by_identifier: IdentifierIndex::new(),
        };
        assert_eq!(snapshot.organization_count(), 1);
        assert_eq!(snapshot.plan_count(), 0);
    }

    #[test]
    fn manifest_serialization() {
        let manifest = IndexManifest {
            schema_version: CURRENT_SCHEMA_VERSION,
            id: RunId::new(),
            tool_version: "0.1.0".into(),
            created_at: Utc::now(),
            source_count: 3,
            organization_count: 2,
            plan_count: 2,
        };

        let json = serde_json::to_string_pretty(&manifest).expect("serialize");
        let parsed: IndexManifest = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed.schema_version, CURRENT_SCHEMA_VERSION);
        assert_eq!(parsed.source_count, 3);
    }
}
