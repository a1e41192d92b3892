//! Exact-key lookup against persisted index artifacts.
//!
//! Numeric-looking terms are routed to the identifier index, everything
//! else to the name index. A missing key is "no results", never an error.

use std::path::Path;

use serde::Serialize;

use planindex_shared::{IdentifierIndex, IdentifierRecord, NameIndex, NameRecord, Result};

use crate::{NAME_INDEX_FILE, PLAN_INDEX_FILE, read_json};

/// Both persisted indexes, loaded for point queries.
#[derive(Debug)]
pub struct ArtifactStore {
    by_name: NameIndex,
    by_identifier: IdentifierIndex,
}

/// Outcome of a point lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QueryResult {
    /// Hit in the name index.
    Name {
        organization: String,
        plans: Vec<NameRecord>,
    },
    /// Hit in the identifier index.
    Identifier {
        identifier: String,
        organization: String,
        plans: Vec<IdentifierRecord>,
    },
    /// The key exists in neither index.
    NoResults,
}

impl ArtifactStore {
    /// Load both index artifacts from a directory.
    pub fn open(dir: &Path) -> Result<Self> {
        Ok(Self {
            by_name: read_json(&dir.join(NAME_INDEX_FILE))?,
            by_identifier: read_json(&dir.join(PLAN_INDEX_FILE))?,
        })
    }

    /// Look up a search term by exact key.
    pub fn query(&self, term: &str) -> QueryResult {
        if is_identifier(term) {
            return match self.by_identifier.get(term) {
                Some(plans) => QueryResult::Identifier {
                    identifier: term.to_string(),
                    organization: plans
                        .first()
                        .map(|p| p.company_name.clone())
                        .unwrap_or_default(),
                    plans: plans.clone(),
                },
                None => QueryResult::NoResults,
            };
        }

        match self.by_name.get(term) {
            Some(plans) => QueryResult::Name {
                organization: term.to_string(),
                plans: plans.clone(),
            },
            None => QueryResult::NoResults,
        }
    }
}

/// Plan identifiers are numeric strings; anything else is an organization
/// name.
fn is_identifier(term: &str) -> bool {
    !term.is_empty() && term.chars().all(|c| c.is_ascii_digit())
}
