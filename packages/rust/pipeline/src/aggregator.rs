//! Single-writer merge of per-document results into the two indexes.
//!
//! The aggregator owns both indexes for the duration of a run; nothing
//! else mutates them. Merge order is whatever completion order the worker
//! pool produced, so every rule here must hold regardless of ordering —
//! except identifier last-writer-wins, which is the one deliberately
//! order-sensitive behavior.

use tracing::{debug, warn};

use planindex_ingest::ExtractedRecords;
use planindex_shared::{IdentifierIndex, IndexSnapshot, NameIndex};

/// Owns the two in-memory indexes and applies the merge rules.
#[derive(Debug, Default)]
pub struct Aggregator {
    by_name: NameIndex,
    by_identifier: IdentifierIndex,
}

impl Aggregator {
    /// Create an aggregator with both indexes empty.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one completed unit into both indexes.
    ///
    /// A record with no rate-file URLs is skipped outright. Name records
    /// dedup structurally within an organization's list; identifier
    /// records are last-writer-wins per identifier.
    pub fn merge(&mut self, records: ExtractedRecords) {
        let ExtractedRecords {
            organization,
            name_record,
            identifier_record,
        } = records;

        let identifier = name_record.plan_id.clone();

        if name_record.urls.is_empty() {
            debug!(%organization, %identifier, "no rate-file URLs, name record skipped");
        } else {
            let plans = self.by_name.entry(organization).or_default();
            if !plans.contains(&name_record) {
                plans.push(name_record);
            }
        }

        if identifier_record.urls.is_empty() {
            debug!(%identifier, "no rate-file URLs, identifier record skipped");
            return;
        }

        if let Some(previous) = self.by_identifier.get(&identifier).and_then(|r| r.first()) {
            if previous.company_name != identifier_record.company_name {
                warn!(
                    %identifier,
                    previous = %previous.company_name,
                    replacement = %identifier_record.company_name,
                    "identifier collision across organizations, last merge wins"
                );
            }
        }
        self.by_identifier.insert(identifier, vec![identifier_record]);
    }

    /// Seal the run and hand back the immutable snapshot.
    pub fn finish(self) -> IndexSnapshot {
        IndexSnapshot {
            by_name: self.by_name,
            by_identifier: self.by_identifier,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use planindex_shared::{IdentifierRecord, NameRecord};

    fn unit(org: &str, plan_id: &str, plan_name: &str, urls: &[&str]) -> ExtractedRecords {
        let urls: Vec<String> = urls.iter().map(|u| (*u).into()).collect();
        ExtractedRecords {
            organization: org.into(),
            name_record: NameRecord {
                plan_name: plan_name.into(),
                plan_id: plan_id.into(),
                urls: urls.clone(),
            },
            identifier_record: IdentifierRecord {
                company_name: org.into(),
                plan_name: plan_name.into(),
                urls,
            },
        }
    }

    #[test]
    fn merge_populates_both_indexes() {
        let mut agg = Aggregator::new();
        agg.merge(unit("Acme", "1", "ACME PPO", &["https://a.example/1.json"]));

        let snapshot = agg.finish();
        assert_eq!(snapshot.by_name["Acme"].len(), 1);
        assert_eq!(snapshot.by_identifier["1"].len(), 1);
        assert_eq!(snapshot.by_identifier["1"][0].company_name, "Acme");
    }

    #[test]
    fn empty_urls_inserts_nothing() {
        let mut agg = Aggregator::new();
        agg.merge(unit("Beta", "2", "BETA EPO", &[]));

        let snapshot = agg.finish();
        assert!(snapshot.by_name.is_empty());
        assert!(snapshot.by_identifier.is_empty());
    }

    #[test]
    fn equal_name_records_dedup_within_an_organization() {
        let mut agg = Aggregator::new();
        agg.merge(unit("Acme", "1", "ACME PPO", &["https://a.example/1.json"]));
        agg.merge(unit("Acme", "1", "ACME PPO", &["https://a.example/1.json"]));

        let snapshot = agg.finish();
        assert_eq!(snapshot.by_name["Acme"].len(), 1);
    }

    #[test]
    fn distinct_plans_accumulate_under_one_organization() {
        let mut agg = Aggregator::new();
        agg.merge(unit("Acme", "1", "ACME PPO", &["https://a.example/1.json"]));
        agg.merge(unit("Acme", "2", "ACME HMO", &["https://a.example/2.json"]));

        let snapshot = agg.finish();
        assert_eq!(snapshot.by_name["Acme"].len(), 2);
        assert_eq!(snapshot.by_identifier.len(), 2);
    }

    #[test]
    fn identifier_last_writer_wins_in_merge_order() {
        // Completion order is pinned here by calling merge directly; the
        // second unit must replace the first.
        let mut agg = Aggregator::new();
        agg.merge(unit("Acme", "1", "ACME PPO", &["https://a.example/1.json"]));
        agg.merge(unit("Beta", "1", "BETA EPO", &["https://b.example/1.json"]));

        let snapshot = agg.finish();
        let stored = &snapshot.by_identifier["1"];
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].company_name, "Beta");

        // Both organizations keep their name-index entries.
        assert_eq!(snapshot.by_name.len(), 2);
    }

    #[test]
    fn empty_urls_does_not_displace_an_existing_identifier_entry() {
        let mut agg = Aggregator::new();
        agg.merge(unit("Acme", "1", "ACME PPO", &["https://a.example/1.json"]));
        agg.merge(unit("Beta", "1", "BETA EPO", &[]));

        let snapshot = agg.finish();
        assert_eq!(snapshot.by_identifier["1"][0].company_name, "Acme");
    }
}
