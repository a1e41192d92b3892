//! End-to-end index build: URL list → bounded fan-out → aggregation.

use std::path::Path;

use tracing::{info, instrument, warn};
use url::Url;

use planindex_ingest::FetchClient;
use planindex_shared::{FailurePolicy, IndexSnapshot, PipelineConfig, PlanIndexError, Result};

use crate::aggregator::Aggregator;
use crate::scheduler;

// ---------------------------------------------------------------------------
// Progress reporting
// ---------------------------------------------------------------------------

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called once per completed unit, successful or skipped.
    fn unit_done(&self, url: &str, current: usize, total: usize);
    /// Called when the run completes.
    fn done(&self);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn unit_done(&self, _url: &str, _current: usize, _total: usize) {}
    fn done(&self) {}
}

// ---------------------------------------------------------------------------
// Input list
// ---------------------------------------------------------------------------

/// Read the newline-delimited URL list produced by the upstream discovery
/// step.
///
/// Lines are trimmed and blank lines skipped; every remaining line must be
/// an absolute URL. Order carries no meaning for the pipeline.
pub fn read_url_list(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path).map_err(|e| PlanIndexError::io(path, e))?;

    let mut urls = Vec::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        Url::parse(line)
            .map_err(|e| PlanIndexError::validation(format!("invalid source URL '{line}': {e}")))?;
        urls.push(line.to_string());
    }

    Ok(urls)
}

// ---------------------------------------------------------------------------
// Build pipeline
// ---------------------------------------------------------------------------

/// Fetch and extract every URL under the concurrency cap, merging results
/// into the two indexes as they arrive.
///
/// The aggregator is the only consumer of completions, so index mutations
/// are never concurrent with each other. Under [`FailurePolicy::Abort`]
/// the first failed unit aborts outstanding work and the error names the
/// offending URL; under [`FailurePolicy::Skip`] failed units are logged
/// and dropped.
#[instrument(skip_all, fields(sources = urls.len(), concurrency = config.concurrency))]
pub async fn build_index(
    urls: &[String],
    config: &PipelineConfig,
    progress: &dyn ProgressReporter,
) -> Result<IndexSnapshot> {
    let client = FetchClient::new(config.concurrency, config.timeout_secs)?;
    let (mut completions, handles) = scheduler::spawn_units(&client, urls, config.concurrency);

    let total = urls.len();
    let mut merged = 0usize;
    let mut skipped = 0usize;
    let mut aggregator = Aggregator::new();

    info!(sources = total, policy = ?config.failure_policy, "starting index build");

    while let Some(unit) = completions.recv().await {
        match unit.outcome {
            Ok(records) => {
                aggregator.merge(records);
                merged += 1;
            }
            Err(e) => match config.failure_policy {
                FailurePolicy::Abort => {
                    for handle in &handles {
                        handle.abort();
                    }
                    return Err(PlanIndexError::unit(unit.url, e));
                }
                FailurePolicy::Skip => {
                    warn!(url = %unit.url, error = %e, "unit failed, skipping");
                    skipped += 1;
                }
            },
        }
        progress.unit_done(&unit.url, merged + skipped, total);
    }

    progress.done();

    let snapshot = aggregator.finish();
    info!(
        merged,
        skipped,
        organizations = snapshot.organization_count(),
        plans = snapshot.plan_count(),
        "index build complete"
    );

    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn index_document(org: &str, plan_id: &str, plan_name: &str, urls: &[&str]) -> serde_json::Value {
        let files: Vec<_> = urls.iter().map(|u| json!({"location": u})).collect();
        json!({
            "reporting_entity_name": org,
            "reporting_structure": [{
                "reporting_plans": [{"plan_id": plan_id, "plan_name": plan_name}],
                "in_network_files": files
            }]
        })
    }

    async fn mount_document(server: &MockServer, at: &str, doc: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path(at))
            .respond_with(ResponseTemplate::new(200).set_body_json(doc))
            .mount(server)
            .await;
    }

    fn serial_config() -> PipelineConfig {
        // Concurrency 1 makes completion order equal input order, which
        // the order-sensitive assertions below rely on.
        PipelineConfig {
            concurrency: 1,
            timeout_secs: 5,
            failure_policy: FailurePolicy::Abort,
        }
    }

    struct CountingProgress {
        units: AtomicUsize,
        finished: AtomicUsize,
    }

    impl ProgressReporter for CountingProgress {
        fn unit_done(&self, _url: &str, _current: usize, _total: usize) {
            self.units.fetch_add(1, Ordering::SeqCst);
        }
        fn done(&self) {
            self.finished.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn three_fixture_end_to_end() {
        let server = MockServer::start().await;
        mount_document(
            &server,
            "/a.json",
            index_document(
                "Acme",
                "880111111",
                "ACME PPO",
                &["https://files.example.com/a-1.json", "https://files.example.com/a-2.json"],
            ),
        )
        .await;
        mount_document(
            &server,
            "/b.json",
            index_document("Acme", "880222222", "ACME HMO", &["https://files.example.com/b.json"]),
        )
        .await;
        // Same identifier as A, but no rate files: contributes nothing.
        mount_document(
            &server,
            "/c.json",
            index_document("Beta", "880111111", "BETA EPO", &[]),
        )
        .await;

        let urls = vec![
            format!("{}/a.json", server.uri()),
            format!("{}/b.json", server.uri()),
            format!("{}/c.json", server.uri()),
        ];

        let progress = CountingProgress {
            units: AtomicUsize::new(0),
            finished: AtomicUsize::new(0),
        };
        let snapshot = build_index(&urls, &serial_config(), &progress).await.unwrap();

        let acme_plans = &snapshot.by_name["Acme"];
        assert_eq!(acme_plans.len(), 2);
        assert_eq!(acme_plans[0].plan_id, "880111111");
        assert_eq!(
            acme_plans[0].urls,
            vec!["https://files.example.com/a-1.json", "https://files.example.com/a-2.json"]
        );
        assert_eq!(acme_plans[1].plan_id, "880222222");
        assert!(!snapshot.by_name.contains_key("Beta"));

        // C was skipped for empty urls, so A's identifier entry survives.
        assert_eq!(snapshot.by_identifier.len(), 2);
        assert_eq!(snapshot.by_identifier["880111111"][0].company_name, "Acme");

        assert_eq!(progress.units.load(Ordering::SeqCst), 3);
        assert_eq!(progress.finished.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn identifier_collision_last_completion_wins() {
        let server = MockServer::start().await;
        mount_document(
            &server,
            "/acme.json",
            index_document("Acme", "880111111", "ACME PPO", &["https://files.example.com/a.json"]),
        )
        .await;
        mount_document(
            &server,
            "/beta.json",
            index_document("Beta", "880111111", "BETA EPO", &["https://files.example.com/b.json"]),
        )
        .await;

        let urls = vec![
            format!("{}/acme.json", server.uri()),
            format!("{}/beta.json", server.uri()),
        ];

        let snapshot = build_index(&urls, &serial_config(), &SilentProgress).await.unwrap();

        let stored = &snapshot.by_identifier["880111111"];
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].company_name, "Beta");
    }

    #[tokio::test]
    async fn fail_fast_surfaces_the_offending_url() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/down.json"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        mount_document(
            &server,
            "/ok.json",
            index_document("Acme", "1", "ACME PPO", &["https://files.example.com/a.json"]),
        )
        .await;

        let urls = vec![
            format!("{}/down.json", server.uri()),
            format!("{}/ok.json", server.uri()),
        ];

        let err = build_index(&urls, &serial_config(), &SilentProgress)
            .await
            .unwrap_err();

        match err {
            PlanIndexError::Unit { url, source } => {
                assert!(url.ends_with("/down.json"));
                assert!(matches!(*source, PlanIndexError::Network(_)));
            }
            other => panic!("expected Unit, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn schema_failure_aborts_under_fail_fast() {
        let server = MockServer::start().await;
        mount_document(&server, "/bad.json", json!({"reporting_entity_name": "Acme"})).await;

        let urls = vec![format!("{}/bad.json", server.uri())];
        let err = build_index(&urls, &serial_config(), &SilentProgress)
            .await
            .unwrap_err();

        match err {
            PlanIndexError::Unit { source, .. } => {
                assert!(matches!(*source, PlanIndexError::Schema { .. }));
            }
            other => panic!("expected Unit, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn skip_policy_isolates_failed_units() {
        let server = MockServer::start().await;
        mount_document(
            &server,
            "/a.json",
            index_document("Acme", "1", "ACME PPO", &["https://files.example.com/a.json"]),
        )
        .await;
        mount_document(&server, "/bad.json", json!({"reporting_entity_name": "Broken"})).await;
        mount_document(
            &server,
            "/b.json",
            index_document("Beta", "2", "BETA EPO", &["https://files.example.com/b.json"]),
        )
        .await;

        let urls = vec![
            format!("{}/a.json", server.uri()),
            format!("{}/bad.json", server.uri()),
            format!("{}/b.json", server.uri()),
        ];

        let config = PipelineConfig {
            failure_policy: FailurePolicy::Skip,
            ..serial_config()
        };
        let snapshot = build_index(&urls, &config, &SilentProgress).await.unwrap();

        assert_eq!(snapshot.organization_count(), 2);
        assert!(snapshot.by_name.contains_key("Acme"));
        assert!(snapshot.by_name.contains_key("Beta"));
    }

    #[tokio::test]
    async fn empty_url_list_builds_empty_snapshot() {
        let snapshot = build_index(&[], &serial_config(), &SilentProgress).await.unwrap();
        assert_eq!(snapshot.organization_count(), 0);
        assert_eq!(snapshot.plan_count(), 0);
    }

    #[test]
    fn url_list_trims_and_skips_blank_lines() {
        let dir = std::env::temp_dir().join(format!("planindex-urls-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("company_files.txt");
        std::fs::write(
            &file,
            "https://example.com/acme/index.json\n\n  https://example.com/beta/index.json  \n",
        )
        .unwrap();

        let urls = read_url_list(&file).unwrap();
        assert_eq!(
            urls,
            vec![
                "https://example.com/acme/index.json",
                "https://example.com/beta/index.json"
            ]
        );

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn url_list_rejects_relative_entries() {
        let dir = std::env::temp_dir().join(format!("planindex-urls-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("company_files.txt");
        std::fs::write(&file, "acme/index.json\n").unwrap();

        let err = read_url_list(&file).unwrap_err();
        assert!(matches!(err, PlanIndexError::Validation { .. }));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
