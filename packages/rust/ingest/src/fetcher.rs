//! Document fetcher: one HTTP GET per source URL, body decoded as JSON.
//!
//! A single failed attempt terminates that URL's unit of work — there are
//! no retries at this layer.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use planindex_shared::{PlanIndexError, Result};

/// User-Agent string for index document requests.
const USER_AGENT: &str = concat!("planindex/", env!("CARGO_PKG_VERSION"));

/// HTTP client for fetching index documents.
///
/// Cheap to clone; all clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct FetchClient {
    client: Client,
}

impl FetchClient {
    /// Build a client for a fan-out of `concurrency` simultaneous requests.
    ///
    /// The connection pool is sized to the concurrency cap so pool
    /// exhaustion never silently serializes the fan-out, and every request
    /// carries a finite timeout.
    pub fn new(concurrency: usize, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(Duration::from_secs(timeout_secs))
            .pool_max_idle_per_host(concurrency.max(1))
            .build()
            .map_err(|e| PlanIndexError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// Fetch one index document and decode its body as JSON.
    ///
    /// Fails with [`PlanIndexError::Network`] on connection failure,
    /// timeout, or a non-success status, and with
    /// [`PlanIndexError::Decode`] if the body is not valid JSON.
    pub async fn fetch_document(&self, url: &str) -> Result<Value> {
        debug!(%url, "fetching index document");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| PlanIndexError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PlanIndexError::Network(format!("{url}: HTTP {status}")));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| PlanIndexError::Network(format!("{url}: body read failed: {e}")))?;

        serde_json::from_slice(&body).map_err(|e| PlanIndexError::Decode(format!("{url}: {e}")))
    }
}
