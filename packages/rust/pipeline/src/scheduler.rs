//! Bounded worker pool for fetch+extract units.
//!
//! One task is spawned per source URL, gated by a shared semaphore so at
//! most `concurrency` units are in flight. Completions are delivered to
//! the single consumer over an mpsc channel in arrival order, which is
//! not submission order.

use std::sync::Arc;

use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinHandle;

use planindex_ingest::{ExtractedRecords, FetchClient, extract_records};
use planindex_shared::Result;

/// One completed unit: the URL it was spawned for plus its outcome.
pub(crate) struct UnitResult {
    pub url: String,
    pub outcome: Result<ExtractedRecords>,
}

/// Spawn a fetch+extract unit for every URL.
///
/// Returns the completion channel and the task handles, which the caller
/// aborts on a fail-fast exit. The channel closes once every unit has
/// reported.
pub(crate) fn spawn_units(
    client: &FetchClient,
    urls: &[String],
    concurrency: usize,
) -> (mpsc::Receiver<UnitResult>, Vec<JoinHandle<()>>) {
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let (tx, rx) = mpsc::channel(concurrency.max(1));

    let mut handles = Vec::with_capacity(urls.len());
    for url in urls {
        let client = client.clone();
        let sem = semaphore.clone();
        let tx = tx.clone();
        let url = url.clone();

        handles.push(tokio::spawn(async move {
            let _permit = sem.acquire().await.expect("semaphore closed");
            let outcome = fetch_and_extract(&client, &url).await;
            // Send fails only after a fail-fast abort dropped the receiver.
            let _ = tx.send(UnitResult { url, outcome }).await;
        }));
    }

    (rx, handles)
}

/// Run one unit of work: fetch the document, then extract its records.
async fn fetch_and_extract(client: &FetchClient, url: &str) -> Result<ExtractedRecords> {
    let doc = client.fetch_document(url).await?;
    extract_records(&doc)
}
