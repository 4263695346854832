//! Command handlers for the CLI.
//!
//! Every handler prints one JSON `OperationOutcome` per operation to stdout
//! and returns an error when the operation failed, so the process exits
//! non-zero.

use catsync_core::Source;
use catsync_engine::{CatalogSync, ChunkStop, OperationOutcome, SyncError};
use serde::Serialize;

/// Prints the outcome of `operation` and turns a failure into an error.
pub(crate) fn emit<T: Serialize>(
    operation: &'static str,
    result: Result<T, SyncError>,
) -> anyhow::Result<()> {
    let outcome = OperationOutcome::from_result(operation, result);
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    match outcome.error {
        Some(error) => Err(anyhow::anyhow!("{operation} failed: {}", error.message)),
        None => Ok(()),
    }
}

/// Downloads chunks until the catalog reports no more pages, then finalizes.
///
/// A chunk that ended on a failed page stops the loop without finalizing: the
/// staged pages are kept and the run can be resumed with `--start-page`.
pub(crate) async fn run_download(
    sync: &CatalogSync,
    source: Source,
    start_page: u32,
    max_chunks: Option<u32>,
    no_finalize: bool,
) -> anyhow::Result<()> {
    let mut page = start_page;
    let mut chunks = 0u32;

    loop {
        let chunk = match sync.download_chunk(source, page).await {
            Ok(chunk) => chunk,
            Err(e) => return emit::<()>("download", Err(e)),
        };
        chunks += 1;
        let has_more = chunk.has_more;
        let next_page = chunk.next_page;
        let failed_page = match &chunk.stop {
            ChunkStop::PageFetchFailed { page: failed, .. } => Some(*failed),
            _ => None,
        };
        emit("download", Ok(chunk))?;

        if let Some(failed) = failed_page {
            anyhow::bail!(
                "page {failed} of the {source} catalog could not be fetched; \
                 resume with `catsync download {source} --start-page {next_page}`"
            );
        }
        if !has_more {
            break;
        }
        if max_chunks.is_some_and(|max| chunks >= max) {
            tracing::info!(%source, next_page, "chunk limit reached; not finalizing");
            return Ok(());
        }
        page = next_page;
    }

    if no_finalize {
        tracing::info!(%source, "download complete; staging left in place");
        return Ok(());
    }
    emit("finalize", sync.finalize(source))
}
