//! Remote fetch and local caching of the feed file.

use crate::error::{Mir2GraphError, Result};
use reqwest::Client;
use std::path::Path;
use std::time::Duration;

/// Fetch the feed body straight from the remote source.
///
/// One blocking-style GET with a flat timeout; no retries. A failure here
/// is terminal for the caller.
pub(crate) async fn fetch_remote(url: &str) -> Result<String> {
    let client = Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .expect("Failed to build HTTP client");

    let response = client
        .get(url)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| Mir2GraphError::SourceUnavailable(format!("fetching {url}: {e}")))?;

    response
        .text()
        .await
        .map_err(|e| Mir2GraphError::SourceUnavailable(format!("reading body of {url}: {e}")))
}

/// Ensure the feed is present at `dest`, downloading it if needed.
pub(crate) async fn download_feed(url: &str, dest: &Path, force: bool) -> Result<()> {
    if dest.exists() && !force {
        log::info!("using cached data at {}", dest.display());
        return Ok(());
    }

    log::info!("downloading {} to {}", url, dest.display());
    let body = fetch_remote(url).await?;

    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(dest, body)?;

    Ok(())
}
