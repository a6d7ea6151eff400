//! Source loader: obtains the raw miR2Disease feed and parses it into
//! ordered row records.
//!
//! Resolution order: explicit override path → cached download → direct
//! remote read (when caching is disabled). Validation of row content is
//! deliberately left to the populate pipeline.

mod download;
mod parser;

pub use parser::parse_records;

use crate::config::Config;
use crate::error::{Mir2GraphError, Result};
use std::path::Path;

/// Canonical location of the miR2Disease "all entries" dump
pub const DATA_URL: &str =
    "http://watson.compbio.iupui.edu:8080/miR2Disease/download/AllEntries.txt";

/// File name the feed is cached under inside the data directory
pub const DATA_FILE_NAME: &str = "mir2diseaseRawData.tsv";

/// Positional column schema of the feed (it carries no header row)
pub const COLUMNS: [&str; 6] = [
    "miRNA ID",
    "MeSHDisease term",
    "Relationship",
    "Detection method",
    "Year",
    "Description",
];

/// One parsed line of the feed, fields in file order
#[derive(Debug, Clone)]
pub struct RawRecord {
    /// Zero-based line number in the feed, for skip logging
    pub row_index: usize,
    pub mirna_name: String,
    pub disease_name: String,
    /// Free-text direction, e.g. "up-regulated" / "down-regulated"
    pub direction: String,
    pub detection_method: String,
    pub year: String,
    pub description: String,
}

/// Load the feed and parse it into records, in file order.
///
/// `source_override` short-circuits both the cache and the remote fetch.
/// `force_download` re-fetches even if a cached copy exists.
pub async fn load_records(
    config: &Config,
    source_override: Option<&Path>,
    force_download: bool,
) -> Result<Vec<RawRecord>> {
    let text = match source_override {
        Some(path) => {
            log::info!("reading feed from {}", path.display());
            std::fs::read_to_string(path).map_err(|e| {
                Mir2GraphError::SourceUnavailable(format!("{}: {}", path.display(), e))
            })?
        }
        None if config.source.cache => {
            let dest = config.data_dir().join(DATA_FILE_NAME);
            download::download_feed(&config.source.url, &dest, force_download).await?;
            std::fs::read_to_string(&dest).map_err(|e| {
                Mir2GraphError::SourceUnavailable(format!("{}: {}", dest.display(), e))
            })?
        }
        None => {
            log::info!(
                "caching disabled, reading feed directly from {}",
                config.source.url
            );
            download::fetch_remote(&config.source.url).await?
        }
    };

    let records = parser::parse_records(&text);
    log::info!("parsed {} rows from feed", records.len());
    Ok(records)
}
