use std::path::PathBuf;

use reqwest::Client;
use url::Url;

use prep_core::model::Dataset;

use crate::error::DatasetLoadError;

pub const DEFAULT_DATASET: &str = "data.json";

/// Where the question catalog is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetSource {
    File(PathBuf),
    Remote(Url),
}

impl DatasetSource {
    /// `http(s)` URLs are fetched; anything else is a local path.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match Url::parse(raw) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Self::Remote(url),
            _ => Self::File(PathBuf::from(raw)),
        }
    }
}

impl Default for DatasetSource {
    fn default() -> Self {
        Self::File(PathBuf::from(DEFAULT_DATASET))
    }
}

/// Fetch and parse the catalog once.
///
/// # Errors
///
/// Returns `DatasetLoadError` if the source cannot be read or is not a JSON
/// array of questions.
pub async fn load_dataset(
    source: &DatasetSource,
    client: &Client,
) -> Result<Dataset, DatasetLoadError> {
    let bytes = match source {
        DatasetSource::File(path) => {
            tokio::fs::read(path)
                .await
                .map_err(|source| DatasetLoadError::Io {
                    path: path.clone(),
                    source,
                })?
        }
        DatasetSource::Remote(url) => {
            let response = client.get(url.clone()).send().await?;
            if !response.status().is_success() {
                return Err(DatasetLoadError::HttpStatus(response.status()));
            }
            response.bytes().await?.to_vec()
        }
    };

    let dataset = Dataset::from_json_slice(&bytes)?;
    if dataset.skipped_records() > 0 {
        tracing::warn!(
            count = dataset.skipped_records(),
            "dataset has records without a usable title; skipping them"
        );
    }
    if !dataset.duplicate_titles().is_empty() {
        tracing::warn!(
            count = dataset.duplicate_titles().len(),
            titles = ?dataset.duplicate_titles(),
            "dataset repeats titles; keeping the first record of each"
        );
    }
    tracing::info!(questions = dataset.len(), source = ?source, "dataset loaded");
    Ok(dataset)
}
