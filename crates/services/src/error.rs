//! Shared error types for the services crate.

use std::path::PathBuf;

use thiserror::Error;

use prep_core::model::{CredentialsError, DatasetError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by remote syncs and the remote query client.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SyncError {
    #[error("not logged in")]
    NotLoggedIn,
    #[error("a sync of this kind is already running")]
    AlreadyRunning,
    #[error("premium status already checked for this catalog")]
    AlreadyComplete,
    #[error("session changed while the sync was in flight; results discarded")]
    StaleSession,
    #[error("no solved questions found for this account")]
    NoSolvedQuestions,
    #[error("remote request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("remote query failed: {0}")]
    Remote(String),
    #[error("remote query returned no data")]
    EmptyResponse,
    #[error("invalid remote endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),
}

/// Errors emitted while fetching the question dataset.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DatasetLoadError {
    #[error("failed to read dataset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("dataset request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Dataset(#[from] DatasetError),
}

/// Errors emitted while bootstrapping or driving the catalog.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    DatasetLoad(#[from] DatasetLoadError),
    #[error(transparent)]
    Credentials(#[from] CredentialsError),
    #[error(transparent)]
    Sync(#[from] SyncError),
}
