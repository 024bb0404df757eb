use std::sync::Arc;

use reqwest::Client;
use tokio::sync::Mutex;

use prep_core::model::Dataset;
use storage::repository::Storage;
use storage::state::StateStore;

use crate::catalog::CatalogController;
use crate::dataset_loader::{load_dataset, DatasetSource};
use crate::error::CatalogError;
use crate::remote::{LeetCodeClient, QuestionListSource, RemoteConfig};
use crate::sync::{SharedCatalog, SyncService};

/// Assembles the catalog and its sync service over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    catalog: SharedCatalog,
    sync: Arc<SyncService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage and the live remote client.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if storage initialization or dataset loading
    /// fails.
    pub async fn new_sqlite(
        db_url: &str,
        dataset: &DatasetSource,
        remote: RemoteConfig,
    ) -> Result<Self, CatalogError> {
        let storage = Storage::sqlite(db_url).await?;
        let client = Client::new();
        let dataset = load_dataset(dataset, &client).await?;
        let source: Arc<dyn QuestionListSource> =
            Arc::new(LeetCodeClient::with_client(client, remote));
        Ok(Self::assemble(&storage, Arc::new(dataset), source).await)
    }

    /// Build services over any storage backend and question source.
    pub async fn assemble(
        storage: &Storage,
        dataset: Arc<Dataset>,
        source: Arc<dyn QuestionListSource>,
    ) -> Self {
        let controller = CatalogController::open(dataset, StateStore::new(storage)).await;
        let catalog: SharedCatalog = Arc::new(Mutex::new(controller));
        let sync = Arc::new(SyncService::new(Arc::clone(&catalog), source));
        Self { catalog, sync }
    }

    #[must_use]
    pub fn catalog(&self) -> SharedCatalog {
        Arc::clone(&self.catalog)
    }

    #[must_use]
    pub fn sync(&self) -> Arc<SyncService> {
        Arc::clone(&self.sync)
    }
}
