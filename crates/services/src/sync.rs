use std::sync::Arc;

use tokio::sync::Mutex;

use prep_core::model::Credentials;

use crate::catalog::{CatalogController, SyncKind, SyncTicket};
use crate::error::SyncError;
use crate::pagination::PageCursor;
use crate::remote::{ListFilter, QuestionListSource, SYNC_BATCH_SIZE};

/// Catalog shared between the caller and running syncs.
pub type SharedCatalog = Arc<Mutex<CatalogController>>;

/// Drives remote syncs into the catalog.
///
/// The catalog lock is taken only to reserve a ticket and to apply results;
/// it is never held across a remote request, so views stay responsive and a
/// logout can land mid-sync.
#[derive(Clone)]
pub struct SyncService {
    catalog: SharedCatalog,
    source: Arc<dyn QuestionListSource>,
    batch_size: usize,
}

impl SyncService {
    #[must_use]
    pub fn new(catalog: SharedCatalog, source: Arc<dyn QuestionListSource>) -> Self {
        Self {
            catalog,
            source,
            batch_size: SYNC_BATCH_SIZE,
        }
    }

    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    #[must_use]
    pub fn catalog(&self) -> &SharedCatalog {
        &self.catalog
    }

    /// Log in with `credentials`, resolving the username from the remote.
    ///
    /// A failed profile lookup still logs in, just without a username.
    pub async fn login(&self, credentials: Credentials) -> Option<String> {
        let username = match self.source.fetch_user_profile(&credentials).await {
            Ok(profile) => {
                let name = profile.signed_in_username().map(str::to_owned);
                if name.is_none() {
                    tracing::warn!("remote reports the credential is not signed in");
                }
                name
            }
            Err(err) => {
                tracing::warn!(error = %err, "user profile lookup failed");
                None
            }
        };
        self.catalog
            .lock()
            .await
            .login(credentials, username.clone())
            .await;
        username
    }

    pub async fn logout(&self) {
        self.catalog.lock().await.logout().await;
    }

    /// Page through every remote question and record its premium flag.
    ///
    /// Batches are merged as they arrive; a failure part-way keeps the
    /// batches already merged and leaves the check incomplete. Returns the
    /// number of titles checked by this run.
    ///
    /// # Errors
    ///
    /// Returns `SyncError` if the sync cannot start, a request fails, or
    /// the session changed while it ran.
    pub async fn sync_premium(&self) -> Result<usize, SyncError> {
        let ticket = self.catalog.lock().await.begin_sync(SyncKind::Premium)?;
        let outcome = self.run_premium(&ticket).await;
        if outcome.is_err() {
            self.catalog.lock().await.finish(&ticket);
        }
        outcome
    }

    async fn run_premium(&self, ticket: &SyncTicket) -> Result<usize, SyncError> {
        let mut cursor = PageCursor::new(ListFilter::All, self.batch_size);
        while let Some(request) = cursor.next_request() {
            let page = self
                .source
                .fetch_page(ticket.credentials(), request)
                .await?;
            cursor.advance(&page);
            if page.items.is_empty() {
                continue;
            }
            let entries = page
                .items
                .into_iter()
                .map(|q| (q.title, q.is_paid_only));
            self.catalog
                .lock()
                .await
                .merge_premium_batch(ticket, entries)
                .await?;
            tracing::info!(fetched = cursor.fetched(), total = ?page.total, "premium status batch merged");
        }
        self.catalog
            .lock()
            .await
            .complete_premium_sync(ticket)
            .await?;
        Ok(cursor.fetched())
    }

    /// Fetch every accepted question and replace the solved map with them.
    ///
    /// Returns the number of solved titles stored.
    ///
    /// # Errors
    ///
    /// Returns `SyncError` if the sync cannot start, a request fails, the
    /// account has no solved questions, or the session changed while it ran.
    /// The previous solved map is kept on every error.
    pub async fn sync_solved(&self) -> Result<usize, SyncError> {
        let ticket = self.catalog.lock().await.begin_sync(SyncKind::Solved)?;
        let outcome = self.run_solved(&ticket).await;
        if outcome.is_err() {
            self.catalog.lock().await.finish(&ticket);
        }
        outcome
    }

    async fn run_solved(&self, ticket: &SyncTicket) -> Result<usize, SyncError> {
        let mut cursor = PageCursor::new(ListFilter::Solved, self.batch_size);
        let mut titles = Vec::new();
        while let Some(request) = cursor.next_request() {
            let page = self
                .source
                .fetch_page(ticket.credentials(), request)
                .await?;
            cursor.advance(&page);
            titles.extend(page.items.into_iter().map(|q| q.title));
            tracing::debug!(fetched = cursor.fetched(), total = ?page.total, "solved batch fetched");
        }
        self.catalog
            .lock()
            .await
            .apply_solved_sync(ticket, titles)
            .await
    }
}
