use std::sync::Arc;

use prep_core::model::{
    CatalogState, Credentials, Dataset, Difficulty, Question, SortKey, SortState, StateKey,
    StatusMap,
};
use prep_core::query::{
    clamp_page, filter_questions, paginate, sort_questions, total_pages, SortContext, PAGE_SIZE,
};
use prep_core::stats::{compute_stats, PremiumSummary, ProgressStats, GOAL};
use storage::state::StateStore;

use crate::error::SyncError;

/// The two remote syncs the catalog can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncKind {
    Premium,
    Solved,
}

impl SyncKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Premium => "premium",
            Self::Solved => "solved",
        }
    }
}

/// Permission to run one sync, bound to the session it started in.
#[derive(Debug, Clone)]
pub struct SyncTicket {
    kind: SyncKind,
    id: u64,
    epoch: u64,
    credentials: Credentials,
}

impl SyncTicket {
    #[must_use]
    pub fn kind(&self) -> SyncKind {
        self.kind
    }

    #[must_use]
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }
}

/// One rendered page of the query pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct PageView<'a> {
    pub questions: Vec<&'a Question>,
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

/// Values offered by the filter controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOptions {
    pub companies: Vec<String>,
    pub topics: Vec<String>,
    pub difficulties: &'static [Difficulty],
}

#[derive(Debug, Default)]
struct RunningSyncs {
    premium: Option<u64>,
    solved: Option<u64>,
}

impl RunningSyncs {
    fn slot(&mut self, kind: SyncKind) -> &mut Option<u64> {
        match kind {
            SyncKind::Premium => &mut self.premium,
            SyncKind::Solved => &mut self.solved,
        }
    }
}

/// Owner of the catalog state and its only mutation entry point.
///
/// Every mutating method persists exactly the slots it changed before
/// returning. Views are recomputed from the current state on each call.
pub struct CatalogController {
    dataset: Arc<Dataset>,
    state: CatalogState,
    store: StateStore,
    epoch: u64,
    next_ticket: u64,
    running: RunningSyncs,
}

impl CatalogController {
    /// Load persisted state for `dataset`.
    pub async fn open(dataset: Arc<Dataset>, store: StateStore) -> Self {
        let state = store.load().await;
        Self {
            dataset,
            state,
            store,
            epoch: 0,
            next_ticket: 0,
            running: RunningSyncs::default(),
        }
    }

    #[must_use]
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    #[must_use]
    pub fn state(&self) -> &CatalogState {
        &self.state
    }

    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.state.is_logged_in()
    }

    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.state.username.as_deref()
    }

    async fn persist(&self, keys: &[StateKey]) {
        self.store.save(keys, &self.state).await;
    }

    //
    // ─── FILTERS & SORT ───────────────────────────────────────────────────────
    //

    pub async fn set_companies<I, S>(&mut self, companies: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let touched = self.state.set_companies(companies);
        self.persist(touched).await;
    }

    pub async fn set_topics<I, S>(&mut self, topics: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let touched = self.state.set_topics(topics);
        self.persist(touched).await;
    }

    pub async fn set_difficulties(&mut self, difficulties: impl IntoIterator<Item = Difficulty>) {
        let touched = self.state.set_difficulties(difficulties);
        self.persist(touched).await;
    }

    pub async fn set_hide_premium(&mut self, hide: bool) {
        let touched = self.state.set_hide_premium(hide);
        self.persist(touched).await;
    }

    pub async fn set_search_query(&mut self, query: impl Into<String>) {
        let touched = self.state.set_search_query(query);
        self.persist(touched).await;
    }

    pub async fn clear_filters(&mut self) {
        let touched = self.state.clear_filters();
        self.persist(touched).await;
    }

    pub async fn toggle_sort(&mut self, key: SortKey) {
        let touched = self.state.toggle_sort(key);
        self.persist(touched).await;
    }

    /// Jump to `page`, clamped to the pages the current result has.
    pub async fn set_page(&mut self, page: usize) {
        let total = total_pages(self.filtered().len(), PAGE_SIZE);
        let touched = self.state.set_page(clamp_page(page, total));
        self.persist(touched).await;
    }

    /// Flip the revised mark on `title` and return the new value.
    pub async fn toggle_revised(&mut self, title: &str) -> bool {
        let touched = self.state.toggle_revised(title);
        self.persist(touched).await;
        self.state.revised.is_set(title)
    }

    //
    // ─── ACCOUNT ──────────────────────────────────────────────────────────────
    //

    /// Store the credential and start a new session epoch.
    pub async fn login(&mut self, credentials: Credentials, username: Option<String>) {
        self.new_epoch();
        let touched = self.state.login(credentials, username);
        self.persist(touched).await;
        tracing::info!(user = ?self.state.username, "logged in");
    }

    /// Forget the account. Syncs still in flight become stale.
    pub async fn logout(&mut self) {
        self.new_epoch();
        let touched = self.state.logout();
        self.persist(touched).await;
        tracing::info!("logged out");
    }

    fn new_epoch(&mut self) {
        self.epoch += 1;
        self.running = RunningSyncs::default();
    }

    //
    // ─── VIEWS ────────────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn filtered(&self) -> Vec<&Question> {
        filter_questions(
            self.dataset.questions(),
            &self.state.selection,
            &self.state.premium,
        )
    }

    #[must_use]
    pub fn sorted(&self) -> Vec<&Question> {
        let ctx = SortContext {
            selected_companies: &self.state.selection.companies,
            revised: &self.state.revised,
            solved: &self.state.solved,
        };
        sort_questions(self.filtered(), &self.state.sort, &ctx)
    }

    #[must_use]
    pub fn current_page(&self) -> PageView<'_> {
        let sorted = self.sorted();
        let page = paginate(&sorted, self.state.page, PAGE_SIZE);
        PageView {
            questions: page.items.to_vec(),
            page: page.page,
            total_pages: page.total_pages,
            total_items: page.total_items,
        }
    }

    #[must_use]
    pub fn stats(&self) -> ProgressStats {
        compute_stats(
            self.dataset.questions(),
            &self.state.solved,
            &self.state.revised,
            &self.state.selection.companies,
            GOAL,
        )
    }

    #[must_use]
    pub fn filter_options(&self) -> FilterOptions {
        FilterOptions {
            companies: self.dataset.company_options(),
            topics: self.dataset.topic_options(),
            difficulties: self.dataset.difficulty_options(),
        }
    }

    #[must_use]
    pub fn sort_state(&self, key: SortKey) -> SortState {
        self.state.sort.state(key)
    }

    #[must_use]
    pub fn premium_summary(&self) -> PremiumSummary {
        PremiumSummary::from_map(&self.state.premium)
    }

    #[must_use]
    pub fn premium_check_complete(&self) -> bool {
        self.state
            .premium_check
            .is_complete_for(self.dataset.fingerprint())
    }

    //
    // ─── SYNC BOOKKEEPING ─────────────────────────────────────────────────────
    //

    /// Reserve the right to run a sync of `kind`.
    ///
    /// # Errors
    ///
    /// - `SyncError::NotLoggedIn` without a credential.
    /// - `SyncError::AlreadyComplete` for a premium sync already finished for
    ///   this dataset.
    /// - `SyncError::AlreadyRunning` while another sync of `kind` holds a
    ///   ticket in this session.
    pub fn begin_sync(&mut self, kind: SyncKind) -> Result<SyncTicket, SyncError> {
        let credentials = self
            .state
            .credentials
            .clone()
            .ok_or(SyncError::NotLoggedIn)?;

        if kind == SyncKind::Premium && self.premium_check_complete() {
            tracing::info!("premium status already checked, skipping sync");
            return Err(SyncError::AlreadyComplete);
        }

        let slot = self.running.slot(kind);
        if slot.is_some() {
            return Err(SyncError::AlreadyRunning);
        }
        self.next_ticket += 1;
        *slot = Some(self.next_ticket);

        tracing::debug!(kind = kind.as_str(), epoch = self.epoch, "sync started");
        Ok(SyncTicket {
            kind,
            id: self.next_ticket,
            epoch: self.epoch,
            credentials,
        })
    }

    fn check_current(&mut self, ticket: &SyncTicket) -> Result<(), SyncError> {
        if ticket.epoch == self.epoch && *self.running.slot(ticket.kind) == Some(ticket.id) {
            Ok(())
        } else {
            tracing::warn!(
                kind = ticket.kind.as_str(),
                ticket_epoch = ticket.epoch,
                epoch = self.epoch,
                "discarding result from a stale sync"
            );
            Err(SyncError::StaleSession)
        }
    }

    /// Release `ticket` if it is still the active one. Safe to call twice.
    pub fn finish(&mut self, ticket: &SyncTicket) {
        if ticket.epoch != self.epoch {
            return;
        }
        let slot = self.running.slot(ticket.kind);
        if *slot == Some(ticket.id) {
            *slot = None;
        }
    }

    /// Merge one batch of premium flags, keeping every earlier batch.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::StaleSession` if the session changed since the
    /// ticket was issued; nothing is written in that case.
    pub async fn merge_premium_batch(
        &mut self,
        ticket: &SyncTicket,
        entries: impl IntoIterator<Item = (String, bool)>,
    ) -> Result<(), SyncError> {
        self.check_current(ticket)?;
        let touched = self.state.merge_premium(entries);
        self.persist(touched).await;
        Ok(())
    }

    /// Mark the premium scan finished for the current dataset.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::StaleSession` for a ticket from an earlier session.
    pub async fn complete_premium_sync(&mut self, ticket: &SyncTicket) -> Result<(), SyncError> {
        self.check_current(ticket)?;
        let fingerprint = self.dataset.fingerprint().to_owned();
        let touched = self.state.mark_premium_complete(&fingerprint);
        self.persist(touched).await;
        self.finish(ticket);
        tracing::info!(
            checked = self.state.premium.len(),
            premium = self.state.premium.count_set(),
            "premium status check complete"
        );
        Ok(())
    }

    /// Replace the solved map with `titles` and return how many were stored.
    ///
    /// # Errors
    ///
    /// - `SyncError::StaleSession` for a ticket from an earlier session.
    /// - `SyncError::NoSolvedQuestions` when `titles` is empty; the previous
    ///   map is kept.
    pub async fn apply_solved_sync(
        &mut self,
        ticket: &SyncTicket,
        titles: Vec<String>,
    ) -> Result<usize, SyncError> {
        self.check_current(ticket)?;
        self.finish(ticket);
        if titles.is_empty() {
            tracing::warn!("solved sync returned nothing; keeping previous solved map");
            return Err(SyncError::NoSolvedQuestions);
        }
        let solved = StatusMap::from_titles(titles);
        let count = solved.count_set();
        let touched = self.state.replace_solved(solved);
        self.persist(touched).await;
        tracing::info!(count, "synced solved questions");
        Ok(count)
    }
}
