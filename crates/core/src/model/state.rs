use super::account::Credentials;
use super::question::Difficulty;
use super::selection::FilterSelection;
use super::sort::{SortConfig, SortKey};
use super::status::{PremiumCheck, StatusMap};

/// Durable slots of the catalog state, one per persisted value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StateKey {
    RevisedMap,
    SolvedMap,
    PremiumMap,
    SelectedCompanies,
    SelectedTopics,
    SelectedDifficulties,
    HidePremium,
    PremiumCheckComplete,
    SearchQuery,
    CurrentPage,
    SortConfig,
    Credentials,
    Username,
}

impl StateKey {
    pub const ALL: [StateKey; 13] = [
        StateKey::RevisedMap,
        StateKey::SolvedMap,
        StateKey::PremiumMap,
        StateKey::SelectedCompanies,
        StateKey::SelectedTopics,
        StateKey::SelectedDifficulties,
        StateKey::HidePremium,
        StateKey::PremiumCheckComplete,
        StateKey::SearchQuery,
        StateKey::CurrentPage,
        StateKey::SortConfig,
        StateKey::Credentials,
        StateKey::Username,
    ];

    /// Storage key name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            StateKey::RevisedMap => "revisedMap",
            StateKey::SolvedMap => "solvedMap",
            StateKey::PremiumMap => "premiumMap",
            StateKey::SelectedCompanies => "selectedCompanies",
            StateKey::SelectedTopics => "selectedTopics",
            StateKey::SelectedDifficulties => "selectedDifficulties",
            StateKey::HidePremium => "hidePremium",
            StateKey::PremiumCheckComplete => "premiumCheckComplete",
            StateKey::SearchQuery => "searchQuery",
            StateKey::CurrentPage => "currentPage",
            StateKey::SortConfig => "sortConfig",
            StateKey::Credentials => "lcCredentials",
            StateKey::Username => "lcUsername",
        }
    }
}

const FIRST_PAGE: usize = 1;

/// Everything the catalog remembers between runs.
///
/// Mutators return the slots they touched so the owner can persist exactly
/// those. Any change to the filter selection or sort order moves the cursor
/// back to the first page.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogState {
    pub selection: FilterSelection,
    pub sort: SortConfig,
    pub page: usize,
    pub revised: StatusMap,
    pub solved: StatusMap,
    pub premium: StatusMap,
    pub premium_check: PremiumCheck,
    pub credentials: Option<Credentials>,
    pub username: Option<String>,
}

impl Default for CatalogState {
    fn default() -> Self {
        Self {
            selection: FilterSelection::default(),
            sort: SortConfig::default(),
            page: FIRST_PAGE,
            revised: StatusMap::default(),
            solved: StatusMap::default(),
            premium: StatusMap::default(),
            premium_check: PremiumCheck::default(),
            credentials: None,
            username: None,
        }
    }
}

impl CatalogState {
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.credentials.is_some()
    }

    pub fn set_companies<I, S>(&mut self, companies: I) -> &'static [StateKey]
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selection.companies = companies.into_iter().map(Into::into).collect();
        self.page = FIRST_PAGE;
        &[StateKey::SelectedCompanies, StateKey::CurrentPage]
    }

    pub fn set_topics<I, S>(&mut self, topics: I) -> &'static [StateKey]
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selection.topics = topics.into_iter().map(Into::into).collect();
        self.page = FIRST_PAGE;
        &[StateKey::SelectedTopics, StateKey::CurrentPage]
    }

    /// Labels outside the fixed difficulty set are dropped.
    pub fn set_difficulties(
        &mut self,
        difficulties: impl IntoIterator<Item = Difficulty>,
    ) -> &'static [StateKey] {
        self.selection.difficulties = difficulties.into_iter().filter(|d| d.is_known()).collect();
        self.page = FIRST_PAGE;
        &[StateKey::SelectedDifficulties, StateKey::CurrentPage]
    }

    pub fn set_hide_premium(&mut self, hide: bool) -> &'static [StateKey] {
        self.selection.hide_premium = hide;
        self.page = FIRST_PAGE;
        &[StateKey::HidePremium, StateKey::CurrentPage]
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) -> &'static [StateKey] {
        self.selection.search_query = query.into();
        self.page = FIRST_PAGE;
        &[StateKey::SearchQuery, StateKey::CurrentPage]
    }

    pub fn clear_filters(&mut self) -> &'static [StateKey] {
        self.selection = FilterSelection::default();
        self.page = FIRST_PAGE;
        &[
            StateKey::SelectedCompanies,
            StateKey::SelectedTopics,
            StateKey::SelectedDifficulties,
            StateKey::SearchQuery,
            StateKey::HidePremium,
            StateKey::CurrentPage,
        ]
    }

    pub fn toggle_sort(&mut self, key: SortKey) -> &'static [StateKey] {
        self.sort.toggle(key);
        self.page = FIRST_PAGE;
        &[StateKey::SortConfig, StateKey::CurrentPage]
    }

    /// Move the cursor. Page numbers are 1-based; 0 is treated as 1.
    pub fn set_page(&mut self, page: usize) -> &'static [StateKey] {
        self.page = page.max(FIRST_PAGE);
        &[StateKey::CurrentPage]
    }

    pub fn toggle_revised(&mut self, title: &str) -> &'static [StateKey] {
        self.revised.toggle(title);
        &[StateKey::RevisedMap]
    }

    /// Replace the solved map wholesale; the remote account is authoritative.
    pub fn replace_solved(&mut self, solved: StatusMap) -> &'static [StateKey] {
        self.solved = solved;
        &[StateKey::SolvedMap]
    }

    pub fn merge_premium(
        &mut self,
        entries: impl IntoIterator<Item = (String, bool)>,
    ) -> &'static [StateKey] {
        self.premium.merge(entries);
        &[StateKey::PremiumMap]
    }

    pub fn mark_premium_complete(&mut self, fingerprint: &str) -> &'static [StateKey] {
        self.premium_check = PremiumCheck::completed_for(fingerprint);
        &[StateKey::PremiumCheckComplete]
    }

    pub fn login(
        &mut self,
        credentials: Credentials,
        username: Option<String>,
    ) -> &'static [StateKey] {
        self.credentials = Some(credentials);
        if username.is_some() {
            self.username = username;
        }
        &[StateKey::Credentials, StateKey::Username]
    }

    /// Forget the account and everything synced from it.
    ///
    /// The user's own revised marks and filters survive.
    pub fn logout(&mut self) -> &'static [StateKey] {
        self.credentials = None;
        self.username = None;
        self.solved.clear();
        self.premium.clear();
        self.premium_check = PremiumCheck::Pending;
        &[
            StateKey::Credentials,
            StateKey::Username,
            StateKey::SolvedMap,
            StateKey::PremiumMap,
            StateKey::PremiumCheckComplete,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_changes_reset_page() {
        let mut state = CatalogState::default();
        state.set_page(5);
        let touched = state.set_companies(["Google"]);
        assert_eq!(state.page, 1);
        assert!(touched.contains(&StateKey::CurrentPage));

        state.set_page(3);
        state.set_hide_premium(true);
        assert_eq!(state.page, 1);

        state.set_page(3);
        state.toggle_sort(SortKey::Title);
        assert_eq!(state.page, 1);
    }

    #[test]
    fn status_changes_keep_page() {
        let mut state = CatalogState::default();
        state.set_page(4);
        state.toggle_revised("Two Sum");
        state.merge_premium([("X".to_string(), true)]);
        assert_eq!(state.page, 4);
    }

    #[test]
    fn unknown_difficulty_is_never_selected() {
        let mut state = CatalogState::default();
        state.set_difficulties([Difficulty::parse("EXPERT"), Difficulty::Hard]);
        assert_eq!(
            state.selection.difficulties.iter().copied().collect::<Vec<_>>(),
            [Difficulty::Hard]
        );
    }

    #[test]
    fn page_zero_becomes_first_page() {
        let mut state = CatalogState::default();
        state.set_page(0);
        assert_eq!(state.page, 1);
    }

    #[test]
    fn logout_clears_synced_data_but_keeps_revised() {
        let mut state = CatalogState::default();
        state.login(Credentials::new("s", "c").unwrap(), Some("alice".into()));
        state.toggle_revised("A");
        state.replace_solved(StatusMap::from_titles(["A"]));
        state.merge_premium([("B".to_string(), true)]);
        state.mark_premium_complete("fp");

        state.logout();
        assert!(!state.is_logged_in());
        assert!(state.username.is_none());
        assert!(state.solved.is_empty());
        assert!(state.premium.is_empty());
        assert_eq!(state.premium_check, PremiumCheck::Pending);
        assert!(state.revised.is_set("A"));
    }

    #[test]
    fn storage_key_names_are_unique() {
        let names: std::collections::HashSet<_> =
            StateKey::ALL.iter().map(|k| k.as_str()).collect();
        assert_eq!(names.len(), StateKey::ALL.len());
    }
}
