use std::collections::BTreeSet;

use super::question::Difficulty;

/// User-chosen filter criteria. Every empty field is a no-op predicate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    pub companies: BTreeSet<String>,
    pub topics: BTreeSet<String>,
    pub difficulties: BTreeSet<Difficulty>,
    pub hide_premium: bool,
    pub search_query: String,
}

impl FilterSelection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_companies<I, S>(mut self, companies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.companies = companies.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_topics<I, S>(mut self, topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.topics = topics.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_difficulties(mut self, difficulties: impl IntoIterator<Item = Difficulty>) -> Self {
        self.difficulties = difficulties.into_iter().filter(|d| d.is_known()).collect();
        self
    }

    #[must_use]
    pub fn with_hide_premium(mut self, hide: bool) -> Self {
        self.hide_premium = hide;
        self
    }

    #[must_use]
    pub fn with_search(mut self, query: impl Into<String>) -> Self {
        self.search_query = query.into();
        self
    }

    /// True when no predicate is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.companies.is_empty()
            && self.topics.is_empty()
            && self.difficulties.is_empty()
            && !self.hide_premium
            && self.search_query.is_empty()
    }
}
