use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

//
// ─── SORT KEY ─────────────────────────────────────────────────────────────────
//

/// Column a question list can be sorted by.
///
/// The serialized names match the persisted configuration format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortKey {
    #[serde(rename = "title")]
    Title,
    #[serde(rename = "frequency")]
    Frequency,
    #[serde(rename = "difficulty")]
    Difficulty,
    #[serde(rename = "acceptanceRate")]
    AcceptanceRate,
    #[serde(rename = "majorCompanies")]
    MajorCompanies,
    #[serde(rename = "otherCompanies")]
    OtherCompanies,
    #[serde(rename = "topics")]
    Topics,
    /// The user's own "revised" mark.
    #[serde(rename = "solved")]
    Revised,
    /// Accepted-submission status synced from the remote account.
    #[serde(rename = "lcSolved")]
    LcSolved,
}

impl SortKey {
    pub const ALL: [SortKey; 9] = [
        SortKey::Title,
        SortKey::Difficulty,
        SortKey::AcceptanceRate,
        SortKey::MajorCompanies,
        SortKey::OtherCompanies,
        SortKey::Frequency,
        SortKey::Topics,
        SortKey::LcSolved,
        SortKey::Revised,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Title => "title",
            SortKey::Frequency => "frequency",
            SortKey::Difficulty => "difficulty",
            SortKey::AcceptanceRate => "acceptanceRate",
            SortKey::MajorCompanies => "majorCompanies",
            SortKey::OtherCompanies => "otherCompanies",
            SortKey::Topics => "topics",
            SortKey::Revised => "solved",
            SortKey::LcSolved => "lcSolved",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown sort key: {0}")]
pub struct ParseSortKeyError(String);

impl FromStr for SortKey {
    type Err = ParseSortKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortKey::ALL
            .into_iter()
            .find(|key| key.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseSortKeyError(s.to_string()))
    }
}

//
// ─── DIRECTION ────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// Orients an ascending comparison result for this direction.
    #[must_use]
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

/// Header indicator for a single column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortState {
    Neutral,
    Asc,
    Desc,
}

//
// ─── CONFIG ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortEntry {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl SortEntry {
    #[must_use]
    pub fn new(key: SortKey, direction: SortDirection) -> Self {
        Self { key, direction }
    }
}

/// Prioritised list of sort entries; the first entry is the primary key.
///
/// Each key appears at most once. An empty config means "keep catalog order".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<SortEntry>", into = "Vec<SortEntry>")]
pub struct SortConfig {
    entries: Vec<SortEntry>,
}

impl SortConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a config from entries, dropping repeated keys (first one wins).
    #[must_use]
    pub fn from_entries(entries: impl IntoIterator<Item = SortEntry>) -> Self {
        let mut config = Self::default();
        for entry in entries {
            if config.position(entry.key).is_none() {
                config.entries.push(entry);
            }
        }
        config
    }

    #[must_use]
    pub fn entries(&self) -> &[SortEntry] {
        &self.entries
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn state(&self, key: SortKey) -> SortState {
        match self.position(key).map(|i| self.entries[i].direction) {
            None => SortState::Neutral,
            Some(SortDirection::Asc) => SortState::Asc,
            Some(SortDirection::Desc) => SortState::Desc,
        }
    }

    /// Advance `key` through absent → desc → asc → absent.
    ///
    /// A new key is appended as the lowest-priority entry; flipping keeps its
    /// position. Other entries are untouched.
    pub fn toggle(&mut self, key: SortKey) {
        match self.position(key) {
            None => self.entries.push(SortEntry::new(key, SortDirection::Desc)),
            Some(i) => match self.entries[i].direction {
                SortDirection::Desc => self.entries[i].direction = SortDirection::Asc,
                SortDirection::Asc => {
                    self.entries.remove(i);
                }
            },
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn position(&self, key: SortKey) -> Option<usize> {
        self.entries.iter().position(|e| e.key == key)
    }
}

impl From<Vec<SortEntry>> for SortConfig {
    fn from(entries: Vec<SortEntry>) -> Self {
        Self::from_entries(entries)
    }
}

impl From<SortConfig> for Vec<SortEntry> {
    fn from(config: SortConfig) -> Self {
        config.entries
    }
}
