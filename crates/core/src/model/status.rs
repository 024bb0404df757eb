use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

/// Per-title boolean flags (revised, solved or premium), keyed by title.
///
/// A missing title and an explicit `false` are both "not set".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusMap(BTreeMap<String, bool>);

impl StatusMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Map with every given title set to `true`.
    #[must_use]
    pub fn from_titles<I, S>(titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(titles.into_iter().map(|t| (t.into(), true)).collect())
    }

    /// True only when `title` is present with value `true`.
    #[must_use]
    pub fn is_set(&self, title: &str) -> bool {
        self.0.get(title).copied().unwrap_or(false)
    }

    /// True when `title` has an entry, whatever its value.
    #[must_use]
    pub fn contains(&self, title: &str) -> bool {
        self.0.contains_key(title)
    }

    pub fn set(&mut self, title: impl Into<String>, value: bool) {
        self.0.insert(title.into(), value);
    }

    /// Flip the flag for `title` and return the new value.
    pub fn toggle(&mut self, title: &str) -> bool {
        let next = !self.is_set(title);
        self.0.insert(title.to_string(), next);
        next
    }

    /// Overlay `entries` onto this map.
    pub fn merge(&mut self, entries: impl IntoIterator<Item = (String, bool)>) {
        self.0.extend(entries);
    }

    /// Number of titles flagged `true`.
    #[must_use]
    pub fn count_set(&self) -> usize {
        self.0.values().filter(|v| **v).count()
    }

    /// Number of titles with any entry.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

impl FromIterator<(String, bool)> for StatusMap {
    fn from_iter<T: IntoIterator<Item = (String, bool)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

//
// ─── PREMIUM CHECK MARKER ─────────────────────────────────────────────────────
//

/// Whether the full premium-status scan has finished.
///
/// The marker remembers which catalog it was completed against, so a
/// regenerated catalog triggers a fresh scan. Persisted as `false`, `true`
/// (older marker with no catalog attached) or the catalog fingerprint string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PremiumCheck {
    #[default]
    Pending,
    Complete { fingerprint: Option<String> },
}

impl PremiumCheck {
    #[must_use]
    pub fn completed_for(fingerprint: impl Into<String>) -> Self {
        Self::Complete {
            fingerprint: Some(fingerprint.into()),
        }
    }

    /// True if the scan finished for the catalog identified by `fingerprint`.
    #[must_use]
    pub fn is_complete_for(&self, fingerprint: &str) -> bool {
        match self {
            Self::Pending => false,
            Self::Complete { fingerprint: None } => true,
            Self::Complete {
                fingerprint: Some(done),
            } => done == fingerprint,
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum PremiumCheckRepr {
    Flag(bool),
    Fingerprint(String),
}

impl Serialize for PremiumCheck {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let repr = match self {
            Self::Pending => PremiumCheckRepr::Flag(false),
            Self::Complete { fingerprint: None } => PremiumCheckRepr::Flag(true),
            Self::Complete {
                fingerprint: Some(fp),
            } => PremiumCheckRepr::Fingerprint(fp.clone()),
        };
        repr.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PremiumCheck {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match PremiumCheckRepr::deserialize(deserializer)? {
            PremiumCheckRepr::Flag(false) => Self::Pending,
            PremiumCheckRepr::Flag(true) => Self::Complete { fingerprint: None },
            PremiumCheckRepr::Fingerprint(fp) => Self::completed_for(fp),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_set_is_strict() {
        let mut map = StatusMap::new();
        map.set("A", true);
        map.set("B", false);
        assert!(map.is_set("A"));
        assert!(!map.is_set("B"));
        assert!(!map.is_set("C"));
        assert!(map.contains("B"));
        assert_eq!(map.count_set(), 1);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn toggle_flips_missing_to_true() {
        let mut map = StatusMap::new();
        assert!(map.toggle("A"));
        assert!(!map.toggle("A"));
        assert_eq!(map.count_set(), 0);
    }

    #[test]
    fn persisted_as_plain_object() {
        let map = StatusMap::from_titles(["A", "B"]);
        assert_eq!(serde_json::to_string(&map).unwrap(), r#"{"A":true,"B":true}"#);
        let back: StatusMap = serde_json::from_str(r#"{"X":true,"Y":false}"#).unwrap();
        assert!(back.is_set("X"));
        assert!(!back.is_set("Y"));
    }

    #[test]
    fn premium_check_tracks_catalog() {
        let done = PremiumCheck::completed_for("abc");
        assert!(done.is_complete_for("abc"));
        assert!(!done.is_complete_for("def"));
        assert!(!PremiumCheck::Pending.is_complete_for("abc"));
        assert!(PremiumCheck::Complete { fingerprint: None }.is_complete_for("anything"));
    }

    #[test]
    fn premium_check_accepts_boolean_and_fingerprint_forms() {
        let legacy: PremiumCheck = serde_json::from_str("true").unwrap();
        assert_eq!(legacy, PremiumCheck::Complete { fingerprint: None });
        let pending: PremiumCheck = serde_json::from_str("false").unwrap();
        assert_eq!(pending, PremiumCheck::Pending);
        let keyed: PremiumCheck = serde_json::from_str(r#""abc""#).unwrap();
        assert_eq!(serde_json::to_string(&keyed).unwrap(), r#""abc""#);
    }
}
