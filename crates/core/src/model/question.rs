use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

/// Employers whose frequencies feed the `majorCompanies` sort bucket.
pub const MAJOR_COMPANIES: [&str; 9] = [
    "Microsoft",
    "Apple",
    "Google",
    "Netflix",
    "Meta",
    "Uber",
    "Amazon",
    "TikTok",
    "X",
];

/// Returns true if `name` is one of [`MAJOR_COMPANIES`].
#[must_use]
pub fn is_major_company(name: &str) -> bool {
    MAJOR_COMPANIES.contains(&name)
}

//
// ─── DIFFICULTY ───────────────────────────────────────────────────────────────
//

/// Question difficulty as reported by the catalog.
///
/// Parsing is case-insensitive. Anything unrecognised becomes `Unknown`
/// instead of failing the whole dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Unknown,
}

impl Difficulty {
    /// Options offered to the difficulty filter, in display order.
    pub const OPTIONS: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    /// Parses a difficulty label, normalising case.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "EASY" => Self::Easy,
            "MEDIUM" => Self::Medium,
            "HARD" => Self::Hard,
            _ => Self::Unknown,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "EASY",
            Self::Medium => "MEDIUM",
            Self::Hard => "HARD",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// False for labels outside the fixed difficulty set.
    #[must_use]
    pub fn is_known(self) -> bool {
        self != Self::Unknown
    }

    /// Numeric rank used by the difficulty sort key. Unknown ranks lowest.
    #[must_use]
    pub fn rank(self) -> u8 {
        match self {
            Self::Easy => 1,
            Self::Medium => 2,
            Self::Hard => 3,
            Self::Unknown => 0,
        }
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self::Unknown
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl Serialize for Difficulty {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Difficulty {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = serde_json::Value::deserialize(deserializer)?;
        Ok(raw.as_str().map_or(Self::Unknown, Self::parse))
    }
}

//
// ─── QUESTION ─────────────────────────────────────────────────────────────────
//

/// How often a company reportedly asks a question.
///
/// `frequency` is the company's own appearance percentage, not normalised
/// across companies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyFrequency {
    #[serde(default, deserialize_with = "lenient")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient")]
    pub frequency: f64,
}

impl CompanyFrequency {
    #[must_use]
    pub fn new(name: impl Into<String>, frequency: f64) -> Self {
        Self {
            name: name.into(),
            frequency,
        }
    }
}

/// One interview problem. Identified by `title`; there is no numeric id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub title: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default, deserialize_with = "lenient")]
    pub acceptance_rate: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub link: String,
    #[serde(default, deserialize_with = "lenient")]
    pub topics: Vec<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub companies: Vec<CompanyFrequency>,
}

impl Question {
    /// Minimal question with no topics or companies. Mostly useful in tests.
    #[must_use]
    pub fn new(title: impl Into<String>, difficulty: Difficulty) -> Self {
        Self {
            title: title.into(),
            difficulty,
            acceptance_rate: None,
            link: String::new(),
            topics: Vec::new(),
            companies: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_acceptance_rate(mut self, rate: f64) -> Self {
        self.acceptance_rate = Some(rate);
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
    pub fn with_company(mut self, name: impl Into<String>, frequency: f64) -> Self {
        self.companies.push(CompanyFrequency::new(name, frequency));
        self
    }

    /// Parsed problem link, if it is a valid absolute URL.
    #[must_use]
    pub fn link_url(&self) -> Option<Url> {
        Url::parse(&self.link).ok()
    }

    /// Drops repeated company entries, keeping the first occurrence.
    pub(crate) fn dedup_companies(&mut self) {
        let mut seen = std::collections::HashSet::new();
        self.companies.retain(|c| seen.insert(c.name.clone()));
    }
}

/// A field that is `null` or of the wrong shape reads as its default.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_parsing_is_case_insensitive() {
        assert_eq!(Difficulty::parse("easy"), Difficulty::Easy);
        assert_eq!(Difficulty::parse(" Medium "), Difficulty::Medium);
        assert_eq!(Difficulty::parse("HARD"), Difficulty::Hard);
        assert_eq!(Difficulty::parse("brutal"), Difficulty::Unknown);
        assert!(!Difficulty::parse("brutal").is_known());
        assert!(Difficulty::Hard.is_known());
    }

    #[test]
    fn question_tolerates_missing_and_null_fields() {
        let json = r#"{"title":"Two Sum","difficulty":"Easy","topics":null}"#;
        let q: Question = serde_json::from_str(json).unwrap();
        assert_eq!(q.title, "Two Sum");
        assert_eq!(q.difficulty, Difficulty::Easy);
        assert!(q.topics.is_empty());
        assert!(q.companies.is_empty());
        assert_eq!(q.acceptance_rate, None);
        assert!(q.link_url().is_none());
    }

    #[test]
    fn mistyped_fields_read_as_empty() {
        let json = r#"{
            "title": "Odd",
            "difficulty": 3,
            "acceptanceRate": "high",
            "link": ["nope"],
            "topics": "Array",
            "companies": [{"name": "Google", "frequency": "80"}]
        }"#;
        let q: Question = serde_json::from_str(json).unwrap();
        assert_eq!(q.title, "Odd");
        assert_eq!(q.difficulty, Difficulty::Unknown);
        assert_eq!(q.acceptance_rate, None);
        assert!(q.link.is_empty());
        assert!(q.topics.is_empty());
        assert_eq!(q.companies, [CompanyFrequency::new("Google", 0.0)]);
    }

    #[test]
    fn mixed_topic_list_is_dropped_whole() {
        let q: Question =
            serde_json::from_str(r#"{"title": "T", "topics": ["Array", 7]}"#).unwrap();
        assert!(q.topics.is_empty());
    }

    #[test]
    fn question_reads_camel_case_fields() {
        let json = r#"{
            "title": "Two Sum",
            "difficulty": "EASY",
            "acceptanceRate": 0.55,
            "link": "https://leetcode.com/problems/two-sum",
            "topics": ["Array", "Hash Table"],
            "companies": [{"name": "Google", "frequency": 80}]
        }"#;
        let q: Question = serde_json::from_str(json).unwrap();
        assert_eq!(q.acceptance_rate, Some(0.55));
        assert_eq!(q.companies[0], CompanyFrequency::new("Google", 80.0));
        assert_eq!(
            q.link_url().map(|u| u.host_str().map(str::to_owned)),
            Some(Some("leetcode.com".to_owned()))
        );
    }

    #[test]
    fn dedup_companies_keeps_first_entry() {
        let mut q = Question::new("A", Difficulty::Easy)
            .with_company("Google", 10.0)
            .with_company("Google", 90.0)
            .with_company("Meta", 5.0);
        q.dedup_companies();
        assert_eq!(q.companies.len(), 2);
        assert_eq!(q.companies[0].frequency, 10.0);
    }

    #[test]
    fn major_company_lookup() {
        assert!(is_major_company("Google"));
        assert!(is_major_company("X"));
        assert!(!is_major_company("Stripe"));
    }
}
