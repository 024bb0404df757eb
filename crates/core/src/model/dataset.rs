use std::collections::{BTreeSet, HashSet};

use sha2::{Digest, Sha256};
use thiserror::Error;

use super::question::{Difficulty, Question};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DatasetError {
    #[error("dataset is not a JSON array of questions: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Immutable, loaded-once question catalog.
///
/// Titles are unique: when the source repeats a title, the first record wins.
/// Companies are de-duplicated per question the same way. Records without a
/// usable title are dropped and counted.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    questions: Vec<Question>,
    fingerprint: String,
    duplicate_titles: Vec<String>,
    skipped_records: usize,
}

impl Dataset {
    /// Build a dataset from already-deserialized records.
    #[must_use]
    pub fn from_questions(raw: Vec<Question>) -> Self {
        let mut seen = HashSet::with_capacity(raw.len());
        let mut questions = Vec::with_capacity(raw.len());
        let mut duplicate_titles = Vec::new();
        let mut skipped_records = 0;

        for mut question in raw {
            if question.title.trim().is_empty() {
                skipped_records += 1;
                continue;
            }
            if !seen.insert(question.title.clone()) {
                duplicate_titles.push(question.title);
                continue;
            }
            question.dedup_companies();
            questions.push(question);
        }

        let fingerprint = fingerprint_titles(&questions);
        Self {
            questions,
            fingerprint,
            duplicate_titles,
            skipped_records,
        }
    }

    /// Parse the JSON array served by the dataset source.
    ///
    /// # Errors
    ///
    /// Returns `DatasetError::Parse` if the payload is not a JSON array.
    /// Individual records that are not question objects are skipped.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, DatasetError> {
        let records: Vec<serde_json::Value> = serde_json::from_slice(bytes)?;
        let total = records.len();
        let raw: Vec<Question> = records
            .into_iter()
            .filter_map(|record| serde_json::from_value(record).ok())
            .collect();
        let unreadable = total - raw.len();
        let mut dataset = Self::from_questions(raw);
        dataset.skipped_records += unreadable;
        Ok(dataset)
    }

    /// Parse the dataset from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns `DatasetError::Parse` on malformed input.
    pub fn from_json_str(json: &str) -> Result<Self, DatasetError> {
        Self::from_json_slice(json.as_bytes())
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn get(&self, title: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.title == title)
    }

    /// Titles dropped during construction because they were repeated.
    #[must_use]
    pub fn duplicate_titles(&self) -> &[String] {
        &self.duplicate_titles
    }

    /// Number of records dropped for lacking a usable title.
    #[must_use]
    pub fn skipped_records(&self) -> usize {
        self.skipped_records
    }

    /// Stable content hash of the catalog's title set.
    ///
    /// Changes whenever a question is added, removed or renamed upstream.
    #[must_use]
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Sorted unique company names.
    #[must_use]
    pub fn company_options(&self) -> Vec<String> {
        self.questions
            .iter()
            .flat_map(|q| q.companies.iter().map(|c| c.name.clone()))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Sorted unique topic names.
    #[must_use]
    pub fn topic_options(&self) -> Vec<String> {
        self.questions
            .iter()
            .flat_map(|q| q.topics.iter().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    #[must_use]
    pub fn difficulty_options(&self) -> &'static [Difficulty] {
        &Difficulty::OPTIONS
    }
}

fn fingerprint_titles(questions: &[Question]) -> String {
    let titles: BTreeSet<&str> = questions.iter().map(|q| q.title.as_str()).collect();
    let mut hasher = Sha256::new();
    for title in titles {
        hasher.update(title.as_bytes());
        hasher.update([0u8]);
    }
    format!("{:x}", hasher.finalize())
}
