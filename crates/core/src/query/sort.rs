use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::model::{is_major_company, Question, SortConfig, SortKey, StatusMap};

/// Value a question contributes when ranked on a non-existent company bucket.
pub const NO_MATCH_FREQUENCY: f64 = -1.0;

/// Inputs besides the question itself that some sort keys depend on.
#[derive(Debug, Clone, Copy)]
pub struct SortContext<'a> {
    pub selected_companies: &'a BTreeSet<String>,
    pub revised: &'a StatusMap,
    pub solved: &'a StatusMap,
}

/// Scalar a question is ranked by for one sort key.
#[derive(Debug, Clone, PartialEq)]
pub enum SortValue {
    Number(f64),
    Text(String),
}

/// Derive the comparable value of `question` for `key`.
#[must_use]
pub fn sort_value(key: SortKey, question: &Question, ctx: &SortContext<'_>) -> SortValue {
    match key {
        SortKey::Title => SortValue::Text(question.title.clone()),
        SortKey::Frequency => {
            let freq = if ctx.selected_companies.is_empty() {
                max_frequency(question, |_| true)
            } else {
                max_frequency(question, |name| ctx.selected_companies.contains(name))
            };
            SortValue::Number(freq.unwrap_or(NO_MATCH_FREQUENCY))
        }
        SortKey::Difficulty => SortValue::Number(f64::from(question.difficulty.rank())),
        SortKey::AcceptanceRate => question
            .acceptance_rate
            .map_or_else(|| SortValue::Text(String::new()), SortValue::Number),
        SortKey::MajorCompanies => SortValue::Number(
            max_frequency(question, is_major_company).unwrap_or(NO_MATCH_FREQUENCY),
        ),
        SortKey::OtherCompanies => SortValue::Number(
            max_frequency(question, |name| !is_major_company(name)).unwrap_or(NO_MATCH_FREQUENCY),
        ),
        SortKey::Topics => {
            let mut topics = question.topics.clone();
            topics.sort();
            SortValue::Text(topics.join(", "))
        }
        SortKey::Revised => SortValue::Number(flag(ctx.revised.is_set(&question.title))),
        SortKey::LcSolved => SortValue::Number(flag(ctx.solved.is_set(&question.title))),
    }
}

/// Ascending comparison of two derived values.
///
/// Text compares case-insensitively first, numbers numerically; a text/number
/// pair coerces the text to a number and treats unparsable text as equal.
#[must_use]
pub fn compare_values(a: &SortValue, b: &SortValue) -> Ordering {
    match (a, b) {
        (SortValue::Text(a), SortValue::Text(b)) => locale_compare(a, b),
        (SortValue::Number(a), SortValue::Number(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
        (SortValue::Text(t), SortValue::Number(n)) => text_as_number(t)
            .and_then(|t| t.partial_cmp(n))
            .unwrap_or(Ordering::Equal),
        (SortValue::Number(n), SortValue::Text(t)) => text_as_number(t)
            .and_then(|t| n.partial_cmp(&t))
            .unwrap_or(Ordering::Equal),
    }
}

/// Compare two questions under `config`, falling through to the next entry
/// only on an exact tie.
#[must_use]
pub fn compare_questions(
    a: &Question,
    b: &Question,
    config: &SortConfig,
    ctx: &SortContext<'_>,
) -> Ordering {
    for entry in config.entries() {
        let ordering = compare_values(
            &sort_value(entry.key, a, ctx),
            &sort_value(entry.key, b, ctx),
        );
        if ordering != Ordering::Equal {
            return entry.direction.apply(ordering);
        }
    }
    Ordering::Equal
}

/// Stable multi-key sort. An empty `config` returns the input untouched.
#[must_use]
pub fn sort_questions<'a>(
    questions: Vec<&'a Question>,
    config: &SortConfig,
    ctx: &SortContext<'_>,
) -> Vec<&'a Question> {
    if config.is_empty() {
        return questions;
    }

    // Derive each key once per question instead of once per comparison.
    let mut keyed: Vec<(Vec<SortValue>, &'a Question)> = questions
        .into_iter()
        .map(|q| {
            let values = config
                .entries()
                .iter()
                .map(|e| sort_value(e.key, q, ctx))
                .collect();
            (values, q)
        })
        .collect();

    keyed.sort_by(|(va, _), (vb, _)| {
        config
            .entries()
            .iter()
            .zip(va.iter().zip(vb.iter()))
            .map(|(entry, (a, b))| entry.direction.apply(compare_values(a, b)))
            .find(|o| *o != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    });

    keyed.into_iter().map(|(_, q)| q).collect()
}

fn max_frequency(question: &Question, mut include: impl FnMut(&str) -> bool) -> Option<f64> {
    question
        .companies
        .iter()
        .filter(|c| include(&c.name))
        .map(|c| c.frequency)
        .fold(None, |best, f| Some(best.map_or(f, |b: f64| b.max(f))))
}

fn flag(set: bool) -> f64 {
    if set { 1.0 } else { 0.0 }
}

fn text_as_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }
    trimmed.parse().ok()
}

// Case-insensitive primary order; on a case-only difference lowercase sorts first.
fn locale_compare(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
        .then_with(|| b.cmp(a))
}
