use crate::model::{FilterSelection, Question, StatusMap};

/// Returns true if `question` passes every active predicate in `selection`.
///
/// Premium status comes from `premium`; titles that have not been checked yet
/// are never hidden.
#[must_use]
pub fn matches(question: &Question, selection: &FilterSelection, premium: &StatusMap) -> bool {
    let search = selection.search_query.to_lowercase();
    matches_with_search(question, selection, premium, &search)
}

/// Keep the questions that match `selection`, preserving input order.
pub fn filter_questions<'a, I>(
    questions: I,
    selection: &FilterSelection,
    premium: &StatusMap,
) -> Vec<&'a Question>
where
    I: IntoIterator<Item = &'a Question>,
{
    let search = selection.search_query.to_lowercase();
    questions
        .into_iter()
        .filter(|q| matches_with_search(q, selection, premium, &search))
        .collect()
}

fn matches_with_search(
    question: &Question,
    selection: &FilterSelection,
    premium: &StatusMap,
    search_lower: &str,
) -> bool {
    if !selection.companies.is_empty()
        && !question
            .companies
            .iter()
            .any(|c| selection.companies.contains(&c.name))
    {
        return false;
    }

    if !selection.topics.is_empty()
        && !question.topics.iter().any(|t| selection.topics.contains(t))
    {
        return false;
    }

    if !selection.difficulties.is_empty()
        && !(question.difficulty.is_known() && selection.difficulties.contains(&question.difficulty))
    {
        return false;
    }

    if selection.hide_premium && premium.is_set(&question.title) {
        return false;
    }

    search_lower.is_empty() || question.title.to_lowercase().contains(search_lower)
}
