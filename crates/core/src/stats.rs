use std::collections::BTreeSet;

use crate::model::{Question, StatusMap};

/// Progress target used for the percentage counters.
pub const GOAL: usize = 500;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompanyStats {
    pub solved: usize,
    pub remaining: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressStats {
    pub solved_count: usize,
    pub revised_count: usize,
    /// Rounded, not clamped: may exceed 100.
    pub solved_percent: usize,
    pub revised_percent: usize,
    pub company: CompanyStats,
}

/// Aggregate progress counters.
///
/// The solved and revised counts are global and ignore any active filter.
/// Company figures cover only questions tagged with a selected company and
/// are all zero when no company is selected.
#[must_use]
pub fn compute_stats<'a, I>(
    questions: I,
    solved: &StatusMap,
    revised: &StatusMap,
    selected_companies: &BTreeSet<String>,
    goal: usize,
) -> ProgressStats
where
    I: IntoIterator<Item = &'a Question>,
{
    let solved_count = solved.count_set();
    let revised_count = revised.count_set();

    let company = if selected_companies.is_empty() {
        CompanyStats::default()
    } else {
        let (total, done) = questions
            .into_iter()
            .filter(|q| q.companies.iter().any(|c| selected_companies.contains(&c.name)))
            .fold((0, 0), |(total, done), q| {
                (total + 1, done + usize::from(solved.is_set(&q.title)))
            });
        CompanyStats {
            solved: done,
            remaining: total - done,
            total,
        }
    };

    ProgressStats {
        solved_count,
        revised_count,
        solved_percent: percent_of(solved_count, goal),
        revised_percent: percent_of(revised_count, goal),
        company,
    }
}

/// `round(count / goal * 100)` with halves rounded up; a zero goal yields 0.
#[must_use]
pub fn percent_of(count: usize, goal: usize) -> usize {
    if goal == 0 {
        return 0;
    }
    (count.saturating_mul(200).saturating_add(goal)) / (goal * 2)
}

/// How far the premium scan has got.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PremiumSummary {
    /// Titles with a known premium status.
    pub checked: usize,
    /// Titles known to be premium.
    pub premium: usize,
}

impl PremiumSummary {
    #[must_use]
    pub fn from_map(premium: &StatusMap) -> Self {
        Self {
            checked: premium.len(),
            premium: premium.count_set(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Difficulty;

    fn companies(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|n| (*n).to_string()).collect()
    }

    #[test]
    fn counts_are_global() {
        let qs = vec![Question::new("A", Difficulty::Easy)];
        let solved = StatusMap::from_titles(["A", "Z"]);
        let mut revised = StatusMap::new();
        revised.set("A", true);
        revised.set("B", false);

        let stats = compute_stats(&qs, &solved, &revised, &BTreeSet::new(), GOAL);
        assert_eq!(stats.solved_count, 2);
        assert_eq!(stats.revised_count, 1);
        assert_eq!(stats.company, CompanyStats::default());
    }

    #[test]
    fn company_stats_restrict_to_selected() {
        let qs = vec![
            Question::new("A", Difficulty::Easy).with_company("Google", 10.0),
            Question::new("B", Difficulty::Easy).with_company("Google", 5.0),
            Question::new("C", Difficulty::Easy).with_company("Amazon", 5.0),
        ];
        let solved = StatusMap::from_titles(["A", "C"]);
        let stats = compute_stats(
            &qs,
            &solved,
            &StatusMap::new(),
            &companies(&["Google"]),
            GOAL,
        );
        assert_eq!(
            stats.company,
            CompanyStats {
                solved: 1,
                remaining: 1,
                total: 2
            }
        );
    }

    #[test]
    fn percentages_round_half_up_and_are_not_clamped() {
        assert_eq!(percent_of(0, GOAL), 0);
        assert_eq!(percent_of(1, GOAL), 0);
        // 2.5%
        assert_eq!(percent_of(5, 200), 3);
        assert_eq!(percent_of(250, GOAL), 50);
        assert_eq!(percent_of(750, GOAL), 150);
        assert_eq!(percent_of(3, 0), 0);
    }

    #[test]
    fn premium_summary_counts_known_and_flagged() {
        let mut premium = StatusMap::new();
        premium.set("A", true);
        premium.set("B", false);
        premium.set("C", true);
        assert_eq!(
            PremiumSummary::from_map(&premium),
            PremiumSummary {
                checked: 3,
                premium: 2
            }
        );
    }
}
