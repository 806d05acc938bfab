use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use pulse_common::{Category, Problem, PulseError, Severity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    pub fn admits(self, category: Category) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(wanted) => wanted == category,
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = PulseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(CategoryFilter::All)
        } else {
            s.parse().map(CategoryFilter::Only)
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryFilter::All => f.write_str("All"),
            CategoryFilter::Only(category) => write!(f, "{category}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    #[default]
    Urgency,
    Impact,
    Newest,
}

impl FromStr for SortMode {
    type Err = PulseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "urgency" => Ok(SortMode::Urgency),
            "impact" => Ok(SortMode::Impact),
            "newest" => Ok(SortMode::Newest),
            other => Err(PulseError::Validation(format!("unknown sort mode '{other}'"))),
        }
    }
}

/// Everything the dashboard list is derived from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedQuery {
    pub category: CategoryFilter,
    pub query: String,
    pub sort: SortMode,
}

impl FeedQuery {
    pub fn new(category: CategoryFilter, query: impl Into<String>, sort: SortMode) -> Self {
        Self {
            category,
            query: query.into(),
            sort,
        }
    }
}

/// Category matches AND (empty query OR query is a case-insensitive
/// substring of the title or summary).
pub fn matches(problem: &Problem, feed: &FeedQuery) -> bool {
    if !feed.category.admits(problem.category) {
        return false;
    }
    if feed.query.is_empty() {
        return true;
    }
    let needle = feed.query.to_lowercase();
    problem.title.to_lowercase().contains(&needle) || problem.summary.to_lowercase().contains(&needle)
}

/// Filter then order. The sort is stable, so ties keep their filtered order.
pub fn filter_sort<'a>(records: &'a [Problem], feed: &FeedQuery) -> Vec<&'a Problem> {
    let mut list: Vec<&Problem> = records.iter().filter(|p| matches(p, feed)).collect();

    match feed.sort {
        SortMode::Urgency => list.sort_by(|a, b| score(b.urgency()).total_cmp(&score(a.urgency()))),
        SortMode::Impact => list.sort_by(|a, b| score(b.impact_score).total_cmp(&score(a.impact_score))),
        SortMode::Newest => {
            // Unparseable timestamps sort after every dated record.
            list.sort_by(|a, b| match (a.parsed_timestamp(), b.parsed_timestamp()) {
                (Some(a), Some(b)) => b.cmp(&a),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            })
        }
    }

    list
}

/// Non-finite scores rank as 0.
fn score(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Number of Critical records, shown in the radar legend.
pub fn critical_count<'a>(records: impl IntoIterator<Item = &'a Problem>) -> usize {
    records
        .into_iter()
        .filter(|p| p.severity == Severity::Critical)
        .count()
}
