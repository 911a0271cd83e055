//! Heuristic scorers that rank columns into semantic roles.
//!
//! Keyword weights live in plain `const` tables consulted by one scoring
//! routine, so the ranking stays testable and extensible. Two scorers
//! compete over the profiled columns: the metric scorer separates business
//! metrics from identifier-shaped numerics, the category scorer picks the
//! natural grouping dimension among low/medium-cardinality text columns.
//!
//! Asymmetry to be aware of: the metric scorer refuses a primary candidate
//! below [`METRIC_SCORE_FLOOR`], while the category scorer has no floor and
//! will promote a zero- or negative-scoring column when nothing better
//! exists. Deliberate; see DESIGN.md before unifying the thresholds.

use std::cmp::Reverse;

use crate::profile::{ColumnProfile, InferredType};

/// Candidates at or below this score are dropped from the safe-metric list
/// and never promoted to primary metric.
pub const METRIC_SCORE_FLOOR: i32 = -20;
/// Text columns at or above this cardinality are not category candidates.
pub const CATEGORY_CARDINALITY_CEILING: usize = 100;

/// Every-value-distinct numerics lose this much unless a keyword bucket
/// already lifted them to at least `UNIQUE_PENALTY_EXEMPTION`.
const UNIQUE_PENALTY: i32 = 30;
const UNIQUE_PENALTY_EXEMPTION: i32 = 10;

const IDENTIFIER_PENALTY: i32 = -50;
/// Categories with more distinct values than this read like descriptions.
const CATEGORY_DESCRIPTION_CARDINALITY: usize = 50;
const CATEGORY_DESCRIPTION_PENALTY: i32 = -10;

/// Name fragments that mark a numeric column as a business measure,
/// strongest bucket first. Buckets apply additively, one delta per bucket.
const METRIC_KEYWORD_WEIGHTS: &[(&[&str], i32)] = &[
    (&["revenue", "sales", "profit", "turnover"], 25),
    (&["price", "cost", "close", "open", "high", "low"], 20),
    (&["volume", "quantity", "qty", "amount", "count"], 15),
    (&["rating", "score", "value", "balance"], 10),
];

/// Name fragments that mark a numeric column as metadata rather than a
/// measure: codes, coordinates, calendar years, contact numbers.
const IDENTIFIER_KEYWORDS: &[&str] = &[
    "index", "code", "zip", "year", "phone", "mobile", "lat", "lon",
];

const CATEGORY_KEYWORD_WEIGHTS: &[(&[&str], i32)] = &[
    (&["category", "dept", "department", "sector", "segment"], 20),
    (&["status", "region", "type", "class", "zone"], 15),
    (&["product", "brand", "item", "symbol", "city", "state"], 10),
    (&["name", "title", "group"], 5),
];

/// A ranked candidate; ephemeral, consumed while assembling the profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredColumn {
    pub name: String,
    pub score: i32,
}

fn keyword_score(lower_name: &str, table: &[(&[&str], i32)]) -> i32 {
    table
        .iter()
        .filter(|(keywords, _)| keywords.iter().any(|kw| lower_name.contains(kw)))
        .map(|(_, delta)| *delta)
        .sum()
}

/// Strict `id` shape check so that "paid", "width", or "valid" are not
/// mistaken for identifiers.
fn has_identifier_shape(lower_name: &str) -> bool {
    lower_name == "id"
        || lower_name.ends_with("_id")
        || lower_name.ends_with(" id")
        || lower_name.starts_with("id_")
        || lower_name.starts_with("id ")
}

pub fn metric_score(column: &ColumnProfile, row_count: usize) -> i32 {
    let lower = column.name.to_lowercase();
    let mut score = keyword_score(&lower, METRIC_KEYWORD_WEIGHTS);

    // One penalty regardless of how many identifier signals the name hits.
    if has_identifier_shape(&lower) || IDENTIFIER_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        score += IDENTIFIER_PENALTY;
    }

    // Unique-per-row numerics are the classic identifier signature, unless
    // a strong financial keyword already vouched for the column.
    if column.cardinality == row_count && score < UNIQUE_PENALTY_EXEMPTION {
        score -= UNIQUE_PENALTY;
    }

    score
}

pub fn category_score(column: &ColumnProfile) -> i32 {
    let lower = column.name.to_lowercase();
    let mut score = keyword_score(&lower, CATEGORY_KEYWORD_WEIGHTS);
    if column.cardinality > CATEGORY_DESCRIPTION_CARDINALITY {
        score += CATEGORY_DESCRIPTION_PENALTY;
    }
    score
}

/// Rank numeric columns, best first. The sort is stable, so score ties keep
/// original column order.
pub fn rank_metrics(columns: &[ColumnProfile], row_count: usize) -> Vec<ScoredColumn> {
    let mut scored: Vec<ScoredColumn> = columns
        .iter()
        .filter(|column| column.inferred_type == InferredType::Number)
        .map(|column| ScoredColumn {
            name: column.name.clone(),
            score: metric_score(column, row_count),
        })
        .collect();
    scored.sort_by_key(|entry| Reverse(entry.score));
    scored
}

/// Rank eligible text columns, best first; stable on ties. High-cardinality
/// text (descriptions, unique identifiers) is excluded entirely.
pub fn rank_categories(columns: &[ColumnProfile]) -> Vec<ScoredColumn> {
    let mut scored: Vec<ScoredColumn> = columns
        .iter()
        .filter(|column| {
            column.inferred_type == InferredType::Text
                && column.cardinality < CATEGORY_CARDINALITY_CEILING
        })
        .map(|column| ScoredColumn {
            name: column.name.clone(),
            score: category_score(column),
        })
        .collect();
    scored.sort_by_key(|entry| Reverse(entry.score));
    scored
}
