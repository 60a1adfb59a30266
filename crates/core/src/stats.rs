//! Aggregation helpers for per-portfolio and platform-wide statistics.
//!
//! Counting happens in SQL; this module holds the shaping rules applied to
//! the raw rows (day arithmetic, grouping, top-N cuts, search query checks).

use std::collections::BTreeMap;

use crate::error::CoreError;
use crate::types::Timestamp;

/// Number of languages reported in platform statistics.
pub const TOP_LANGUAGES: usize = 10;

/// Whole days between `created_at` and `now`; 0 when unknown or in the future.
pub fn days_active(created_at: Option<Timestamp>, now: Timestamp) -> i64 {
    created_at
        .map(|c| (now - c).num_days().max(0))
        .unwrap_or(0)
}

/// Collapse `(key, count)` rows into a map, summing duplicate keys and
/// dropping zero counts.
pub fn tally<I>(rows: I) -> BTreeMap<String, i64>
where
    I: IntoIterator<Item = (String, i64)>,
{
    let mut out = BTreeMap::new();
    for (key, count) in rows {
        if count > 0 {
            *out.entry(key).or_insert(0) += count;
        }
    }
    out
}

/// The `n` largest `(key, count)` pairs by count descending, ties broken by
/// key ascending so the cut is deterministic.
pub fn top_n(mut rows: Vec<(String, i64)>, n: usize) -> Vec<(String, i64)> {
    rows.retain(|(_, c)| *c > 0);
    rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    rows.truncate(n);
    rows
}

/// Validate the global search `q` parameter, returning the trimmed term.
pub fn parse_search_query(raw: Option<&str>) -> Result<String, CoreError> {
    match raw.map(str::trim) {
        Some(q) if !q.is_empty() => Ok(q.to_string()),
        _ => Err(CoreError::Validation(
            "Search parameter 'q' is required".into(),
        )),
    }
}
