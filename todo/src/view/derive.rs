//! Pure derivation stages of a view: filter, sort, paginate.
//!
//! Every stage is a function of its inputs only, so a view is always fully
//! recomputed from the current controls and never patched incrementally.

use super::record::ViewRecord;
use serde::{Deserialize, Serialize};

/// Direction of a sort
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortDirection {
    /// Smallest first
    #[default]
    Ascending,
    /// Largest first
    Descending,
}

impl SortDirection {
    /// The opposite direction
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

/// Canonical form of a query: trimmed and case-folded
#[must_use]
pub fn normalize_query(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Whether `record` matches the normalized `query`
///
/// An empty query matches everything.
pub fn matches<R: ViewRecord>(record: &R, query: &str) -> bool {
    query.is_empty()
        || record
            .search_fields()
            .iter()
            .any(|field| field.to_lowercase().contains(query))
}

/// Records matching the normalized `query`, source order kept
pub fn filter<R: ViewRecord>(records: &[R], query: &str) -> Vec<R> {
    records
        .iter()
        .filter(|record| matches(*record, query))
        .cloned()
        .collect()
}

/// Records stably sorted by `key`, or unchanged when there is no key
pub fn sort<R: ViewRecord>(records: &[R], key: Option<R::Key>, direction: SortDirection) -> Vec<R> {
    let mut sorted = records.to_vec();
    if let Some(key) = key {
        sorted.sort_by(|a, b| {
            let ordering = a.field(key).natural_cmp(&b.field(key));
            match direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            }
        });
    }
    sorted
}

/// Number of pages for `len` records, never less than one
#[must_use]
pub const fn total_pages(len: usize, page_size: usize) -> usize {
    if page_size == 0 || len == 0 {
        1
    } else {
        len.div_ceil(page_size)
    }
}

/// Records on the 1-based `page`
///
/// Pages past the end are empty.
pub fn paginate<R: Clone>(records: &[R], page: usize, page_size: usize) -> Vec<R> {
    let start = page.saturating_sub(1).saturating_mul(page_size);
    records
        .iter()
        .skip(start)
        .take(page_size)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Record;
    use crate::view::record::RecordField;

    fn records() -> Vec<Record> {
        vec![
            Record::new("1", "Learn X").with_completed(true),
            Record::new("2", "Learn Y"),
            Record::new("3", "Build Z"),
        ]
    }

    fn ids(records: &[Record]) -> Vec<&str> {
        records.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_normalize_query() {
        assert_eq!(normalize_query("  LeArN "), "learn");
        assert_eq!(normalize_query("   "), "");
    }

    #[test]
    fn test_empty_query_keeps_everything_in_order() {
        assert_eq!(ids(&filter(&records(), "")), ["1", "2", "3"]);
    }

    #[test]
    fn test_filter_is_case_insensitive() {
        assert_eq!(ids(&filter(&records(), "learn")), ["1", "2"]);
        assert_eq!(ids(&filter(&records(), "z")), ["3"]);
        assert!(filter(&records(), "nothing").is_empty());
    }

    #[test]
    fn test_sort_by_title() {
        let asc = sort(&records(), Some(RecordField::Title), SortDirection::Ascending);
        let desc = sort(&records(), Some(RecordField::Title), SortDirection::Descending);

        assert_eq!(ids(&asc), ["3", "1", "2"]);
        assert_eq!(ids(&desc), ["2", "1", "3"]);
    }

    #[test]
    fn test_sort_is_stable_for_ties() {
        let asc = sort(&records(), Some(RecordField::Completed), SortDirection::Ascending);
        let desc = sort(&records(), Some(RecordField::Completed), SortDirection::Descending);

        assert_eq!(ids(&asc), ["2", "3", "1"]);
        assert_eq!(ids(&desc), ["1", "2", "3"]);
    }

    #[test]
    fn test_no_sort_key_keeps_order() {
        let unsorted = sort(&records(), None, SortDirection::Descending);
        assert_eq!(ids(&unsorted), ["1", "2", "3"]);
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(3, 1), 3);
    }

    #[test]
    fn test_paginate() {
        let all = records();
        assert_eq!(ids(&paginate(&all, 1, 2)), ["1", "2"]);
        assert_eq!(ids(&paginate(&all, 2, 2)), ["3"]);
        assert!(paginate(&all, 3, 2).is_empty());
    }
}
