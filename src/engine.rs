//! Filter and sort a loaded collection against a `QueryState`.
//!
//! Everything here is pure and linear in the collection size so it can run on
//! every keystroke. Inputs are only borrowed; the result is a list of
//! references into the caller's slice.

use crate::catalog::{ALL_FACET, Listing, SortKey};
use crate::query::QueryState;
use std::cmp::Ordering;

/// Items passing both predicates, ordered by the query's sort key.
///
/// Sorting is stable, so tie-break keys (`featured`, `newest`) only partition
/// the list and equal items keep their input order. An unrecognized sort key
/// keeps input order entirely.
pub fn select_visible<'a, L: Listing>(items: &'a [L], query: &QueryState) -> Vec<&'a L> {
    let needle = query.search_text.to_lowercase();
    let mut visible: Vec<&L> = items
        .iter()
        .filter(|item| matches_category(*item, &query.category))
        .filter(|item| matches_lowered_text(*item, &needle))
        .collect();
    sort_visible(&mut visible, &query.sort);
    visible
}

/// Category predicate. Both sides are expected to be lower-case already.
pub fn matches_category<L: Listing>(item: &L, category: &str) -> bool {
    category == ALL_FACET || item.category() == category
}

/// Case-insensitive substring match against name, description, and tags.
pub fn matches_text<L: Listing>(item: &L, search_text: &str) -> bool {
    matches_lowered_text(item, &search_text.to_lowercase())
}

fn matches_lowered_text<L: Listing>(item: &L, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    let text = item.searchable_text();
    contains_folded(text.name, needle)
        || contains_folded(text.description, needle)
        || text.tags.iter().any(|tag| contains_folded(tag, needle))
}

fn contains_folded(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

fn sort_visible<L: Listing>(visible: &mut [&L], sort: &SortKey) {
    match sort {
        SortKey::Featured => {
            visible.sort_by(|a, b| flag_first(a.sort_keys().featured, b.sort_keys().featured))
        }
        SortKey::Newest => {
            visible.sort_by(|a, b| flag_first(a.sort_keys().is_new, b.sort_keys().is_new))
        }
        SortKey::Rating => {
            visible.sort_by(|a, b| b.sort_keys().rating.total_cmp(&a.sort_keys().rating))
        }
        SortKey::Other(_) => {}
    }
}

// `true` sorts ahead of `false`.
fn flag_first(a: bool, b: bool) -> Ordering {
    b.cmp(&a)
}
