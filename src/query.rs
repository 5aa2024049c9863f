//! View intent for the catalog: tab, category, search text, sort, view mode.
//!
//! `QueryState` is an immutable value. Consumers change it only through
//! `QueryState::reduce`, which returns the next state for a `QueryAction`.
//! Nothing in the data layer ever writes to it.

use crate::catalog::{ALL_FACET, Collection, SortKey, ViewMode};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryState {
    pub tab: Collection,
    pub category: String,
    pub search_text: String,
    pub sort: SortKey,
    pub view_mode: ViewMode,
}

/// User-driven changes to the query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QueryAction {
    SetTab(Collection),
    SetCategory(String),
    SetSearchText(String),
    SetSort(SortKey),
    SetViewMode(ViewMode),
    /// Back to `"all"` and an empty search; tab, sort and view mode stay.
    ResetFilters,
}

impl Default for QueryState {
    fn default() -> Self {
        Self {
            tab: Collection::Agents,
            category: ALL_FACET.to_string(),
            search_text: String::new(),
            sort: SortKey::Featured,
            view_mode: ViewMode::Grid,
        }
    }
}

impl QueryState {
    pub fn reduce(&self, action: QueryAction) -> QueryState {
        let mut next = self.clone();
        match action {
            QueryAction::SetTab(tab) => next.tab = tab,
            QueryAction::SetCategory(category) => next.category = category,
            QueryAction::SetSearchText(text) => next.search_text = text,
            QueryAction::SetSort(sort) => next.sort = sort,
            QueryAction::SetViewMode(mode) => next.view_mode = mode,
            QueryAction::ResetFilters => {
                next.category = ALL_FACET.to_string();
                next.search_text.clear();
            }
        }
        next
    }

    /// True when neither the category nor the text predicate can drop items.
    pub fn is_unfiltered(&self) -> bool {
        self.category == ALL_FACET && self.search_text.is_empty()
    }
}
