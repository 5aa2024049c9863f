//! Consumer-facing catalog surface.
//!
//! `Marketplace` pairs the fetch orchestrator with the current `QueryState`
//! and exposes what a rendering layer needs: facets, the visible listings for
//! the active tab, aggregate load status, the user-facing error message, and
//! the query mutators. Visible items are recomputed on demand from a snapshot;
//! nothing is cached between calls.

use crate::catalog::{
    AgentListing, ChatflowListing, Collection, FacetSet, ListingClient, SortKey, ViewMode,
};
use crate::engine::select_visible;
use crate::orchestrator::{CatalogSnapshot, FetchOrchestrator, LoadHandle, LoadStatus};
use crate::query::{QueryAction, QueryState};
use serde::Serialize;

/// Listings visible under the active tab, in display order.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "tab", content = "items", rename_all = "lowercase")]
pub enum VisibleListings {
    Agents(Vec<AgentListing>),
    Chatflows(Vec<ChatflowListing>),
}

impl VisibleListings {
    pub fn collection(&self) -> Collection {
        match self {
            VisibleListings::Agents(_) => Collection::Agents,
            VisibleListings::Chatflows(_) => Collection::Chatflows,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            VisibleListings::Agents(items) => items.len(),
            VisibleListings::Chatflows(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Slugs in display order.
    pub fn slugs(&self) -> Vec<&str> {
        match self {
            VisibleListings::Agents(items) => items.iter().map(|a| a.slug.as_str()).collect(),
            VisibleListings::Chatflows(items) => items.iter().map(|c| c.slug.as_str()).collect(),
        }
    }
}

impl CatalogSnapshot {
    /// Apply `query` to the collection named by its tab.
    pub fn select(&self, query: &QueryState) -> VisibleListings {
        match query.tab {
            Collection::Agents => VisibleListings::Agents(
                select_visible(&self.agents.items[..], query)
                    .into_iter()
                    .cloned()
                    .collect(),
            ),
            Collection::Chatflows => VisibleListings::Chatflows(
                select_visible(&self.chatflows.items[..], query)
                    .into_iter()
                    .cloned()
                    .collect(),
            ),
        }
    }
}

pub struct Marketplace {
    orchestrator: FetchOrchestrator,
    query: QueryState,
}

impl Marketplace {
    pub fn new(client: ListingClient) -> Self {
        Self::with_query(client, QueryState::default())
    }

    pub fn with_query(client: ListingClient, query: QueryState) -> Self {
        Self {
            orchestrator: FetchOrchestrator::new(client),
            query,
        }
    }

    pub fn load(&self) -> LoadHandle {
        self.orchestrator.load()
    }

    pub fn retry(&self) -> LoadHandle {
        self.orchestrator.retry()
    }

    pub fn query(&self) -> &QueryState {
        &self.query
    }

    pub fn dispatch(&mut self, action: QueryAction) {
        self.query = self.query.reduce(action);
    }

    pub fn set_category(&mut self, category: impl Into<String>) {
        self.dispatch(QueryAction::SetCategory(category.into()));
    }

    pub fn set_search_text(&mut self, text: impl Into<String>) {
        self.dispatch(QueryAction::SetSearchText(text.into()));
    }

    pub fn set_sort(&mut self, sort: SortKey) {
        self.dispatch(QueryAction::SetSort(sort));
    }

    pub fn set_tab(&mut self, tab: Collection) {
        self.dispatch(QueryAction::SetTab(tab));
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.dispatch(QueryAction::SetViewMode(mode));
    }

    pub fn reset_filters(&mut self) {
        self.dispatch(QueryAction::ResetFilters);
    }

    pub fn snapshot(&self) -> CatalogSnapshot {
        self.orchestrator.snapshot()
    }

    pub fn facets(&self) -> FacetSet {
        self.snapshot().facets
    }

    pub fn visible_items(&self) -> VisibleListings {
        self.snapshot().select(&self.query)
    }

    pub fn load_status(&self) -> LoadStatus {
        self.orchestrator.status()
    }

    pub fn error_message(&self) -> Option<String> {
        self.snapshot().error_message
    }

    pub fn is_retrying(&self) -> bool {
        self.snapshot().retrying
    }

    pub fn find_agent(&self, slug: &str) -> Option<AgentListing> {
        self.snapshot().find_agent(slug).cloned()
    }

    pub fn find_chatflow(&self, slug: &str) -> Option<ChatflowListing> {
        self.snapshot().find_chatflow(slug).cloned()
    }
}
