//! Category facets derived from the loaded listing universe.
//!
//! Facets reflect everything that was loaded, not the current view: filtering
//! never shrinks the facet set. The set always starts with the `"all"`
//! sentinel, followed by the de-duplicated categories in lexicographic order.

use crate::catalog::model::Listing;
use serde::Serialize;
use std::collections::BTreeSet;

/// Sentinel facet that disables the category predicate.
pub const ALL_FACET: &str = "all";

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(transparent)]
/// Ordered facet list; index 0 is always `ALL_FACET`.
pub struct FacetSet(Vec<String>);

impl FacetSet {
    /// The fallback before any combined load succeeded: only `"all"`.
    ///
    /// Consumers should read this as "no facets yet", not "no categories".
    pub fn placeholder() -> Self {
        FacetSet(vec![ALL_FACET.to_string()])
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Categories without the sentinel.
    pub fn categories(&self) -> &[String] {
        self.0.get(1..).unwrap_or_default()
    }

    pub fn contains(&self, facet: &str) -> bool {
        self.0.iter().any(|existing| existing == facet)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when only the sentinel is present.
    pub fn is_placeholder(&self) -> bool {
        self.0.len() == 1
    }
}

impl Default for FacetSet {
    fn default() -> Self {
        Self::placeholder()
    }
}

/// Build facets from the union of both collections.
///
/// Items with an empty category are skipped. Categories are compared as-is;
/// normalization already happened in the repository client.
pub fn build_facets<A: Listing, C: Listing>(agents: &[A], chatflows: &[C]) -> FacetSet {
    let mut categories: BTreeSet<&str> = BTreeSet::new();
    categories.extend(agents.iter().map(|item| item.category()));
    categories.extend(chatflows.iter().map(|item| item.category()));
    categories.remove("");
    // A producer label equal to the sentinel collapses into it.
    categories.remove(ALL_FACET);

    let mut facets = Vec::with_capacity(categories.len() + 1);
    facets.push(ALL_FACET.to_string());
    facets.extend(categories.into_iter().map(str::to_string));
    FacetSet(facets)
}
