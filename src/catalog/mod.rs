//! Listing catalog wiring.
//!
//! Types here mirror the two listing collections served by the marketplace
//! backend. `repository` fetches and normalizes them, `index` derives the
//! category facets, and `model` exposes the `Listing` accessor trait that the
//! filter engine is written against.

pub mod identity;
pub mod index;
pub mod model;
pub mod repository;

pub use identity::{Collection, ListingId, SortKey, ViewMode};
pub use index::{ALL_FACET, FacetSet, build_facets};
pub use model::{
    AgentListing, CatalogEntry, ChatflowListing, Listing, ListingMetadata, SearchableText,
    SortKeys,
};
pub use repository::{DirectorySource, FetchError, ListingClient, ListingSource};
