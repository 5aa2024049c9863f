//! In-memory discovery layer for the agent and chatflow marketplace.
//!
//! The crate loads two independently sourced listing collections, derives
//! category facets from them, and answers filter/sort queries over the loaded
//! data. Public items here form the contract the `catalog-browse` binary and
//! any rendering layer depend on: catalog root discovery, the repository
//! client, the fetch orchestrator, the query reducer, and the pure selection
//! engine.

use anyhow::{Result, bail};
use std::{
    env, fs,
    path::{Path, PathBuf},
};

pub mod catalog;
pub mod engine;
pub mod marketplace;
pub mod orchestrator;
pub mod query;
pub mod runtime;
pub mod schema;

pub use catalog::{
    ALL_FACET, AgentListing, CatalogEntry, ChatflowListing, Collection, DirectorySource, FacetSet,
    FetchError, Listing, ListingClient, ListingId, ListingMetadata, ListingSource, SortKey,
    ViewMode, build_facets,
};
pub use engine::{matches_category, matches_text, select_visible};
pub use marketplace::{Marketplace, VisibleListings};
pub use orchestrator::{
    CatalogSnapshot, FetchOrchestrator, LoadHandle, LoadState, LoadStatus, aggregate_status,
};
pub use query::{QueryAction, QueryState};

/// Environment variable naming an explicit catalog directory.
pub const CATALOG_ROOT_ENV: &str = "LISTING_CATALOG_ROOT";
const DATA_DIR: &str = "data";

/// Returns true when `candidate` holds both collection files.
fn is_catalog_root(candidate: &Path) -> bool {
    Collection::ALL
        .iter()
        .all(|collection| candidate.join(collection.file_name()).is_file())
}

/// Verifies that an explicit root hint points at a usable catalog directory.
fn catalog_root_from_hint(hint: &str) -> Option<PathBuf> {
    if hint.is_empty() {
        return None;
    }
    let hint_path = PathBuf::from(hint);
    if !hint_path.exists() || !is_catalog_root(&hint_path) {
        return None;
    }
    fs::canonicalize(hint_path).ok()
}

fn search_upwards(start: &Path) -> Option<PathBuf> {
    let mut dir = fs::canonicalize(start).ok()?;
    loop {
        let data_dir = dir.join(DATA_DIR);
        if is_catalog_root(&data_dir) {
            return Some(data_dir);
        }
        if !dir.pop() {
            break;
        }
    }
    None
}

/// Locate the directory holding `agents.json` and `chatflows.json`.
///
/// Search order: `LISTING_CATALOG_ROOT` if it points at a real catalog, then a
/// `data/` directory found by climbing up from the current executable, then
/// the build-time hint.
pub fn find_catalog_root() -> Result<PathBuf> {
    if let Ok(env_root) = env::var(CATALOG_ROOT_ENV) {
        if let Some(root) = catalog_root_from_hint(&env_root) {
            return Ok(root);
        }
    }

    if let Ok(exe_path) = env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            if let Some(root) = search_upwards(exe_dir) {
                return Ok(root);
            }
        }
    }

    if let Some(hint) = option_env!("LISTING_CATALOG_ROOT_HINT") {
        if let Some(root) = catalog_root_from_hint(hint) {
            return Ok(root);
        }
    }

    bail!(
        "Unable to locate a listing catalog. Set {CATALOG_ROOT_ENV} to a directory containing agents.json and chatflows.json."
    );
}
