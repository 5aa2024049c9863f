//! Listing repository client.
//!
//! A `ListingSource` is the transport seam: it hands back whatever JSON the
//! remote side produced for one collection. `ListingClient` turns that raw
//! payload into typed listings, rejecting anything that is not an array of
//! well-formed entries, and lower-cases every category so downstream
//! comparisons never have to. Retries are not attempted here; the fetch
//! orchestrator owns that.

use crate::catalog::identity::Collection;
use crate::catalog::model::{AgentListing, CatalogEntry, ChatflowListing};
use crate::schema::validate_listing_collection;
use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

/// Ways a collection fetch can fail. Both are recoverable via retry.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// The source could not produce a payload at all.
    #[error("{0}")]
    Transport(String),

    /// A payload arrived but is not a collection of listings.
    #[error("malformed {collection} response: {detail}")]
    Malformed {
        collection: Collection,
        detail: String,
    },
}

/// Transport that produces raw JSON for a collection.
pub trait ListingSource: Send + Sync {
    fn fetch(&self, collection: Collection) -> Result<Value>;
}

/// Reads `<root>/agents.json` and `<root>/chatflows.json`.
#[derive(Clone, Debug)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn collection_path(&self, collection: Collection) -> PathBuf {
        self.root.join(collection.file_name())
    }
}

impl ListingSource for DirectorySource {
    fn fetch(&self, collection: Collection) -> Result<Value> {
        let path = self.collection_path(collection);
        let data =
            fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
        let value: Value =
            serde_json::from_str(&data).with_context(|| format!("parsing {}", path.display()))?;
        Ok(value)
    }
}

/// Typed, normalizing front for a `ListingSource`.
#[derive(Clone)]
pub struct ListingClient {
    source: Arc<dyn ListingSource>,
}

impl ListingClient {
    pub fn new(source: Arc<dyn ListingSource>) -> Self {
        Self { source }
    }

    pub fn from_source<S: ListingSource + 'static>(source: S) -> Self {
        Self::new(Arc::new(source))
    }

    pub fn fetch_agents(&self) -> Result<Vec<AgentListing>, FetchError> {
        self.fetch()
    }

    pub fn fetch_chatflows(&self) -> Result<Vec<ChatflowListing>, FetchError> {
        self.fetch()
    }

    /// Fetch, validate, deserialize, and normalize one collection.
    pub fn fetch<L: CatalogEntry>(&self) -> Result<Vec<L>, FetchError> {
        let collection = L::COLLECTION;
        let payload = self
            .source
            .fetch(collection)
            .map_err(|err| FetchError::Transport(format!("{err:#}")))?;
        let mut listings: Vec<L> = decode_collection(collection, payload)?;
        for listing in &mut listings {
            normalize_category(listing.category_mut());
        }
        warn_on_duplicate_ids(collection, &listings);
        Ok(listings)
    }
}

fn decode_collection<L: CatalogEntry>(
    collection: Collection,
    payload: Value,
) -> Result<Vec<L>, FetchError> {
    let malformed = |detail: String| FetchError::Malformed { collection, detail };

    if !payload.is_array() {
        return Err(malformed(format!(
            "expected a JSON array, got {}",
            json_kind(&payload)
        )));
    }
    validate_listing_collection(&payload).map_err(|errors| malformed(errors.join("; ")))?;
    serde_json::from_value(payload).map_err(|err| malformed(err.to_string()))
}

fn normalize_category(category: &mut String) {
    *category = category.trim().to_lowercase();
}

fn warn_on_duplicate_ids<L: CatalogEntry>(collection: Collection, listings: &[L]) {
    let mut seen = BTreeSet::new();
    for listing in listings {
        if !seen.insert(listing.id()) {
            warn!(%collection, id = %listing.id().0, "duplicate listing id");
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
