//! Deserializable representation of the two listing collections.
//!
//! The structs mirror the wire shape served by listing sources. Downstream
//! code does not touch the concrete fields directly; it goes through the
//! `Listing` accessor trait so filtering and sorting stay generic over both
//! variants.

use crate::catalog::identity::{Collection, ListingId};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Flags and counters used for tie-break sorting.
pub struct ListingMetadata {
    #[serde(default, deserialize_with = "null_as_default")]
    pub featured: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub popular: bool,
    #[serde(default, rename = "new", deserialize_with = "null_as_default")]
    pub is_new: bool,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub review_count: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Marketplace entry for an autonomous agent.
pub struct AgentListing {
    pub id: ListingId,
    pub slug: String,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub category: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub capabilities: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: ListingMetadata,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Marketplace entry for a chatflow template. Chatflows carry no capability tags.
pub struct ChatflowListing {
    pub id: ListingId,
    pub slug: String,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub category: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: ListingMetadata,
}

/// Producers send `null` for absent optional fields; treat it like a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Text fields a free-text query is matched against.
#[derive(Clone, Copy, Debug)]
pub struct SearchableText<'a> {
    pub name: &'a str,
    pub description: &'a str,
    /// Capability tags; empty for variants that do not expose any.
    pub tags: &'a [String],
}

/// Sort inputs with absent numeric fields already defaulted to zero.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SortKeys {
    pub featured: bool,
    pub popular: bool,
    pub is_new: bool,
    pub rating: f64,
    pub review_count: u64,
}

/// Accessor set shared by every listing variant.
pub trait Listing {
    fn id(&self) -> &ListingId;
    fn slug(&self) -> &str;
    /// Category label, already lower-cased by the repository client.
    fn category(&self) -> &str;
    fn searchable_text(&self) -> SearchableText<'_>;
    fn sort_keys(&self) -> SortKeys;
}

/// A listing variant that can be fetched as its own collection.
pub trait CatalogEntry: Listing + DeserializeOwned + Send + Sync + 'static {
    const COLLECTION: Collection;

    /// Mutable access used once at load time to normalize the category.
    fn category_mut(&mut self) -> &mut String;
}

impl ListingMetadata {
    pub fn sort_keys(&self) -> SortKeys {
        SortKeys {
            featured: self.featured,
            popular: self.popular,
            is_new: self.is_new,
            rating: self.rating.filter(|r| r.is_finite()).unwrap_or(0.0),
            review_count: self.review_count.unwrap_or(0),
        }
    }
}

impl Listing for AgentListing {
    fn id(&self) -> &ListingId {
        &self.id
    }

    fn slug(&self) -> &str {
        &self.slug
    }

    fn category(&self) -> &str {
        &self.category
    }

    fn searchable_text(&self) -> SearchableText<'_> {
        SearchableText {
            name: &self.name,
            description: &self.description,
            tags: &self.capabilities,
        }
    }

    fn sort_keys(&self) -> SortKeys {
        self.metadata.sort_keys()
    }
}

impl CatalogEntry for AgentListing {
    const COLLECTION: Collection = Collection::Agents;

    fn category_mut(&mut self) -> &mut String {
        &mut self.category
    }
}

impl Listing for ChatflowListing {
    fn id(&self) -> &ListingId {
        &self.id
    }

    fn slug(&self) -> &str {
        &self.slug
    }

    fn category(&self) -> &str {
        &self.category
    }

    fn searchable_text(&self) -> SearchableText<'_> {
        SearchableText {
            name: &self.name,
            description: &self.description,
            tags: &[],
        }
    }

    fn sort_keys(&self) -> SortKeys {
        self.metadata.sort_keys()
    }
}

impl CatalogEntry for ChatflowListing {
    const COLLECTION: Collection = Collection::Chatflows;

    fn category_mut(&mut self) -> &mut String {
        &mut self.category
    }
}
