use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Stable identifier for a listing. Never reused across listings.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListingId(pub String);

/// The two independently sourced collections.
///
/// Also used as the active tab of a query, since each tab shows exactly one
/// collection.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Collection {
    #[default]
    Agents,
    Chatflows,
}

/// Sort criterion applied after filtering.
///
/// Known variants keep serialization consistent; `Other` carries any value a
/// caller supplied that this crate does not understand. Selection treats it
/// as "keep input order".
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum SortKey {
    #[default]
    Featured,
    Rating,
    Newest,
    Other(String),
}

/// Presentation hint carried in the query; selection ignores it.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ViewMode {
    #[default]
    Grid,
    List,
}

impl Collection {
    pub const ALL: [Collection; 2] = [Collection::Agents, Collection::Chatflows];

    pub fn as_str(self) -> &'static str {
        match self {
            Collection::Agents => "agents",
            Collection::Chatflows => "chatflows",
        }
    }

    /// File name used by directory-backed sources.
    pub fn file_name(self) -> &'static str {
        match self {
            Collection::Agents => "agents.json",
            Collection::Chatflows => "chatflows.json",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "agents" => Some(Collection::Agents),
            "chatflows" => Some(Collection::Chatflows),
            _ => None,
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Collection {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Collection {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Collection::parse(&value).ok_or_else(|| {
            serde::de::Error::unknown_variant(&value, &["agents", "chatflows"])
        })
    }
}

impl SortKey {
    pub fn as_str(&self) -> &str {
        match self {
            SortKey::Featured => "featured",
            SortKey::Rating => "rating",
            SortKey::Newest => "newest",
            SortKey::Other(value) => value.as_str(),
        }
    }

    pub fn parse(value: &str) -> Self {
        match value {
            "featured" => SortKey::Featured,
            "rating" => SortKey::Rating,
            "newest" => SortKey::Newest,
            other => SortKey::Other(other.to_string()),
        }
    }
}

impl Serialize for SortKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SortKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(Self::parse(&value))
    }
}

impl ViewMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ViewMode::Grid => "grid",
            ViewMode::List => "list",
        }
    }
}

impl Serialize for ViewMode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ViewMode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        match value.as_str() {
            "grid" => Ok(ViewMode::Grid),
            "list" => Ok(ViewMode::List),
            other => Err(serde::de::Error::unknown_variant(other, &["grid", "list"])),
        }
    }
}
