//! Catalog data models
//!
//! Value types returned by the catalog: collections, tracks, stream
//! candidates and the profile summary. Everything here is an immutable
//! snapshot of a remote record.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Kind of collection a download job reads from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionKind {
    /// The account's liked tracks; a singleton without a remote id
    Favorites,
    /// A saved playlist with a remote id
    Playlist,
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectionKind::Favorites => write!(f, "favorites"),
            CollectionKind::Playlist => write!(f, "playlist"),
        }
    }
}

/// A playlist saved in the user's collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    /// Remote identifier
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    /// Display title
    #[serde(default)]
    pub title: String,
}

impl Collection {
    /// Create a collection entry
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

/// One credited artist of a track
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    /// Artist display name
    #[serde(default)]
    pub title: String,
}

/// A track as listed by the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Remote identifier, used as the key for stream resolution
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    /// Track title
    #[serde(default)]
    pub title: String,
    /// Credited artists in display order
    #[serde(default)]
    pub artists: Vec<Artist>,
}

impl Track {
    /// Create a track with the given artists
    pub fn new(id: impl Into<String>, title: impl Into<String>, artists: &[&str]) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artists: artists
                .iter()
                .map(|a| Artist {
                    title: (*a).to_string(),
                })
                .collect(),
        }
    }

    /// Artists joined the way the web player shows them
    pub fn artist_line(&self) -> String {
        self.artists
            .iter()
            .map(|a| a.title.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// `"<artists> - <title>"`, before sanitization
    pub fn display_name(&self) -> String {
        format!("{} - {}", self.artist_line(), self.title)
    }
}

/// Alternative media URLs offered for one track
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamCandidate {
    /// Unix timestamp after which the URLs stop working
    #[serde(default)]
    pub expire: Option<serde_json::Value>,
    /// High quality URL
    #[serde(default)]
    pub high: Option<String>,
    /// Medium quality URL
    #[serde(default)]
    pub mid: Option<String>,
    /// Preview clip URL
    #[serde(default)]
    pub preview: Option<String>,
}

impl StreamCandidate {
    /// Best URL on offer, ranked `high > mid > preview`
    ///
    /// Empty strings count as absent.
    pub fn best_url(&self) -> Option<&str> {
        [&self.high, &self.mid, &self.preview]
            .into_iter()
            .filter_map(|url| url.as_deref())
            .find(|url| !url.is_empty())
    }
}

/// Summary of the authenticated account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileInfo {
    /// Display name of the account
    pub name: String,
}

/// One page of a cursor-paginated listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorPage<T> {
    /// Items on this page
    pub items: Vec<T>,
    /// Cursor for the following page; `None` when the listing is exhausted
    pub next_cursor: Option<String>,
}

/// Accept identifiers serialized either as JSON strings or numbers
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(i64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Number(n) => n.to_string(),
    })
}
