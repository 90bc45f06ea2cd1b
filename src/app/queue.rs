//! Download task queue construction
//!
//! Maps what the user picked to the ordered list of jobs the orchestrator
//! runs. Building the queue is pure: no requests, no filesystem access.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use url::Url;

use crate::app::models::{Collection, CollectionKind};
use crate::app::paths;
use crate::constants::{selection, zvuk};
use crate::errors::AppError;

/// What the user asked to download
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Favorites followed by every listed playlist
    All,
    /// Only the favorites collection
    Favorites,
    /// One playlist by remote id, listed or not
    Collection(String),
}

impl FromStr for Selection {
    type Err = AppError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let token = input.trim().to_lowercase();

        if token.is_empty() {
            return Err(AppError::InvalidSelection {
                input: input.to_string(),
            });
        }

        if token == selection::ALL {
            Ok(Selection::All)
        } else if token == selection::FAVORITES
            || selection::FAVORITES_ALIASES.contains(&token.as_str())
        {
            Ok(Selection::Favorites)
        } else {
            Ok(Selection::Collection(token))
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::All => write!(f, "{}", selection::ALL),
            Selection::Favorites => write!(f, "{}", selection::FAVORITES),
            Selection::Collection(id) => write!(f, "{}", id),
        }
    }
}

/// One collection to download into one folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadJob {
    /// Which listing strategy the job uses
    pub kind: CollectionKind,
    /// Remote id (`"0"` for favorites)
    pub source_id: String,
    /// Display title, used for the folder name
    pub title: String,
    /// Folder the job's tracks are written to
    pub destination: PathBuf,
    /// Page the web player would be on; sent as `Referer`
    pub referrer: String,
}

impl DownloadJob {
    /// Job for the favorites collection
    pub fn favorites(root: &Path, base_url: &Url) -> Self {
        let source_id = selection::FAVORITES.to_string();
        let title = selection::FAVORITES_TITLE.to_string();
        Self {
            kind: CollectionKind::Favorites,
            destination: paths::collection_folder(root, &title, &source_id),
            referrer: referrer(base_url, zvuk::FAVORITES_PATH),
            source_id,
            title,
        }
    }

    /// Job for a playlist
    pub fn playlist(root: &Path, base_url: &Url, id: &str, title: &str) -> Self {
        Self {
            kind: CollectionKind::Playlist,
            source_id: id.to_string(),
            title: title.to_string(),
            destination: paths::collection_folder(root, title, id),
            referrer: referrer(base_url, &format!("{}/{}", zvuk::PLAYLIST_PATH, id)),
        }
    }

    /// Folder name relative to the download root
    pub fn folder_name(&self) -> String {
        paths::collection_folder_name(&self.title, &self.source_id)
    }
}

/// Builds the ordered job list for a selection
#[derive(Debug, Clone)]
pub struct TaskQueueBuilder {
    root: PathBuf,
    base_url: Url,
}

impl TaskQueueBuilder {
    /// Create a builder placing folders under `root`
    pub fn new(root: impl Into<PathBuf>, base_url: Url) -> Self {
        Self {
            root: root.into(),
            base_url,
        }
    }

    /// Map a selection to jobs, in the order they should run
    ///
    /// `collections` is the playlist listing fetched at startup. An id missing
    /// from it still yields a job, titled `Unknown_<id>`, since the playlist
    /// may exist without being saved to the collection.
    pub fn build(&self, selection: &Selection, collections: &[Collection]) -> Vec<DownloadJob> {
        match selection {
            Selection::All => std::iter::once(DownloadJob::favorites(&self.root, &self.base_url))
                .chain(collections.iter().map(|c| {
                    DownloadJob::playlist(&self.root, &self.base_url, &c.id, &c.title)
                }))
                .collect(),
            Selection::Favorites => vec![DownloadJob::favorites(&self.root, &self.base_url)],
            Selection::Collection(id) => {
                let title = collections
                    .iter()
                    .find(|c| c.id.eq_ignore_ascii_case(id))
                    .map(|c| c.title.clone())
                    .unwrap_or_else(|| format!("{}{}", selection::UNKNOWN_TITLE_PREFIX, id));
                vec![DownloadJob::playlist(
                    &self.root,
                    &self.base_url,
                    id,
                    &title,
                )]
            }
        }
    }
}

fn referrer(base_url: &Url, path: &str) -> String {
    base_url
        .join(path)
        .map(String::from)
        .unwrap_or_else(|_| format!("{}{}", base_url.as_str().trim_end_matches('/'), path))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> TaskQueueBuilder {
        TaskQueueBuilder::new("downloads", Url::parse(zvuk::BASE_URL).unwrap())
    }

    fn listed() -> Vec<Collection> {
        vec![Collection::new("1", "A"), Collection::new("2", "B")]
    }

    #[test]
    fn test_parse_selection() {
        assert_eq!("all".parse::<Selection>().unwrap(), Selection::All);
        assert_eq!(" ALL \n".parse::<Selection>().unwrap(), Selection::All);
        assert_eq!("0".parse::<Selection>().unwrap(), Selection::Favorites);
        assert_eq!("Favorites".parse::<Selection>().unwrap(), Selection::Favorites);
        assert_eq!(
            "12345".parse::<Selection>().unwrap(),
            Selection::Collection("12345".to_string())
        );
        assert!("   ".parse::<Selection>().is_err());
    }

    #[test]
    fn test_all_orders_favorites_first() {
        let jobs = builder().build(&Selection::All, &listed());

        let order: Vec<_> = jobs
            .iter()
            .map(|j| (j.kind, j.source_id.as_str(), j.title.as_str()))
            .collect();
        assert_eq!(
            order,
            vec![
                (CollectionKind::Favorites, "0", "My Favorites"),
                (CollectionKind::Playlist, "1", "A"),
                (CollectionKind::Playlist, "2", "B"),
            ]
        );
    }

    #[test]
    fn test_all_with_no_playlists() {
        let jobs = builder().build(&Selection::All, &[]);
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].kind, CollectionKind::Favorites);
    }

    #[test]
    fn test_known_collection_uses_listed_title() {
        let jobs = builder().build(&Selection::Collection("2".to_string()), &listed());

        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].title, "B");
        assert_eq!(jobs[0].destination, Path::new("downloads").join("B [2]"));
        assert_eq!(jobs[0].referrer, "https://zvuk.com/playlist/2");
    }

    #[test]
    fn test_unknown_collection_gets_placeholder_title() {
        let jobs = builder().build(&Selection::Collection("5".to_string()), &listed());

        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].kind, CollectionKind::Playlist);
        assert_eq!(jobs[0].title, "Unknown_5");
        assert_eq!(jobs[0].folder_name(), "Unknown_5 [5]");
    }

    #[test]
    fn test_favorites_job() {
        let jobs = builder().build(&Selection::Favorites, &listed());

        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].referrer, "https://zvuk.com/favorites");
        assert_eq!(
            jobs[0].destination,
            Path::new("downloads").join("My Favorites [0]")
        );
    }
}
