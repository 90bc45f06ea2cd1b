//! Paginated catalog traversal
//!
//! Two strategies drain a listing into a single ordered `Vec`: offset paging
//! for playlists and cursor paging for favorites. Both stop on exhaustion, on
//! a catalog failure (keeping what was collected), on a page or cursor the
//! server already sent, and after `max_pages` pages.

use std::collections::HashSet;
use std::fmt;
use std::future::Future;

use tracing::{debug, warn};

use crate::app::client::CatalogApi;
use crate::app::models::{CursorPage, Track};
use crate::constants::limits;
use crate::errors::CatalogResult;

/// Paging parameters shared by both strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationConfig {
    /// Items requested per page
    pub page_size: u32,
    /// Hard bound on pages fetched for one listing
    pub max_pages: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page_size: limits::DEFAULT_PAGE_SIZE,
            max_pages: limits::DEFAULT_MAX_PAGES,
        }
    }
}

/// Why a traversal ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// Empty page, short page, or no next cursor
    Exhausted,
    /// Server handed back a cursor it had already sent
    RepeatedCursor,
    /// Server returned the same page twice in a row
    RepeatedPage,
    /// `max_pages` reached
    PageLimit,
    /// A page request failed; items before it are kept
    Failed(String),
}

impl StopReason {
    /// Whether the listing was read to its natural end
    pub fn is_complete(&self) -> bool {
        matches!(self, StopReason::Exhausted)
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::Exhausted => write!(f, "listing exhausted"),
            StopReason::RepeatedCursor => write!(f, "server repeated a cursor"),
            StopReason::RepeatedPage => write!(f, "server repeated a page"),
            StopReason::PageLimit => write!(f, "page limit reached"),
            StopReason::Failed(message) => write!(f, "listing failed: {}", message),
        }
    }
}

/// Items gathered by one traversal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Traversal<T> {
    /// All items in server order
    pub items: Vec<T>,
    /// Number of pages successfully fetched
    pub pages: usize,
    /// Why traversal stopped
    pub stop: StopReason,
}

/// Drain an offset-paginated listing
///
/// `fetch` receives the offset of the page to load. Offsets start at 0 and
/// advance by `page_size`; a page shorter than `page_size` is the last one.
pub async fn collect_offset_pages<T, F, Fut>(config: PaginationConfig, mut fetch: F) -> Traversal<T>
where
    T: Clone + PartialEq,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = CatalogResult<Vec<T>>>,
{
    let mut items = Vec::new();
    let mut pages = 0;
    let mut offset = 0u32;
    let mut previous: Option<Vec<T>> = None;

    let stop = loop {
        if pages >= config.max_pages {
            warn!("Stopping offset traversal after {} pages", pages);
            break StopReason::PageLimit;
        }

        let page = match fetch(offset).await {
            Ok(page) => page,
            Err(e) => {
                warn!("Page at offset {} failed: {}", offset, e);
                break StopReason::Failed(e.to_string());
            }
        };
        pages += 1;
        debug!("Offset {} returned {} items", offset, page.len());

        if page.is_empty() {
            break StopReason::Exhausted;
        }
        if previous.as_ref() == Some(&page) {
            warn!("Page at offset {} repeats the previous page", offset);
            break StopReason::RepeatedPage;
        }

        let short = page.len() < config.page_size as usize;
        items.extend(page.iter().cloned());
        previous = Some(page);

        if short {
            break StopReason::Exhausted;
        }
        offset = offset.saturating_add(config.page_size);
    };

    Traversal { items, pages, stop }
}

/// Drain a cursor-paginated listing
///
/// `fetch` receives the cursor of the page to load, starting with `""`. An
/// empty page or a missing/empty next cursor ends the listing.
pub async fn collect_cursor_pages<T, F, Fut>(config: PaginationConfig, mut fetch: F) -> Traversal<T>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = CatalogResult<CursorPage<T>>>,
{
    let mut items = Vec::new();
    let mut pages = 0;
    let mut cursor = String::new();
    let mut seen = HashSet::new();

    let stop = loop {
        if pages >= config.max_pages {
            warn!("Stopping cursor traversal after {} pages", pages);
            break StopReason::PageLimit;
        }

        let page = match fetch(cursor.clone()).await {
            Ok(page) => page,
            Err(e) => {
                warn!("Page after cursor '{}' failed: {}", cursor, e);
                break StopReason::Failed(e.to_string());
            }
        };
        pages += 1;
        debug!("Cursor '{}' returned {} items", cursor, page.items.len());

        if page.items.is_empty() {
            break StopReason::Exhausted;
        }
        items.extend(page.items);

        match page.next_cursor.filter(|next| !next.is_empty()) {
            None => break StopReason::Exhausted,
            Some(next) => {
                if !seen.insert(next.clone()) {
                    warn!("Cursor '{}' was already visited", next);
                    break StopReason::RepeatedCursor;
                }
                cursor = next;
            }
        }
    };

    Traversal { items, pages, stop }
}

/// All tracks of a playlist, by offset
pub async fn playlist_tracks(
    client: &dyn CatalogApi,
    playlist_id: &str,
    config: PaginationConfig,
) -> Traversal<Track> {
    collect_offset_pages(config, move |offset| async move {
        client
            .list_playlist_page(playlist_id, offset, config.page_size)
            .await
    })
    .await
}

/// All favorite tracks, by cursor
pub async fn favorite_tracks(client: &dyn CatalogApi, config: PaginationConfig) -> Traversal<Track> {
    collect_cursor_pages(config, move |cursor| async move {
        client.list_favorites_page(&cursor, config.page_size).await
    })
    .await
}
