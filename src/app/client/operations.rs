//! Named GraphQL operations and their wire shapes
//!
//! The catalog speaks GraphQL over a single endpoint. Each operation here is
//! an opaque name/query pair; the response structs mirror only the fields the
//! downloader reads. Missing or `null` containers decode as empty rather than
//! failing, since the service omits them freely.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::app::models::{Collection, CursorPage, StreamCandidate, Track};
use crate::constants::zvuk;
use crate::errors::{CatalogError, CatalogResult};

/// A named GraphQL query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operation {
    /// `operationName` sent with the request, also used in error messages
    pub name: &'static str,
    /// Query document
    pub query: &'static str,
}

pub const GET_COLLECTION_IDS: Operation = Operation {
    name: "getColIds",
    query: "query getColIds { collection { playlists { id title } } }",
};

pub const GET_PLAYLIST_TRACKS: Operation = Operation {
    name: "getPlaylistTracks",
    query: "query getPlaylistTracks($id: ID!, $limit: Int, $offset: Int) { \
            playlistTracks(id: $id, limit: $limit, offset: $offset) { \
            id title artists { title } } }",
};

pub const GET_PAGINATED_COLLECTION: Operation = Operation {
    name: "getPaginatedCollection",
    query: "query getPaginatedCollection($limit: Int, $after: String) { \
            paginatedCollection { \
            tracks(pagination: {first: $limit, after: $after}) { \
            items { id title artists { title } } \
            page { endCursor } } } }",
};

pub const GET_STREAM: Operation = Operation {
    name: "getStream",
    query: "query getStream($ids: [ID!]!, $quality: String, $encodeType: String, \
            $includeFlacDrm: Boolean!, $useHLSv2: Boolean!) { \
            mediaContents(ids: $ids, quality: $quality, encodeType: $encodeType) { \
            ... on Track { \
            stream { expire high mid preview flacdrm @include(if: $includeFlacDrm) } \
            streamV3 @include(if: $useHLSv2) { expire hls } } } }",
};

/// Request body posted to the GraphQL endpoint
#[derive(Debug, Serialize)]
pub struct GraphQlRequest<'a> {
    #[serde(rename = "operationName")]
    pub operation_name: &'a str,
    pub query: &'a str,
    pub variables: Value,
}

impl<'a> GraphQlRequest<'a> {
    pub fn new(operation: &'a Operation, variables: Value) -> Self {
        Self {
            operation_name: operation.name,
            query: operation.query,
            variables,
        }
    }
}

/// Variables for one offset page of a playlist
pub fn playlist_page_variables(playlist_id: &str, offset: u32, limit: u32) -> Value {
    json!({ "id": playlist_id, "limit": limit, "offset": offset })
}

/// Variables for one cursor page of the favorites
pub fn favorites_page_variables(cursor: &str, limit: u32) -> Value {
    json!({ "limit": limit, "after": cursor })
}

/// Variables for a stream lookup at the fixed quality tier
pub fn stream_variables(track_id: &str) -> Value {
    json!({
        "ids": [track_id],
        "quality": zvuk::STREAM_QUALITY,
        "encodeType": zvuk::STREAM_ENCODE_TYPE,
        "includeFlacDrm": false,
        "useHLSv2": false,
    })
}

#[derive(Debug, Deserialize)]
pub struct GraphQlErrorEntry {
    #[serde(default)]
    pub message: String,
}

/// Response envelope
#[derive(Debug, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Option<Vec<GraphQlErrorEntry>>,
}

impl<T> GraphQlResponse<T> {
    /// Payload, or a typed error when the server sent none
    ///
    /// Partial data alongside errors is accepted; the errors are dropped.
    pub fn into_data(self, operation: &'static str) -> CatalogResult<T> {
        match (self.data, self.errors) {
            (Some(data), _) => Ok(data),
            (None, Some(errors)) if !errors.is_empty() => Err(CatalogError::GraphQl {
                operation,
                message: errors
                    .into_iter()
                    .map(|e| e.message)
                    .collect::<Vec<_>>()
                    .join("; "),
            }),
            (None, _) => Err(CatalogError::MalformedResponse {
                operation,
                reason: "response has no data".to_string(),
            }),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CollectionData {
    collection: Option<CollectionNode>,
}

#[derive(Debug, Default, Deserialize)]
struct CollectionNode {
    playlists: Option<Vec<Collection>>,
}

impl CollectionData {
    pub fn into_collections(self) -> Vec<Collection> {
        self.collection
            .and_then(|c| c.playlists)
            .unwrap_or_default()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PlaylistTracksData {
    #[serde(rename = "playlistTracks")]
    playlist_tracks: Option<Vec<Track>>,
}

impl PlaylistTracksData {
    pub fn into_tracks(self) -> Vec<Track> {
        self.playlist_tracks.unwrap_or_default()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PaginatedCollectionData {
    #[serde(rename = "paginatedCollection")]
    paginated_collection: Option<PaginatedCollectionNode>,
}

#[derive(Debug, Default, Deserialize)]
struct PaginatedCollectionNode {
    tracks: Option<TrackConnection>,
}

#[derive(Debug, Default, Deserialize)]
struct TrackConnection {
    items: Option<Vec<Track>>,
    page: Option<PageInfo>,
}

#[derive(Debug, Default, Deserialize)]
struct PageInfo {
    #[serde(rename = "endCursor")]
    end_cursor: Option<String>,
}

impl PaginatedCollectionData {
    pub fn into_page(self) -> CursorPage<Track> {
        let connection = self
            .paginated_collection
            .and_then(|c| c.tracks)
            .unwrap_or_default();
        CursorPage {
            items: connection.items.unwrap_or_default(),
            next_cursor: connection
                .page
                .and_then(|p| p.end_cursor)
                .filter(|c| !c.is_empty()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct StreamData {
    #[serde(rename = "mediaContents")]
    media_contents: Option<Vec<Option<MediaContent>>>,
}

#[derive(Debug, Default, Deserialize)]
struct MediaContent {
    stream: Option<StreamCandidate>,
}

impl StreamData {
    /// Stream of the first media entry, if the server offered one
    pub fn into_stream(self) -> Option<StreamCandidate> {
        self.media_contents
            .unwrap_or_default()
            .into_iter()
            .next()
            .flatten()
            .and_then(|m| m.stream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::de::DeserializeOwned;

    fn decode<T: DeserializeOwned>(body: &str, operation: &'static str) -> CatalogResult<T> {
        let envelope: GraphQlResponse<T> = serde_json::from_str(body).unwrap();
        envelope.into_data(operation)
    }

    #[test]
    fn test_request_body_shape() {
        let body = GraphQlRequest::new(&GET_STREAM, stream_variables("42"));
        let value = serde_json::to_value(&body).unwrap();

        assert_eq!(value["operationName"], "getStream");
        assert_eq!(value["variables"]["ids"], json!(["42"]));
        assert_eq!(value["variables"]["quality"], "hq");
        assert_eq!(value["variables"]["encodeType"], "wv");
        assert_eq!(value["variables"]["includeFlacDrm"], false);
    }

    #[test]
    fn test_collections_decode_numeric_ids() {
        let data: CollectionData = decode(
            r#"{"data":{"collection":{"playlists":[{"id":1,"title":"A"},{"id":"2","title":"B"}]}}}"#,
            "getColIds",
        )
        .unwrap();

        assert_eq!(
            data.into_collections(),
            vec![Collection::new("1", "A"), Collection::new("2", "B")]
        );
    }

    #[test]
    fn test_null_containers_decode_empty() {
        let data: CollectionData =
            decode(r#"{"data":{"collection":null}}"#, "getColIds").unwrap();
        assert!(data.into_collections().is_empty());

        let data: PlaylistTracksData =
            decode(r#"{"data":{"playlistTracks":null}}"#, "getPlaylistTracks").unwrap();
        assert!(data.into_tracks().is_empty());
    }

    #[test]
    fn test_cursor_page_decode() {
        let data: PaginatedCollectionData = decode(
            r#"{"data":{"paginatedCollection":{"tracks":{
                "items":[{"id":7,"title":"T","artists":[{"title":"A"}]}],
                "page":{"endCursor":"abc"}}}}}"#,
            "getPaginatedCollection",
        )
        .unwrap();

        let page = data.into_page();
        assert_eq!(page.items, vec![Track::new("7", "T", &["A"])]);
        assert_eq!(page.next_cursor.as_deref(), Some("abc"));
    }

    #[test]
    fn test_empty_cursor_means_exhausted() {
        let data: PaginatedCollectionData = decode(
            r#"{"data":{"paginatedCollection":{"tracks":{"items":[],"page":{"endCursor":""}}}}}"#,
            "getPaginatedCollection",
        )
        .unwrap();
        assert_eq!(data.into_page().next_cursor, None);
    }

    #[test]
    fn test_stream_decode() {
        let data: StreamData = decode(
            r#"{"data":{"mediaContents":[{"stream":{"expire":1700000000,"high":null,"mid":"X","preview":"Y"}}]}}"#,
            "getStream",
        )
        .unwrap();
        let stream = data.into_stream().unwrap();
        assert_eq!(stream.best_url(), Some("X"));

        let data: StreamData =
            decode(r#"{"data":{"mediaContents":[{"stream":null}]}}"#, "getStream").unwrap();
        assert!(data.into_stream().is_none());

        let data: StreamData = decode(r#"{"data":{"mediaContents":[]}}"#, "getStream").unwrap();
        assert!(data.into_stream().is_none());
    }

    #[test]
    fn test_errors_without_data() {
        let result: CatalogResult<StreamData> = decode(
            r#"{"data":null,"errors":[{"message":"forbidden"}]}"#,
            "getStream",
        );
        match result {
            Err(CatalogError::GraphQl { message, .. }) => assert_eq!(message, "forbidden"),
            other => panic!("Expected GraphQl error, got {:?}", other),
        }

        let result: CatalogResult<StreamData> = decode(r#"{}"#, "getStream");
        assert!(matches!(result, Err(CatalogError::MalformedResponse { .. })));
    }
}
