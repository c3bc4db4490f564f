use media_match_sources::SourceError;

#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("failed retrieving plex library items for {library:?}: {source}")]
    Library {
        library: String,
        #[source]
        source: SourceError,
    },

    #[error("no plex library items found for: {0}")]
    EmptyLibrary(String),

    #[error("no pvr library items retrieved for: {0}")]
    EmptyPvr(String),

    #[error("{count} duplicate item(s) remain in plex library {library:?} after splitting")]
    DuplicatesRemain { library: String, count: usize },

    #[error("invalid identifier for {path}: {reason}")]
    Identifier { path: String, reason: String },

    #[error("failed splitting duplicate item in plex library {library:?}: {path} (metadata_item {metadata_id}): {source}")]
    Split {
        library: String,
        path: String,
        metadata_id: i64,
        #[source]
        source: SourceError,
    },

    #[error("failed fixing match for {path} (metadata_item {metadata_id}) to {guid}: {source}")]
    Match {
        path: String,
        metadata_id: i64,
        guid: String,
        #[source]
        source: SourceError,
    },
}
