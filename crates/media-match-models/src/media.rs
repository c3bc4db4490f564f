use serde::{Deserialize, Serialize};

/// A file (or folder) known to the media server
///
/// `guid` is the literal GUID Plex assigned. When that is an internal
/// `plex://` GUID, `external_guids` carries the comma-separated external
/// identifiers Plex tagged the item with.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct MediaItem {
    pub library_id: i64,
    pub path: String,
    pub metadata_id: i64,
    pub guid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_guids: Option<String>,
}
