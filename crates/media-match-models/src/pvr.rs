use serde::{Deserialize, Serialize};

/// Typed external ids reported by a PVR
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExternalIds {
    pub tvdb_id: Option<u64>,
    pub tmdb_id: Option<u64>,
    pub imdb_id: Option<String>,
}

/// One series or movie as listed by a PVR, before any normalization
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PvrRecord {
    pub title: String,
    pub path: String,
    pub external_ids: ExternalIds,
    pub has_file: bool,
    pub status: String,
}

impl PvrRecord {
    /// Records without files on disk, or deleted upstream, can't be matched
    pub fn is_present(&self) -> bool {
        self.has_file && !self.status.eq_ignore_ascii_case("deleted")
    }
}

/// A PVR record ready for matching
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PvrItem {
    pub pvr: String,
    pub title: String,
    /// Path as reported by the PVR
    pub path: String,
    /// Path as the media server sees it
    pub rewritten_path: String,
    /// Canonical GUIDs, never empty
    pub candidate_guids: Vec<String>,
}
