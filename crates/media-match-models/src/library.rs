use serde::{Deserialize, Serialize};
use std::fmt;

use crate::MediaItem;

/// Plex library section type
///
/// Plex stores this as `section_type` (1 = movie, 2 = show). Anything else
/// (music, photos) is kept so it can be reported, but no PVR manages it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum LibraryType {
    Movie,
    Tv,
    Other(i64),
}

impl LibraryType {
    pub fn from_section_type(section_type: i64) -> Self {
        match section_type {
            1 => LibraryType::Movie,
            2 => LibraryType::Tv,
            other => LibraryType::Other(other),
        }
    }
}

impl fmt::Display for LibraryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LibraryType::Movie => write!(f, "movie"),
            LibraryType::Tv => write!(f, "tv"),
            LibraryType::Other(t) => write!(f, "other({})", t),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Library {
    pub id: i64,
    pub name: String,
    pub library_type: LibraryType,
    pub root_path: String,
}

/// Media items pulled from one requested library, in request order
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LibraryItems {
    pub name: String,
    pub library_type: LibraryType,
    pub items: Vec<MediaItem>,
}
