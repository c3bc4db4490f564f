use media_match_models::{Library, LibraryType, MediaItem};
use rusqlite::{params, Connection, OpenFlags, Row};
use std::path::Path;
use tracing::{debug, info};

use super::INTERNAL_GUID_PREFIX;
use crate::{CatalogStore, SourceError};

/// Plex's library database, opened read-only for the duration of a run
pub struct PlexDatastore {
    conn: Connection,
}

impl PlexDatastore {
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(SourceError::store(format!("could not open database {}", path.display())))?;

        info!(database = %path.display(), "Opened plex database");
        Ok(Self { conn })
    }
}

impl CatalogStore for PlexDatastore {
    fn list_libraries(&self) -> Result<Vec<Library>, SourceError> {
        let mut stmt = self
            .conn
            .prepare(SQL_SELECT_LIBRARIES)
            .map_err(SourceError::store("select libraries"))?;

        let libraries = stmt
            .query_map([], |row| {
                Ok(Library {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    library_type: LibraryType::from_section_type(row.get(2)?),
                    root_path: row.get(3)?,
                })
            })
            .map_err(SourceError::store("select libraries"))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(SourceError::store("scan library row"))?;

        debug!(count = libraries.len(), "Retrieved libraries");
        Ok(libraries)
    }

    fn list_media_items(&self, library_id: i64) -> Result<Vec<MediaItem>, SourceError> {
        let mut stmt = self
            .conn
            .prepare(SQL_SELECT_LIBRARY_ITEMS_METADATA)
            .map_err(SourceError::store("select media items"))?;

        let rows = stmt
            .query_map(params![library_id], MediaItemRow::from_row)
            .map_err(SourceError::store("select media items"))?;

        let mut items = Vec::new();
        for row in rows {
            let row = row.map_err(SourceError::store("scan media item row"))?;
            items.push(row.into_media_item()?);
        }

        Ok(items)
    }
}

/// Raw row of the media item query; every column may be NULL
#[derive(Debug)]
struct MediaItemRow {
    library_id: Option<i64>,
    section_root_path: Option<String>,
    child_directory_path: Option<String>,
    metadata_item_id: Option<i64>,
    metadata_item_guid: Option<String>,
    external_guids: Option<String>,
}

impl MediaItemRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            library_id: row.get("library_id")?,
            section_root_path: row.get("section_root_path")?,
            child_directory_path: row.get("child_directory_path")?,
            metadata_item_id: row.get("child_directory_metadata_item_id")?,
            metadata_item_guid: row.get("child_directory_metadata_item_guid")?,
            external_guids: row.get("child_directory_metadata_item_guids_external")?,
        })
    }

    fn into_media_item(self) -> Result<MediaItem, SourceError> {
        let invalid = |row: &Self| SourceError::Data(format!("{:?}", row));

        let (Some(library_id), Some(root), Some(child), Some(metadata_id), Some(guid)) = (
            self.library_id,
            self.section_root_path.as_deref(),
            self.child_directory_path.as_deref(),
            self.metadata_item_id,
            self.metadata_item_guid.as_deref(),
        ) else {
            return Err(invalid(&self));
        };

        let external_guids = self
            .external_guids
            .as_deref()
            .filter(|tags| !tags.trim().is_empty());

        // Agent GUIDs are only comparable through their external tags
        if guid.starts_with(INTERNAL_GUID_PREFIX) && external_guids.is_none() {
            return Err(invalid(&self));
        }

        Ok(MediaItem {
            library_id,
            path: Path::new(root).join(child).to_string_lossy().into_owned(),
            metadata_id,
            guid: guid.to_string(),
            external_guids: external_guids.map(str::to_string),
        })
    }
}

const SQL_SELECT_LIBRARIES: &str = "
SELECT
    ls.id,
    ls.name,
    ls.section_type AS type,
    sl.root_path
FROM
    library_sections ls
    JOIN section_locations sl ON sl.library_section_id = ls.id
ORDER BY ls.id
";

// One row per top-level directory of a section. The metadata item is the
// top-most ancestor carrying a GUID (show for episodes, movie for movies).
// Rows are ordered by path so the first of several items sharing a metadata
// id is stable across runs.
const SQL_SELECT_LIBRARY_ITEMS_METADATA: &str = "
WITH ls AS (
    SELECT
        ls.id AS library_id,
        ls.name AS library_name,
        sl.id AS section_id,
        sl.root_path AS section_root_path,
        d.id AS section_directory_id
    FROM
        library_sections ls
        JOIN section_locations sl ON sl.library_section_id = ls.id
        JOIN directories d ON d.library_section_id = ls.id
    WHERE
        d.parent_directory_id IS NULL
)
SELECT
    ls.*,
    d.id AS child_directory_id,
    d.path AS child_directory_path,
    CASE
        WHEN mti3.guid IS NOT NULL THEN mti3.id
        WHEN mti2.guid IS NOT NULL THEN mti2.id
        WHEN mti.guid IS NOT NULL THEN mti.id
        ELSE NULL
    END AS child_directory_metadata_item_id,
    CASE
        WHEN mti3.guid IS NOT NULL THEN mti3.guid
        WHEN mti2.guid IS NOT NULL THEN mti2.guid
        WHEN mti.guid IS NOT NULL THEN mti.guid
        ELSE NULL
    END AS child_directory_metadata_item_guid,
    GROUP_CONCAT(DISTINCT t.tag) AS child_directory_metadata_item_guids_external
FROM
    ls
    JOIN directories d ON d.parent_directory_id = ls.section_directory_id
    LEFT JOIN directories d2 ON d2.parent_directory_id = d.id
    JOIN media_parts mdp ON mdp.directory_id = d.id OR mdp.directory_id = d2.id
    JOIN media_items mdi ON mdi.id = mdp.media_item_id
    JOIN metadata_items mti ON mti.id = mdi.metadata_item_id
    LEFT JOIN metadata_items mti2 ON mti2.id = mti.parent_id
    LEFT JOIN metadata_items mti3 ON mti3.id = mti2.parent_id
    LEFT JOIN taggings tj ON tj.metadata_item_id = CASE
        WHEN mti3.guid IS NOT NULL THEN mti3.id
        WHEN mti2.guid IS NOT NULL THEN mti2.id
        ELSE mti.id
    END
    LEFT JOIN tags t ON t.id = tj.tag_id AND t.tag_type = 314
WHERE
    ls.library_id = ?1
GROUP BY d.id
ORDER BY d.path, d.id
";
