use async_trait::async_trait;
use media_match_config::RewriteRule;
use media_match_models::{Library, LibraryType, MediaItem, PvrRecord};

use crate::SourceError;

/// Read-only view of the media server's catalog
pub trait CatalogStore {
    fn list_libraries(&self) -> Result<Vec<Library>, SourceError>;
    fn list_media_items(&self, library_id: i64) -> Result<Vec<MediaItem>, SourceError>;
}

/// Mutating commands understood by the media server
#[async_trait]
pub trait MediaServer: Send + Sync {
    async fn check_available(&self) -> Result<(), SourceError>;

    /// Ask the server to break a metadata grouping into independent items
    async fn split(&self, metadata_id: i64) -> Result<(), SourceError>;

    /// Re-match a metadata item to `guid`
    async fn match_item(&self, metadata_id: i64, title: &str, guid: &str) -> Result<(), SourceError>;
}

/// A PVR backend treated as the source of truth for identifiers
#[async_trait]
pub trait Pvr: Send + Sync {
    fn name(&self) -> &str;

    /// The only library type this backend manages
    fn library_type(&self) -> LibraryType;

    fn rewrite_rule(&self) -> &RewriteRule;

    async fn list_items(&self) -> Result<Vec<PvrRecord>, SourceError>;
}
