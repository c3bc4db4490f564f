//! In-memory collaborators for exercising the engine without Plex or a PVR

use async_trait::async_trait;
use media_match_config::RewriteRule;
use media_match_models::{ExternalIds, Library, LibraryType, MediaItem, PvrRecord};
use media_match_sources::{CatalogStore, MediaServer, Pvr, SourceError};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use crate::Pacer;

pub fn media_item(library_id: i64, path: &str, metadata_id: i64, guid: &str) -> MediaItem {
    MediaItem {
        library_id,
        path: path.to_string(),
        metadata_id,
        guid: guid.to_string(),
        external_guids: None,
    }
}

pub fn pvr_record(title: &str, path: &str, tvdb_id: u64) -> PvrRecord {
    PvrRecord {
        title: title.to_string(),
        path: path.to_string(),
        external_ids: ExternalIds {
            tvdb_id: Some(tvdb_id),
            ..Default::default()
        },
        has_file: true,
        status: "continuing".to_string(),
    }
}

pub fn movie_record(title: &str, path: &str, imdb_id: &str, tmdb_id: u64) -> PvrRecord {
    PvrRecord {
        title: title.to_string(),
        path: path.to_string(),
        external_ids: ExternalIds {
            imdb_id: Some(imdb_id.to_string()),
            tmdb_id: Some(tmdb_id),
            ..Default::default()
        },
        has_file: true,
        status: "released".to_string(),
    }
}

/// Catalog store answering each library with a queue of passes
///
/// Every `list_media_items` call consumes one pass; the last pass repeats.
#[derive(Default)]
pub struct FakeStore {
    libraries: Vec<Library>,
    passes: Mutex<HashMap<i64, VecDeque<Vec<MediaItem>>>>,
    reads: Mutex<Vec<i64>>,
    library_lists: Mutex<usize>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_library(mut self, id: i64, name: &str, library_type: LibraryType, items: Vec<MediaItem>) -> Self {
        self.libraries.push(Library {
            id,
            name: name.to_string(),
            library_type,
            root_path: format!("/data/{}", name),
        });
        self.passes.get_mut().unwrap().entry(id).or_default().push_back(items);
        self
    }

    /// Items returned once earlier passes are used up
    pub fn then_items(mut self, library_id: i64, items: Vec<MediaItem>) -> Self {
        self.passes.get_mut().unwrap().entry(library_id).or_default().push_back(items);
        self
    }

    /// How many times the library list was read
    pub fn library_lists(&self) -> usize {
        *self.library_lists.lock().unwrap()
    }

    /// Library ids in the order their items were read
    pub fn reads(&self) -> Vec<i64> {
        self.reads.lock().unwrap().clone()
    }
}

impl CatalogStore for FakeStore {
    fn list_libraries(&self) -> Result<Vec<Library>, SourceError> {
        *self.library_lists.lock().unwrap() += 1;
        Ok(self.libraries.clone())
    }

    fn list_media_items(&self, library_id: i64) -> Result<Vec<MediaItem>, SourceError> {
        self.reads.lock().unwrap().push(library_id);
        let mut passes = self.passes.lock().unwrap();
        let queue = passes.entry(library_id).or_default();
        let items = if queue.len() > 1 {
            queue.pop_front().unwrap_or_default()
        } else {
            queue.front().cloned().unwrap_or_default()
        };
        Ok(items)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerCall {
    CheckAvailable,
    Split(i64),
    Match { metadata_id: i64, title: String, guid: String },
}

#[derive(Default)]
pub struct FakeServer {
    calls: Mutex<Vec<ServerCall>>,
    unavailable: bool,
    fail_split: Option<i64>,
    fail_match: Option<i64>,
}

impl FakeServer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    pub fn failing_split(metadata_id: i64) -> Self {
        Self {
            fail_split: Some(metadata_id),
            ..Self::default()
        }
    }

    pub fn failing_match(metadata_id: i64) -> Self {
        Self {
            fail_match: Some(metadata_id),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<ServerCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls other than the availability check
    pub fn mutations(&self) -> Vec<ServerCall> {
        self.calls()
            .into_iter()
            .filter(|call| *call != ServerCall::CheckAvailable)
            .collect()
    }
}

#[async_trait]
impl MediaServer for FakeServer {
    async fn check_available(&self) -> Result<(), SourceError> {
        self.calls.lock().unwrap().push(ServerCall::CheckAvailable);
        if self.unavailable {
            return Err(SourceError::unavailable("could not check plex availability", "connection refused"));
        }
        Ok(())
    }

    async fn split(&self, metadata_id: i64) -> Result<(), SourceError> {
        self.calls.lock().unwrap().push(ServerCall::Split(metadata_id));
        if self.fail_split == Some(metadata_id) {
            return Err(SourceError::Fatal {
                context: format!("could not split plex metadata_item {}", metadata_id),
                status: 500,
            });
        }
        Ok(())
    }

    async fn match_item(&self, metadata_id: i64, title: &str, guid: &str) -> Result<(), SourceError> {
        self.calls.lock().unwrap().push(ServerCall::Match {
            metadata_id,
            title: title.to_string(),
            guid: guid.to_string(),
        });
        if self.fail_match == Some(metadata_id) {
            return Err(SourceError::Fatal {
                context: format!("could not match plex metadata_item {}", metadata_id),
                status: 404,
            });
        }
        Ok(())
    }
}

pub struct FakePvr {
    name: String,
    library_type: LibraryType,
    rewrite: RewriteRule,
    records: Vec<PvrRecord>,
}

impl FakePvr {
    pub fn tv(name: &str, records: Vec<PvrRecord>) -> Self {
        Self {
            name: name.to_string(),
            library_type: LibraryType::Tv,
            rewrite: RewriteRule::default(),
            records,
        }
    }

    pub fn movie(name: &str, records: Vec<PvrRecord>) -> Self {
        Self {
            library_type: LibraryType::Movie,
            ..Self::tv(name, records)
        }
    }

    pub fn with_rewrite(mut self, rewrite: RewriteRule) -> Self {
        self.rewrite = rewrite;
        self
    }
}

#[async_trait]
impl Pvr for FakePvr {
    fn name(&self) -> &str {
        &self.name
    }

    fn library_type(&self) -> LibraryType {
        self.library_type
    }

    fn rewrite_rule(&self) -> &RewriteRule {
        &self.rewrite
    }

    async fn list_items(&self) -> Result<Vec<PvrRecord>, SourceError> {
        Ok(self.records.clone())
    }
}

/// Pacer that records requested pauses instead of sleeping
#[derive(Default)]
pub struct RecordingPacer {
    pauses: Mutex<Vec<Duration>>,
}

impl RecordingPacer {
    pub fn pauses(&self) -> Vec<Duration> {
        self.pauses.lock().unwrap().clone()
    }
}

#[async_trait]
impl Pacer for RecordingPacer {
    async fn pause(&self, duration: Duration) {
        self.pauses.lock().unwrap().push(duration);
    }
}
