use media_match_models::{Library, LibraryItems, PvrItem, PvrRecord};
use media_match_sources::{CatalogStore, Pvr};
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};

use crate::identifiers::normalize_external_id;
use crate::rewrite::PathRewriter;
use crate::ReconcileError;

/// Resolves requested library names and pulls their items from the store
///
/// The library list is read once when the aggregator is built; every
/// later pass (including re-aggregation after a split) reuses it.
pub struct CatalogAggregator<'a> {
    store: &'a dyn CatalogStore,
    libraries: Vec<Library>,
}

impl<'a> CatalogAggregator<'a> {
    pub fn new(store: &'a dyn CatalogStore) -> Result<Self, ReconcileError> {
        let libraries = store.list_libraries()?;
        Ok(Self { store, libraries })
    }

    pub fn libraries(&self) -> &[Library] {
        &self.libraries
    }

    /// Case-insensitive lookup; an unknown name is a configuration error
    pub fn resolve_library(&self, name: &str) -> Result<&Library, ReconcileError> {
        let wanted = name.to_lowercase();
        self.libraries
            .iter()
            .find(|library| library.name.to_lowercase() == wanted)
            .ok_or_else(|| ReconcileError::Config(format!("plex library not found: {}", name)))
    }

    pub fn fetch_media_libraries(&self, names: &[String]) -> Result<Vec<LibraryItems>, ReconcileError> {
        if names.is_empty() {
            return Err(ReconcileError::Config("at least one plex library is required".to_string()));
        }

        let mut result = Vec::with_capacity(names.len());
        for name in names {
            let library = self.resolve_library(name)?;
            let items = self
                .store
                .list_media_items(library.id)
                .map_err(|source| ReconcileError::Library {
                    library: library.name.clone(),
                    source,
                })?;

            if items.is_empty() {
                return Err(ReconcileError::EmptyLibrary(library.name.clone()));
            }

            info!(
                operation = "aggregate",
                library = %library.name,
                library_type = %library.library_type,
                items = items.len(),
                "Retrieved plex library items"
            );

            result.push(LibraryItems {
                name: library.name.clone(),
                library_type: library.library_type,
                items,
            });
        }

        Ok(result)
    }
}

/// Turn raw PVR records into matchable items
///
/// Records without a file on disk, deleted upstream, or without a single
/// usable id are dropped.
pub fn build_pvr_items(pvr_name: &str, records: Vec<PvrRecord>, rewriter: &PathRewriter) -> Vec<PvrItem> {
    let mut items = Vec::with_capacity(records.len());

    for record in records {
        if !record.is_present() {
            debug!(pvr = pvr_name, path = %record.path, status = %record.status, "Skipping pvr item without files");
            continue;
        }

        let candidate_guids = normalize_external_id(&record.external_ids);
        if candidate_guids.is_empty() {
            warn!(pvr = pvr_name, title = %record.title, path = %record.path, "Skipping pvr item with no external ids");
            continue;
        }

        let rewritten_path = rewriter.rewrite(&record.path).into_owned();
        items.push(PvrItem {
            pvr: pvr_name.to_string(),
            title: record.title,
            path: record.path,
            rewritten_path,
            candidate_guids,
        });
    }

    items
}

/// PVR items keyed by rewritten path, with every ambiguous path set aside
#[derive(Debug, Default)]
pub struct PathPartition {
    pub accepted: BTreeMap<String, PvrItem>,
    pub rejected: Vec<PvrItem>,
}

/// Key items by rewritten path
///
/// A path reported more than once is ambiguous: every item claiming it is
/// rejected and none survives, whichever PVR reported it.
pub fn partition_by_path(items: Vec<PvrItem>) -> PathPartition {
    let mut partition = PathPartition::default();
    let mut collided = BTreeSet::new();

    for item in items {
        if collided.contains(&item.rewritten_path) {
            partition.rejected.push(item);
            continue;
        }

        match partition.accepted.entry(item.rewritten_path.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(item);
            }
            Entry::Occupied(slot) => {
                collided.insert(item.rewritten_path.clone());
                partition.rejected.push(slot.remove());
                partition.rejected.push(item);
            }
        }
    }

    partition
}

/// List every PVR in turn and key the combined items by rewritten path
pub async fn fetch_pvr_items(pvrs: &[Box<dyn Pvr>]) -> Result<PathPartition, ReconcileError> {
    let mut items = Vec::new();

    for pvr in pvrs {
        let rewriter = PathRewriter::new(pvr.rewrite_rule()).map_err(|e| {
            ReconcileError::Config(format!("invalid rewrite pattern for pvr {:?}: {}", pvr.name(), e))
        })?;

        let records = pvr.list_items().await?;
        if records.is_empty() {
            return Err(ReconcileError::EmptyPvr(pvr.name().to_string()));
        }

        let listed = records.len();
        let built = build_pvr_items(pvr.name(), records, &rewriter);
        info!(
            operation = "aggregate",
            pvr = pvr.name(),
            listed,
            usable = built.len(),
            "Retrieved pvr items"
        );
        items.extend(built);
    }

    let partition = partition_by_path(items);

    for item in &partition.rejected {
        warn!(
            pvr = %item.pvr,
            path = %item.rewritten_path,
            title = %item.title,
            "Removing pvr item sharing its path with another item"
        );
    }
    if !partition.rejected.is_empty() {
        warn!(removed = partition.rejected.len(), "Removed pvr items with colliding paths");
    }

    if partition.accepted.is_empty() {
        let names: Vec<&str> = pvrs.iter().map(|p| p.name()).collect();
        return Err(ReconcileError::EmptyPvr(names.join(", ")));
    }

    Ok(partition)
}
