use media_match_models::{LibraryItems, MediaItem, PvrItem, ReconciliationAction};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, trace};

use crate::identifiers::{any_match, expand_catalog_guid, select_preferred, with_locale, Authority};
use crate::ReconcileError;

/// Outcome of comparing the media server's catalog with the PVR catalog
#[derive(Debug, Default, Serialize)]
pub struct MatchReport {
    /// Re-matches to perform, in visit order
    pub actions: Vec<ReconciliationAction>,
    /// Items whose identifiers already agree
    pub confirmed: usize,
    /// Media items no PVR reports at their path
    pub media_only: Vec<MediaItem>,
    /// PVR items no media item was found at, in path order
    pub pvr_only: Vec<PvrItem>,
}

/// Compare every media item with the PVR item at the same path
///
/// Libraries are visited in order, then items in row order. A pair is
/// confirmed when any media GUID starts with any PVR candidate; otherwise
/// an action re-matches the item to the PVR's preferred GUID.
pub fn reconcile(
    libraries: &[LibraryItems],
    pvr_items: &BTreeMap<String, PvrItem>,
    locale: &str,
) -> Result<MatchReport, ReconcileError> {
    let mut report = MatchReport::default();
    let mut unseen: BTreeSet<&str> = pvr_items.keys().map(String::as_str).collect();

    for library in libraries {
        let dominant = Authority::dominant_for(library.library_type);

        for item in &library.items {
            let Some(pvr_item) = pvr_items.get(&item.path) else {
                debug!(library = %library.name, path = %item.path, guid = %item.guid, "Media item not found in pvr");
                report.media_only.push(item.clone());
                continue;
            };
            unseen.remove(item.path.as_str());

            let media_guids = expand_catalog_guid(&item.guid, item.external_guids.as_deref(), dominant)
                .map_err(|e| ReconcileError::Identifier {
                    path: item.path.clone(),
                    reason: e.to_string(),
                })?;

            if any_match(&media_guids, &pvr_item.candidate_guids) {
                trace!(path = %item.path, guid = %item.guid, "Media item matches pvr");
                report.confirmed += 1;
                continue;
            }

            let preferred = select_preferred(&pvr_item.candidate_guids).ok_or_else(|| {
                ReconcileError::Identifier {
                    path: pvr_item.path.clone(),
                    reason: "pvr item has no candidate guids".to_string(),
                }
            })?;

            debug!(
                library = %library.name,
                path = %item.path,
                plex_guids = ?media_guids,
                pvr_guids = ?pvr_item.candidate_guids,
                "Media item does not match pvr"
            );
            report.actions.push(ReconciliationAction {
                media_item: item.clone(),
                pvr_item: pvr_item.clone(),
                replacement_guid: with_locale(preferred, locale),
            });
        }
    }

    for path in unseen {
        if let Some(pvr_item) = pvr_items.get(path) {
            debug!(pvr = %pvr_item.pvr, path = %pvr_item.path, title = %pvr_item.title, "Pvr item not found in plex");
            report.pvr_only.push(pvr_item.clone());
        }
    }

    Ok(report)
}
