use serde::Serialize;

use crate::{MediaItem, PvrItem};

/// A re-match the media server should perform
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ReconciliationAction {
    pub media_item: MediaItem,
    pub pvr_item: PvrItem,
    /// Preferred PVR GUID with the locale suffix applied
    pub replacement_guid: String,
}
