pub mod api;
pub mod datastore;

pub use api::PlexClient;
pub use datastore::PlexDatastore;

/// Prefix of Plex's own agent GUIDs, which can't be compared with PVR ids
pub const INTERNAL_GUID_PREFIX: &str = "plex://";
