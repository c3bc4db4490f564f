pub mod error;
pub mod factory;
pub mod plex;
pub mod pvr;
pub mod traits;

pub use error::SourceError;
pub use factory::{PvrFactory, PvrFactoryRegistry};
pub use plex::{PlexClient, PlexDatastore};
pub use pvr::{RadarrClient, SonarrClient};
pub use traits::{CatalogStore, MediaServer, Pvr};
