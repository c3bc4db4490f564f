pub mod action;
pub mod library;
pub mod media;
pub mod pvr;

pub use action::ReconciliationAction;
pub use library::{Library, LibraryItems, LibraryType};
pub use media::MediaItem;
pub use pvr::{ExternalIds, PvrItem, PvrRecord};
