use media_match_models::{LibraryItems, MediaItem};
use media_match_sources::MediaServer;
use std::collections::HashSet;
use tracing::{debug, info};

use crate::{Pacer, ReconcileError, RunOptions};

/// Items whose metadata id was already seen earlier in `items`
///
/// The first occurrence of an id is the keeper and is never returned, so
/// `n` items sharing an id yield exactly `n - 1` duplicates.
pub fn find_duplicates(items: &[MediaItem]) -> Vec<&MediaItem> {
    let mut seen = HashSet::new();
    items.iter().filter(|item| !seen.insert(item.metadata_id)).collect()
}

/// Asks the media server to break up wrongly merged metadata items
pub struct Splitter<'a> {
    server: &'a dyn MediaServer,
    pacer: &'a dyn Pacer,
    options: &'a RunOptions,
}

impl<'a> Splitter<'a> {
    pub fn new(server: &'a dyn MediaServer, pacer: &'a dyn Pacer, options: &'a RunOptions) -> Self {
        Self { server, pacer, options }
    }

    /// Split every flagged item of `library`, returning how many splits
    /// were requested (or simulated)
    pub async fn split_all(&self, library: &str, duplicates: &[&MediaItem]) -> Result<usize, ReconcileError> {
        let mut live_calls = 0;

        for item in duplicates {
            if self.options.dry_run {
                info!(
                    operation = "split",
                    dry_run = true,
                    library,
                    path = %item.path,
                    metadata_id = item.metadata_id,
                    "Would split duplicate item"
                );
                continue;
            }

            if live_calls > 0 {
                self.pacer.pause(self.options.action_delay).await;
            }

            self.server
                .split(item.metadata_id)
                .await
                .map_err(|source| ReconcileError::Split {
                    library: library.to_string(),
                    path: item.path.clone(),
                    metadata_id: item.metadata_id,
                    source,
                })?;
            live_calls += 1;

            info!(
                operation = "split",
                library,
                path = %item.path,
                metadata_id = item.metadata_id,
                "Split duplicate item"
            );
        }

        Ok(duplicates.len())
    }

    /// Find and split the duplicates of every library, in order
    pub async fn split_libraries(&self, libraries: &[LibraryItems]) -> Result<usize, ReconcileError> {
        let mut total = 0;

        for library in libraries {
            let duplicates = find_duplicates(&library.items);
            if duplicates.is_empty() {
                debug!(library = %library.name, "No duplicate items");
                continue;
            }

            info!(library = %library.name, duplicates = duplicates.len(), "Found duplicate items");
            if total > 0 && !self.options.dry_run {
                self.pacer.pause(self.options.action_delay).await;
            }
            total += self.split_all(&library.name, &duplicates).await?;
        }

        Ok(total)
    }
}
