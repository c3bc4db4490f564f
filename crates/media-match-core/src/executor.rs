use media_match_models::ReconciliationAction;
use media_match_sources::MediaServer;
use serde::Serialize;
use tracing::info;

use crate::{Pacer, ReconcileError, RunOptions};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExecutionReport {
    /// Re-matches sent to the media server
    pub fixed: usize,
    /// Re-matches only logged because of dry-run
    pub simulated: usize,
}

/// Applies re-matches one at a time, stopping at the first failure
pub struct ActionExecutor<'a> {
    server: &'a dyn MediaServer,
    pacer: &'a dyn Pacer,
    options: &'a RunOptions,
}

impl<'a> ActionExecutor<'a> {
    pub fn new(server: &'a dyn MediaServer, pacer: &'a dyn Pacer, options: &'a RunOptions) -> Self {
        Self { server, pacer, options }
    }

    pub async fn apply(&self, actions: &[ReconciliationAction]) -> Result<ExecutionReport, ReconcileError> {
        let mut report = ExecutionReport::default();

        for action in actions {
            let media = &action.media_item;
            let pvr = &action.pvr_item;

            if self.options.dry_run {
                info!(
                    operation = "match",
                    dry_run = true,
                    plex_path = %media.path,
                    plex_guid = %media.guid,
                    pvr_path = %pvr.path,
                    pvr_guid = %action.replacement_guid,
                    "Would fix match"
                );
                report.simulated += 1;
                continue;
            }

            if report.fixed > 0 {
                self.pacer.pause(self.options.action_delay).await;
            }

            self.server
                .match_item(media.metadata_id, &pvr.title, &action.replacement_guid)
                .await
                .map_err(|source| ReconcileError::Match {
                    path: media.path.clone(),
                    metadata_id: media.metadata_id,
                    guid: action.replacement_guid.clone(),
                    source,
                })?;
            report.fixed += 1;

            info!(
                operation = "match",
                plex_path = %media.path,
                plex_guid = %media.guid,
                pvr_path = %pvr.path,
                pvr_guid = %action.replacement_guid,
                "Fixed match"
            );
        }

        Ok(report)
    }
}
