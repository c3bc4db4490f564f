use chrono::{DateTime, Utc};
use media_match_models::{LibraryItems, ReconciliationAction};
use media_match_sources::{MediaServer, Pvr};
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, info, instrument};

use crate::aggregate::{fetch_pvr_items, CatalogAggregator};
use crate::duplicates::{find_duplicates, Splitter};
use crate::executor::ActionExecutor;
use crate::matcher::reconcile;
use crate::{Pacer, ReconcileError, RunOptions};

/// Totals of one reconciliation run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub dry_run: bool,
    pub libraries: Vec<String>,
    pub pvrs: Vec<String>,
    /// Media items compared, after any split
    pub media_items: usize,
    pub duplicates_split: usize,
    /// PVR items kept after path de-duplication
    pub pvr_items: usize,
    pub pvr_rejected: usize,
    pub confirmed: usize,
    pub mismatched: usize,
    pub media_only: usize,
    pub pvr_only: usize,
    pub fixed: usize,
    pub simulated: usize,
    pub actions: Vec<ReconciliationAction>,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
}

/// Runs aggregate, split, match and fix against one media server
///
/// The aggregator's library list is reused for every pass of the run.
pub struct Reconciler<'a> {
    aggregator: &'a CatalogAggregator<'a>,
    server: &'a dyn MediaServer,
    pvrs: &'a [Box<dyn Pvr>],
    pacer: &'a dyn Pacer,
    options: RunOptions,
}

impl<'a> Reconciler<'a> {
    pub fn new(
        aggregator: &'a CatalogAggregator<'a>,
        server: &'a dyn MediaServer,
        pvrs: &'a [Box<dyn Pvr>],
        pacer: &'a dyn Pacer,
        options: RunOptions,
    ) -> Self {
        Self {
            aggregator,
            server,
            pvrs,
            pacer,
            options,
        }
    }

    fn pvr_names(&self) -> Vec<String> {
        self.pvrs.iter().map(|p| p.name().to_string()).collect()
    }

    #[instrument(skip(self), fields(pvrs = ?self.pvr_names(), dry_run = self.options.dry_run))]
    pub async fn run(&self, library_names: &[String]) -> Result<RunSummary, ReconcileError> {
        let started_at = Utc::now();
        let start = Instant::now();

        info!(operation = "reconcile_start", libraries = ?library_names, "Starting reconciliation");

        if self.pvrs.is_empty() {
            return Err(ReconcileError::Config("at least one pvr is required".to_string()));
        }

        let aggregator = self.aggregator;
        self.validate_library_types(aggregator, library_names)?;

        self.server.check_available().await?;

        let mut libraries = aggregator.fetch_media_libraries(library_names)?;

        let splitter = Splitter::new(self.server, self.pacer, &self.options);
        let duplicates_split = splitter.split_libraries(&libraries).await?;

        // A dry run keeps the merged items and matches each by its own path,
        // which is what a successful split would leave behind
        if duplicates_split > 0 && !self.options.dry_run {
            info!(
                delay_secs = self.options.rescan_delay.as_secs(),
                "Waiting for plex to rescan split items"
            );
            self.pacer.pause(self.options.rescan_delay).await;
            libraries = aggregator.fetch_media_libraries(library_names)?;
            ensure_no_duplicates(&libraries)?;
        }

        let partition = fetch_pvr_items(self.pvrs).await?;
        let report = reconcile(&libraries, &partition.accepted, &self.options.locale)?;

        info!(
            operation = "match",
            confirmed = report.confirmed,
            mismatched = report.actions.len(),
            media_only = report.media_only.len(),
            pvr_only = report.pvr_only.len(),
            "Compared plex and pvr items"
        );

        let executor = ActionExecutor::new(self.server, self.pacer, &self.options);
        let execution = executor.apply(&report.actions).await?;

        let summary = RunSummary {
            dry_run: self.options.dry_run,
            libraries: libraries.iter().map(|l| l.name.clone()).collect(),
            pvrs: self.pvr_names(),
            media_items: libraries.iter().map(|l| l.items.len()).sum(),
            duplicates_split,
            pvr_items: partition.accepted.len(),
            pvr_rejected: partition.rejected.len(),
            confirmed: report.confirmed,
            mismatched: report.actions.len(),
            media_only: report.media_only.len(),
            pvr_only: report.pvr_only.len(),
            fixed: execution.fixed,
            simulated: execution.simulated,
            actions: report.actions,
            started_at,
            duration_ms: start.elapsed().as_millis() as u64,
        };

        info!(
            operation = "reconcile_complete",
            fixed = summary.fixed,
            simulated = summary.simulated,
            duration_ms = summary.duration_ms,
            "Finished reconciliation"
        );

        Ok(summary)
    }

    /// Every chosen PVR must manage every requested library's type
    fn validate_library_types(
        &self,
        aggregator: &CatalogAggregator<'_>,
        library_names: &[String],
    ) -> Result<(), ReconcileError> {
        for name in library_names {
            let library = aggregator.resolve_library(name)?;
            for pvr in self.pvrs {
                if pvr.library_type() != library.library_type {
                    return Err(ReconcileError::Config(format!(
                        "pvr {:?} only supports {} libraries, {:?} is a {} library",
                        pvr.name(),
                        pvr.library_type(),
                        library.name,
                        library.library_type
                    )));
                }
            }
            debug!(library = %library.name, library_type = %library.library_type, "Library type accepted");
        }

        Ok(())
    }
}

fn ensure_no_duplicates(libraries: &[LibraryItems]) -> Result<(), ReconcileError> {
    for library in libraries {
        let remaining = find_duplicates(&library.items).len();
        if remaining > 0 {
            return Err(ReconcileError::DuplicatesRemain {
                library: library.name.clone(),
                count: remaining,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{media_item, movie_record, pvr_record, FakePvr, FakeServer, FakeStore, RecordingPacer, ServerCall};
    use media_match_models::LibraryType;
    use std::time::Duration;

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn live() -> RunOptions {
        RunOptions {
            action_delay: Duration::from_secs(15),
            rescan_delay: Duration::from_secs(10),
            ..RunOptions::default()
        }
    }

    fn dry_run() -> RunOptions {
        RunOptions {
            dry_run: true,
            ..live()
        }
    }

    fn tv_store() -> FakeStore {
        FakeStore::new().with_library(
            1,
            "TV",
            LibraryType::Tv,
            vec![
                media_item(1, "/m/a.mkv", 10, "com.plexapp.agents.thetvdb://1"),
                media_item(1, "/m/b.mkv", 11, "com.plexapp.agents.thetvdb://7?lang=en"),
                media_item(1, "/m/only-plex.mkv", 12, "com.plexapp.agents.thetvdb://8?lang=en"),
            ],
        )
    }

    fn tv_pvrs() -> Vec<Box<dyn Pvr>> {
        vec![Box::new(FakePvr::tv(
            "sonarr",
            vec![
                pvr_record("A", "/m/a.mkv", 2),
                pvr_record("B", "/m/b.mkv", 7),
                pvr_record("Only Sonarr", "/m/only-sonarr.mkv", 9),
            ],
        ))]
    }

    #[tokio::test]
    async fn test_run_fixes_mismatch() {
        let store = tv_store();
        let server = FakeServer::new();
        let pacer = RecordingPacer::default();
        let aggregator = CatalogAggregator::new(&store).unwrap();
        let pvrs = tv_pvrs();

        let summary = Reconciler::new(&aggregator, &server, &pvrs, &pacer, live())
            .run(&names(&["tv"]))
            .await
            .unwrap();

        assert_eq!(summary.media_items, 3);
        assert_eq!(summary.pvr_items, 3);
        assert_eq!(summary.confirmed, 1);
        assert_eq!(summary.mismatched, 1);
        assert_eq!(summary.media_only, 1);
        assert_eq!(summary.pvr_only, 1);
        assert_eq!(summary.fixed, 1);
        assert_eq!(summary.duplicates_split, 0);
        assert_eq!(
            server.calls(),
            vec![
                ServerCall::CheckAvailable,
                ServerCall::Match {
                    metadata_id: 10,
                    title: "A".to_string(),
                    guid: "com.plexapp.agents.thetvdb://2?lang=en".to_string(),
                },
            ]
        );
        assert!(pacer.pauses().is_empty());
    }

    #[tokio::test]
    async fn test_dry_run_matches_live_counts() {
        let live_store = tv_store();
        let live_server = FakeServer::new();
        let live_pacer = RecordingPacer::default();
        let live_aggregator = CatalogAggregator::new(&live_store).unwrap();
        let pvrs = tv_pvrs();
        let live_summary = Reconciler::new(&live_aggregator, &live_server, &pvrs, &live_pacer, live())
            .run(&names(&["TV"]))
            .await
            .unwrap();

        let store = tv_store();
        let server = FakeServer::new();
        let aggregator = CatalogAggregator::new(&store).unwrap();
        let pacer = RecordingPacer::default();
        let summary = Reconciler::new(&aggregator, &server, &pvrs, &pacer, dry_run())
            .run(&names(&["TV"]))
            .await
            .unwrap();

        assert!(summary.dry_run);
        assert!(server.mutations().is_empty());
        assert!(pacer.pauses().is_empty());
        assert_eq!(summary.mismatched, live_summary.mismatched);
        assert_eq!(summary.confirmed, live_summary.confirmed);
        assert_eq!(summary.media_only, live_summary.media_only);
        assert_eq!(summary.pvr_only, live_summary.pvr_only);
        assert_eq!(summary.simulated, live_summary.fixed);
        assert_eq!(summary.actions, live_summary.actions);
    }

    #[tokio::test]
    async fn test_split_then_reaggregate() {
        let store = FakeStore::new()
            .with_library(
                2,
                "Movies",
                LibraryType::Movie,
                vec![
                    media_item(2, "/m/a-cd1.mkv", 5, "com.plexapp.agents.imdb://tt1?lang=en"),
                    media_item(2, "/m/a-cd2.mkv", 5, "com.plexapp.agents.imdb://tt1?lang=en"),
                ],
            )
            .then_items(
                2,
                vec![
                    media_item(2, "/m/a-cd1.mkv", 5, "com.plexapp.agents.imdb://tt1?lang=en"),
                    media_item(2, "/m/a-cd2.mkv", 6, "com.plexapp.agents.none://x"),
                ],
            );
        let server = FakeServer::new();
        let pacer = RecordingPacer::default();
        let aggregator = CatalogAggregator::new(&store).unwrap();
        let pvrs: Vec<Box<dyn Pvr>> = vec![Box::new(FakePvr::movie(
            "radarr",
            vec![
                movie_record("A", "/m/a-cd1.mkv", "tt1", 100),
                movie_record("A Part 2", "/m/a-cd2.mkv", "tt2", 200),
            ],
        ))];

        let summary = Reconciler::new(&aggregator, &server, &pvrs, &pacer, live())
            .run(&names(&["movies"]))
            .await
            .unwrap();

        assert_eq!(store.reads(), vec![2, 2]);
        assert_eq!(summary.duplicates_split, 1);
        assert_eq!(summary.media_items, 2);
        assert_eq!(summary.confirmed, 1);
        assert_eq!(
            server.mutations(),
            vec![
                ServerCall::Split(5),
                ServerCall::Match {
                    metadata_id: 6,
                    title: "A Part 2".to_string(),
                    guid: "com.plexapp.agents.imdb://tt2?lang=en".to_string(),
                },
            ]
        );
        assert_eq!(pacer.pauses(), vec![Duration::from_secs(10)]);
    }

    #[tokio::test]
    async fn test_duplicates_remaining_after_split_abort() {
        let items = vec![
            media_item(2, "/m/a-cd1.mkv", 5, "com.plexapp.agents.imdb://tt1"),
            media_item(2, "/m/a-cd2.mkv", 5, "com.plexapp.agents.imdb://tt1"),
        ];
        let store = FakeStore::new().with_library(2, "Movies", LibraryType::Movie, items);
        let server = FakeServer::new();
        let pacer = RecordingPacer::default();
        let aggregator = CatalogAggregator::new(&store).unwrap();
        let pvrs: Vec<Box<dyn Pvr>> = vec![Box::new(FakePvr::movie(
            "radarr",
            vec![movie_record("A", "/m/a-cd1.mkv", "tt1", 100)],
        ))];

        let err = Reconciler::new(&aggregator, &server, &pvrs, &pacer, live())
            .run(&names(&["Movies"]))
            .await
            .unwrap_err();

        assert!(matches!(err, ReconcileError::DuplicatesRemain { count: 1, .. }));
        assert_eq!(server.mutations(), vec![ServerCall::Split(5)]);
    }

    fn merged_movie_store() -> FakeStore {
        FakeStore::new()
            .with_library(
                2,
                "Movies",
                LibraryType::Movie,
                vec![
                    media_item(2, "/m/a-cd1.mkv", 5, "com.plexapp.agents.imdb://tt1?lang=en"),
                    media_item(2, "/m/a-cd2.mkv", 5, "com.plexapp.agents.imdb://tt1?lang=en"),
                ],
            )
            .then_items(
                2,
                vec![
                    media_item(2, "/m/a-cd1.mkv", 5, "com.plexapp.agents.imdb://tt1?lang=en"),
                    media_item(2, "/m/a-cd2.mkv", 6, "com.plexapp.agents.imdb://tt1?lang=en"),
                ],
            )
    }

    fn two_part_radarr() -> Vec<Box<dyn Pvr>> {
        vec![Box::new(FakePvr::movie(
            "radarr",
            vec![
                movie_record("A", "/m/a-cd1.mkv", "tt1", 100),
                movie_record("A Part 2", "/m/a-cd2.mkv", "tt2", 200),
            ],
        ))]
    }

    #[tokio::test]
    async fn test_dry_run_with_duplicates_matches_live_counts() {
        let pvrs = two_part_radarr();

        let live_store = merged_movie_store();
        let live_server = FakeServer::new();
        let live_pacer = RecordingPacer::default();
        let live_aggregator = CatalogAggregator::new(&live_store).unwrap();
        let live_summary = Reconciler::new(&live_aggregator, &live_server, &pvrs, &live_pacer, live())
            .run(&names(&["Movies"]))
            .await
            .unwrap();

        let store = merged_movie_store();
        let server = FakeServer::new();
        let pacer = RecordingPacer::default();
        let aggregator = CatalogAggregator::new(&store).unwrap();
        let summary = Reconciler::new(&aggregator, &server, &pvrs, &pacer, dry_run())
            .run(&names(&["Movies"]))
            .await
            .unwrap();

        assert_eq!(live_summary.mismatched, 1);
        assert_eq!(summary.duplicates_split, live_summary.duplicates_split);
        assert_eq!(summary.media_items, live_summary.media_items);
        assert_eq!(summary.mismatched, live_summary.mismatched);
        assert_eq!(summary.confirmed, live_summary.confirmed);
        assert_eq!(summary.media_only, live_summary.media_only);
        assert_eq!(summary.pvr_only, live_summary.pvr_only);
        assert_eq!(summary.simulated, live_summary.fixed);
        assert_eq!(summary.actions[0].media_item.path, "/m/a-cd2.mkv");
        assert_eq!(summary.actions[0].replacement_guid, "com.plexapp.agents.imdb://tt2?lang=en");

        assert_eq!(store.reads(), vec![2]);
        assert!(server.mutations().is_empty());
        assert!(pacer.pauses().is_empty());
    }

    #[tokio::test]
    async fn test_library_list_read_once_per_run() {
        let store = merged_movie_store();
        let server = FakeServer::new();
        let pacer = RecordingPacer::default();
        let aggregator = CatalogAggregator::new(&store).unwrap();
        let pvrs = two_part_radarr();

        Reconciler::new(&aggregator, &server, &pvrs, &pacer, live())
            .run(&names(&["Movies"]))
            .await
            .unwrap();

        assert_eq!(store.reads(), vec![2, 2]);
        assert_eq!(store.library_lists(), 1);
    }

    #[tokio::test]
    async fn test_match_failure_is_fatal() {
        let store = FakeStore::new().with_library(
            1,
            "TV",
            LibraryType::Tv,
            vec![
                media_item(1, "/tv/A", 10, "com.plexapp.agents.thetvdb://1"),
                media_item(1, "/tv/B", 11, "com.plexapp.agents.thetvdb://2"),
            ],
        );
        let server = FakeServer::failing_match(10);
        let pacer = RecordingPacer::default();
        let aggregator = CatalogAggregator::new(&store).unwrap();
        let pvrs: Vec<Box<dyn Pvr>> = vec![Box::new(FakePvr::tv(
            "sonarr",
            vec![pvr_record("A", "/tv/A", 3), pvr_record("B", "/tv/B", 4)],
        ))];

        let err = Reconciler::new(&aggregator, &server, &pvrs, &pacer, live())
            .run(&names(&["TV"]))
            .await
            .unwrap_err();

        assert!(matches!(err, ReconcileError::Match { metadata_id: 10, .. }));
        assert_eq!(server.mutations().len(), 1);
    }

    #[tokio::test]
    async fn test_config_errors_before_network() {
        let store = tv_store();
        let server = FakeServer::new();
        let pacer = RecordingPacer::default();
        let aggregator = CatalogAggregator::new(&store).unwrap();
        let radarr: Vec<Box<dyn Pvr>> = vec![Box::new(FakePvr::movie("radarr", vec![]))];

        let err = Reconciler::new(&aggregator, &server, &radarr, &pacer, live())
            .run(&names(&["TV"]))
            .await
            .unwrap_err();
        assert!(matches!(err, ReconcileError::Config(_)));

        let pvrs = tv_pvrs();
        let err = Reconciler::new(&aggregator, &server, &pvrs, &pacer, live())
            .run(&names(&["Anime"]))
            .await
            .unwrap_err();
        assert!(matches!(err, ReconcileError::Config(_)));

        assert!(server.calls().is_empty());
        assert!(store.reads().is_empty());
    }

    #[tokio::test]
    async fn test_unavailable_server_aborts_before_reading() {
        let store = tv_store();
        let server = FakeServer::unavailable();
        let pacer = RecordingPacer::default();
        let aggregator = CatalogAggregator::new(&store).unwrap();
        let pvrs = tv_pvrs();

        let err = Reconciler::new(&aggregator, &server, &pvrs, &pacer, live())
            .run(&names(&["TV"]))
            .await
            .unwrap_err();

        match err {
            ReconcileError::Source(source) => assert!(source.is_unavailable()),
            other => panic!("unexpected error: {}", other),
        }
        assert!(store.reads().is_empty());
    }
}
