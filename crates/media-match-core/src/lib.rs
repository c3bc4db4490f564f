pub mod aggregate;
pub mod duplicates;
pub mod error;
pub mod executor;
pub mod identifiers;
pub mod matcher;
pub mod options;
pub mod pacing;
pub mod pipeline;
pub mod rewrite;

#[cfg(test)]
mod testing;

pub use aggregate::{CatalogAggregator, PathPartition, build_pvr_items, fetch_pvr_items, partition_by_path};
pub use duplicates::{Splitter, find_duplicates};
pub use error::ReconcileError;
pub use executor::{ActionExecutor, ExecutionReport};
pub use identifiers::{Authority, expand_catalog_guid, normalize_external_id, select_preferred, with_locale};
pub use matcher::{MatchReport, reconcile};
pub use options::RunOptions;
pub use pacing::{Pacer, TokioPacer};
pub use pipeline::{Reconciler, RunSummary};
pub use rewrite::PathRewriter;
