//! Catalog update flow: load the published catalog, gather candidates from
//! every configured source, merge, and report whether anything changed.
//!
//! The catalog is loaded before any source is fetched, so a corrupt store
//! aborts the run without doing network work and without writing.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use tracing::{info, instrument};

use aievents_shared::Result;
use aievents_sources::{CandidateSource, SourceFailure, collect_candidates};
use aievents_storage::{CatalogBackend, CatalogStore, JsonFileBackend};

use crate::merge::{CandidateWarning, merge};
use crate::pipeline::ProgressReporter;

// ---------------------------------------------------------------------------
// Update config & result
// ---------------------------------------------------------------------------

/// Configuration for the `update_catalog` pipeline.
#[derive(Debug, Clone)]
pub struct UpdateCatalogConfig {
    /// Path of the published catalog document.
    pub store_path: PathBuf,
}

/// Result of the `update_catalog` pipeline.
#[derive(Debug, Clone)]
pub struct UpdateCatalogResult {
    /// Net-new events added.
    pub added: usize,
    /// Catalog size after the run.
    pub total: usize,
    /// Candidates already present.
    pub duplicates: usize,
    /// Names of the added events.
    pub added_names: Vec<String>,
    /// Candidates rejected by normalization.
    pub warnings: Vec<CandidateWarning>,
    /// Sources that could not be fetched.
    pub source_failures: Vec<SourceFailure>,
    /// Earliest and latest event dates in the catalog.
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    /// Total elapsed time.
    pub elapsed: Duration,
}

impl UpdateCatalogResult {
    /// Whether the published catalog changed.
    pub fn changed(&self) -> bool {
        self.added > 0
    }
}

// ---------------------------------------------------------------------------
// Update pipeline
// ---------------------------------------------------------------------------

/// Run the update pipeline against the catalog file at `config.store_path`.
#[instrument(skip_all, fields(store = %config.store_path.display()))]
pub async fn update_catalog(
    config: &UpdateCatalogConfig,
    sources: &[Box<dyn CandidateSource>],
    progress: &dyn ProgressReporter,
) -> Result<UpdateCatalogResult> {
    progress.phase("Loading catalog");
    let mut store = CatalogStore::load(JsonFileBackend::new(&config.store_path))?;
    update_store(&mut store, sources, progress).await
}

/// Run the update pipeline against an already loaded store.
///
/// 1. Fetch candidates from every source (failures are isolated per source)
/// 2. Merge them into the store (saves only if something was added)
/// 3. Summarize the run
pub async fn update_store<B: CatalogBackend>(
    store: &mut CatalogStore<B>,
    sources: &[Box<dyn CandidateSource>],
    progress: &dyn ProgressReporter,
) -> Result<UpdateCatalogResult> {
    let start = Instant::now();

    progress.phase("Fetching candidates");
    let collected = collect_candidates(sources).await;
    progress.candidates_collected(collected.candidates.len(), collected.failures.len());

    progress.phase("Merging");
    let outcome = merge(store, &collected.candidates)?;

    let date_range = match (store.events().first(), store.events().last()) {
        (Some(first), Some(last)) => Some((first.date, last.date)),
        _ => None,
    };

    let result = UpdateCatalogResult {
        added: outcome.added,
        total: outcome.total,
        duplicates: outcome.duplicates,
        added_names: outcome.added_names,
        warnings: outcome.warnings,
        source_failures: collected.failures,
        date_range,
        elapsed: start.elapsed(),
    };

    info!(
        added = result.added,
        total = result.total,
        duplicates = result.duplicates,
        rejected = result.warnings.len(),
        failed_sources = result.source_failures.len(),
        elapsed_ms = result.elapsed.as_millis(),
        "update complete"
    );

    progress.done(&result);
    Ok(result)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
