//! Merge engine: reconcile a batch of candidates against the catalog.
//!
//! For each candidate, in input order: normalize, fingerprint, check the
//! store's index, append on a miss. A candidate that fails normalization is
//! skipped and reported; it never aborts the batch. The store is saved once,
//! and only if something was added.

use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use aievents_shared::{RawCandidate, Result, fingerprint};
use aievents_storage::{CatalogBackend, CatalogStore};

use crate::normalize::normalize;

/// A candidate that was skipped because it could not be normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateWarning {
    /// Position of the candidate in the input batch.
    pub index: usize,
    /// Raw `name` value, when the candidate had a usable one.
    pub name: Option<String>,
    /// Why it was rejected.
    pub message: String,
}

impl std::fmt::Display for CandidateWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.name {
            Some(name) => write!(f, "candidate #{} ({name}): {}", self.index, self.message),
            None => write!(f, "candidate #{}: {}", self.index, self.message),
        }
    }
}

/// Result of merging one batch.
#[derive(Debug, Clone, Default)]
pub struct MergeOutcome {
    /// Net-new events appended to the catalog.
    pub added: usize,
    /// Catalog size after the merge.
    pub total: usize,
    /// Candidates recognized as already present (in the catalog or earlier in the batch).
    pub duplicates: usize,
    /// Names of the added events, in input order.
    pub added_names: Vec<String>,
    /// Candidates rejected by normalization.
    pub warnings: Vec<CandidateWarning>,
}

impl MergeOutcome {
    /// Whether the catalog changed and should be republished.
    pub fn changed(&self) -> bool {
        self.added > 0
    }
}

/// Merge `candidates` into `store`, saving it if any event was added.
///
/// Only store-level failures (a failed save) are returned as errors.
#[instrument(skip_all, fields(candidates = candidates.len(), existing = store.len()))]
pub fn merge<B: CatalogBackend>(
    store: &mut CatalogStore<B>,
    candidates: &[RawCandidate],
) -> Result<MergeOutcome> {
    let mut outcome = MergeOutcome::default();

    for (index, raw) in candidates.iter().enumerate() {
        let event = match normalize(raw) {
            Ok(event) => event,
            Err(e) => {
                let name = raw_name(raw);
                warn!(index, name = name.as_deref().unwrap_or("<unnamed>"), error = %e, "skipping candidate");
                outcome.warnings.push(CandidateWarning {
                    index,
                    name,
                    message: e.to_string(),
                });
                continue;
            }
        };

        let fp = fingerprint(&event);
        if store.contains(&fp) {
            debug!(name = %event.name, date = %event.date, %fp, "duplicate, skipping");
            outcome.duplicates += 1;
            continue;
        }

        info!(name = %event.name, date = %event.date, "adding event");
        outcome.added_names.push(event.name.clone());
        store.append(event);
        outcome.added += 1;
    }

    if outcome.changed() {
        store.save()?;
    } else {
        debug!("nothing new, catalog left untouched");
    }

    outcome.total = store.len();

    info!(
        added = outcome.added,
        duplicates = outcome.duplicates,
        rejected = outcome.warnings.len(),
        total = outcome.total,
        "merge complete"
    );

    Ok(outcome)
}

fn raw_name(raw: &RawCandidate) -> Option<String> {
    match raw.get("name") {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}
