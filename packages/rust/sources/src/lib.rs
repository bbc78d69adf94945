//! Candidate sources: where raw event records come from.
//!
//! This crate provides:
//! - [`CandidateSource`]: the async seam every source implements
//! - [`CuratedSource`]: the built-in list of major AI events
//! - [`FileSource`]: a local JSON file of candidate records
//! - [`FeedSource`]: an HTTP(S) endpoint returning candidate records as JSON
//! - [`collect_candidates`]: fetch every source, isolating failures
//!
//! Sources never normalize or deduplicate; they hand over a finite list of
//! [`RawCandidate`]s and the merge engine does the rest.

pub mod curated;
pub mod feed;
pub mod file;

use aievents_shared::{CatalogError, RawCandidate, Result};
use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, instrument, warn};

pub use curated::CuratedSource;
pub use feed::FeedSource;
pub use file::FileSource;

/// A provider of raw candidate records.
#[async_trait]
pub trait CandidateSource: Send + Sync {
    /// Short name for logs and warnings (e.g., `curated`, a file path, a URL).
    fn name(&self) -> &str;

    /// Fetch the full list of candidates. Must finish in bounded time.
    async fn fetch(&self) -> Result<Vec<RawCandidate>>;
}

/// A source that could not be fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFailure {
    pub source: String,
    pub message: String,
}

/// Candidates gathered from all sources, in source order.
#[derive(Debug, Default)]
pub struct CollectedCandidates {
    pub candidates: Vec<RawCandidate>,
    pub failures: Vec<SourceFailure>,
}

/// Fetch every source in order. A failing source is logged and recorded;
/// the remaining sources still contribute.
#[instrument(skip_all, fields(sources = sources.len()))]
pub async fn collect_candidates(sources: &[Box<dyn CandidateSource>]) -> CollectedCandidates {
    let mut collected = CollectedCandidates::default();

    for source in sources {
        match source.fetch().await {
            Ok(candidates) => {
                info!(source = source.name(), count = candidates.len(), "source fetched");
                collected.candidates.extend(candidates);
            }
            Err(e) => {
                warn!(source = source.name(), error = %e, "source failed, skipping");
                collected.failures.push(SourceFailure {
                    source: source.name().to_string(),
                    message: e.to_string(),
                });
            }
        }
    }

    collected
}

/// Decode a candidate payload: a JSON array of records, or an object with an
/// `events` array. Non-object entries are skipped with a warning.
pub fn parse_candidates(source_name: &str, bytes: &[u8]) -> Result<Vec<RawCandidate>> {
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|e| CatalogError::source(source_name, format!("invalid JSON: {e}")))?;

    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut obj) => match obj.remove("events") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(CatalogError::source(
                    source_name,
                    "expected a JSON array or an object with an `events` array",
                ));
            }
        },
        _ => {
            return Err(CatalogError::source(
                source_name,
                "expected a JSON array or an object with an `events` array",
            ));
        }
    };

    let mut candidates = Vec::with_capacity(items.len());
    for (i, item) in items.into_iter().enumerate() {
        match item {
            Value::Object(map) => candidates.push(RawCandidate::from(map)),
            other => warn!(
                source = source_name,
                index = i,
                kind = json_kind(&other),
                "skipping non-object record"
            ),
        }
    }
    Ok(candidates)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
