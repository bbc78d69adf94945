//! Built-in curated list of major AI events.
//!
//! The list ships inside the binary as raw candidate records, so it goes
//! through exactly the same normalization as any other source (including
//! placeholder values such as `"N/A"` for optional dates).

use aievents_shared::{RawCandidate, Result};
use async_trait::async_trait;

use crate::{CandidateSource, parse_candidates};

const CURATED_EVENTS: &str = include_str!("../data/curated_events.json");

/// Hand-picked conferences, summits and workshops.
#[derive(Debug, Default, Clone, Copy)]
pub struct CuratedSource;

impl CuratedSource {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CandidateSource for CuratedSource {
    fn name(&self) -> &str {
        "curated"
    }

    async fn fetch(&self) -> Result<Vec<RawCandidate>> {
        parse_candidates(self.name(), CURATED_EVENTS.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn curated_list_parses() {
        let candidates = CuratedSource::new().fetch().await.expect("curated list");
        assert_eq!(candidates.len(), 20);
        assert!(candidates.iter().all(|c| c.get("name").is_some() && c.get("date").is_some()));
    }
}
