//! Pipeline plumbing shared by entry points: progress reporting and source
//! assembly from configuration.

use url::Url;

use aievents_shared::{CatalogError, Result, SourcesConfig};
use aievents_sources::{CandidateSource, CuratedSource, FeedSource, FileSource};

use crate::update::UpdateCatalogResult;

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called once candidates are gathered, before the merge.
    fn candidates_collected(&self, count: usize, failed_sources: usize);
    /// Called when the pipeline completes.
    fn done(&self, result: &UpdateCatalogResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn candidates_collected(&self, _count: usize, _failed_sources: usize) {}
    fn done(&self, _result: &UpdateCatalogResult) {}
}

/// Build the list of sources a run should fetch, in a fixed order:
/// curated list first, then files, then feeds.
pub fn build_sources(config: &SourcesConfig) -> Result<Vec<Box<dyn CandidateSource>>> {
    let mut sources: Vec<Box<dyn CandidateSource>> = Vec::new();

    if config.curated {
        sources.push(Box::new(CuratedSource::new()));
    }

    for path in &config.files {
        sources.push(Box::new(FileSource::new(path)));
    }

    for feed in &config.feeds {
        let url = Url::parse(feed)
            .map_err(|e| CatalogError::config(format!("invalid feed URL '{feed}': {e}")))?;
        sources.push(Box::new(FeedSource::new(url, config.timeout_secs)?));
    }

    Ok(sources)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_uses_curated_only() {
        let sources = build_sources(&SourcesConfig::default()).unwrap();
        let names: Vec<_> = sources.iter().map(|s| s.name().to_string()).collect();
        assert_eq!(names, ["curated"]);
    }

    #[test]
    fn sources_are_ordered_curated_files_feeds() {
        let config = SourcesConfig {
            curated: true,
            files: vec!["extra.json".into()],
            feeds: vec!["https://example.com/events.json".into()],
            timeout_secs: 5,
        };
        let names: Vec<_> = build_sources(&config)
            .unwrap()
            .iter()
            .map(|s| s.name().to_string())
            .collect();
        assert_eq!(names, ["curated", "extra.json", "https://example.com/events.json"]);
    }

    #[test]
    fn invalid_feed_url_is_config_error() {
        let config = SourcesConfig {
            curated: false,
            feeds: vec!["not a url".into()],
            ..SourcesConfig::default()
        };
        let err = build_sources(&config).err().expect("invalid URL must fail");
        assert!(matches!(err, CatalogError::Config { .. }));
    }
}
