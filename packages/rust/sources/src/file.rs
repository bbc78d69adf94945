//! Candidates from a local JSON file.

use std::path::PathBuf;

use aievents_shared::{CatalogError, RawCandidate, Result};
use async_trait::async_trait;

use crate::{CandidateSource, parse_candidates};

/// A JSON file holding an array of candidate records.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    name: String,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path.display().to_string();
        Self { path, name }
    }
}

#[async_trait]
impl CandidateSource for FileSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self) -> Result<Vec<RawCandidate>> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| CatalogError::io(&self.path, e))?;
        parse_candidates(&self.name, &bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reads_candidate_file() {
        let dir = std::env::temp_dir().join(format!("aievents-file-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("candidates.json");
        std::fs::write(
            &path,
            r#"[{"name": "MLOps World 2026", "date": "2026-06-03", "format": "hybrid"}]"#,
        )
        .unwrap();

        let candidates = FileSource::new(&path).fetch().await.expect("fetch");
        assert_eq!(candidates.len(), 1);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let source = FileSource::new("/nonexistent/aievents/candidates.json");
        let err = source.fetch().await.unwrap_err();
        assert!(matches!(err, CatalogError::Io { .. }));
    }
}
