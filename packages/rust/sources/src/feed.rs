//! Candidates from an HTTP(S) JSON feed.
//!
//! The feed must answer with a JSON array of candidate records, or an object
//! carrying them under `events`. Every request is bounded by a timeout and a
//! response size cap so a slow or hostile endpoint cannot stall a run.

use std::time::Duration;

use aievents_shared::{CatalogError, RawCandidate, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument};
use url::Url;

use crate::{CandidateSource, parse_candidates};

/// Maximum number of redirects to follow.
const MAX_REDIRECTS: usize = 3;

/// Default timeout in seconds for a feed request.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Maximum response size we accept (5 MB).
const MAX_RESPONSE_SIZE: u64 = 5 * 1024 * 1024;

/// User-Agent string for feed requests.
const USER_AGENT: &str = concat!("aievents/", env!("CARGO_PKG_VERSION"));

/// A remote JSON feed of candidate records.
#[derive(Debug, Clone)]
pub struct FeedSource {
    url: Url,
    name: String,
    client: Client,
}

impl FeedSource {
    /// Create a feed source. Only `http` and `https` URLs are accepted.
    pub fn new(url: Url, timeout_secs: u64) -> Result<Self> {
        if !matches!(url.scheme(), "http" | "https") {
            return Err(CatalogError::config(format!(
                "feed URL must be http(s), got {url}"
            )));
        }

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| CatalogError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            name: url.to_string(),
            url,
            client,
        })
    }
}

#[async_trait]
impl CandidateSource for FeedSource {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(skip_all, fields(url = %self.url))]
    async fn fetch(&self) -> Result<Vec<RawCandidate>> {
        let url = &self.url;
        let response = self
            .client
            .get(url.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| CatalogError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Network(format!("{url}: HTTP {status}")));
        }

        if let Some(len) = response.content_length() {
            if len > MAX_RESPONSE_SIZE {
                return Err(CatalogError::source(
                    &self.name,
                    format!("response too large ({len} bytes, max {MAX_RESPONSE_SIZE})"),
                ));
            }
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| CatalogError::Network(format!("{url}: failed to read body: {e}")))?;

        if body.len() as u64 > MAX_RESPONSE_SIZE {
            return Err(CatalogError::source(
                &self.name,
                format!("response too large ({} bytes, max {MAX_RESPONSE_SIZE})", body.len()),
            ));
        }

        debug!(bytes = body.len(), "feed body received");
        parse_candidates(&self.name, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn feed_for(server: &wiremock::MockServer, path: &str) -> FeedSource {
        let url = Url::parse(&format!("{}{path}", server.uri())).unwrap();
        FeedSource::new(url, DEFAULT_TIMEOUT_SECS).unwrap()
    }

    #[test]
    fn rejects_non_http_scheme() {
        let url = Url::parse("file:///etc/passwd").unwrap();
        assert!(FeedSource::new(url, DEFAULT_TIMEOUT_SECS).is_err());
    }

    #[tokio::test]
    async fn fetches_array_feed() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/events.json"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string(
                r#"[
                    {"name": "PyTorch Conference 2026", "date": "2026-10-07", "format": "Hybrid"},
                    {"name": "AI LATAM 2026", "date": "2026-11-11", "format": "Hybrid"}
                ]"#,
            ))
            .mount(&server)
            .await;

        let candidates = feed_for(&server, "/events.json").await.fetch().await.unwrap();
        assert_eq!(candidates.len(), 2);
    }

    #[tokio::test]
    async fn http_error_is_network_error() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/events.json"))
            .respond_with(wiremock::ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = feed_for(&server, "/events.json").await.fetch().await.unwrap_err();
        assert!(matches!(err, CatalogError::Network(_)));
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn html_body_is_source_error() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/events.json"))
            .respond_with(
                wiremock::ResponseTemplate::new(200).set_body_string("<html>Events</html>"),
            )
            .mount(&server)
            .await;

        let err = feed_for(&server, "/events.json").await.fetch().await.unwrap_err();
        assert!(matches!(err, CatalogError::Source { .. }));
    }

    #[tokio::test]
    async fn slow_feed_times_out() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/slow.json"))
            .respond_with(
                wiremock::ResponseTemplate::new(200)
                    .set_body_string("[]")
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/slow.json", server.uri())).unwrap();
        let feed = FeedSource::new(url, 1).unwrap();
        let err = feed.fetch().await.unwrap_err();
        assert!(matches!(err, CatalogError::Network(_)));
    }
}
