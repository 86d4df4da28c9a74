use std::time::Duration;

use tracing::debug;

use crate::errors::{PipelineError, SearchError};

/// One normalized web search result.
///
/// Result order is citation order: index + 1 is the citation number used in
/// the synthesized answer. Upstream payloads are ragged, so every field
/// defaults to empty rather than failing the whole result list.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub engine: String,
}

/// Search backend abstraction.
///
/// One attempt per call, no retry. Implementations report failures through
/// `SearchError`; the pipeline degrades any failure to an empty source list.
#[async_trait::async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SearchError>;
}

/// Configuration for the SearXNG metasearch client.
#[derive(Clone, Debug)]
pub struct SearxngConfig {
    /// Base URL of the SearXNG instance.
    pub base_url: String,
    /// Backing engines requested for every query.
    pub engines: Vec<String>,
    /// Maximum results retained after truncation.
    pub max_results: usize,
    /// HTTP timeout for the single search attempt.
    pub timeout: Duration,
}

impl SearxngConfig {
    /// Creates a config for the given instance with default engines and limits.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            engines: vec!["google".into(), "bing".into(), "duckduckgo".into()],
            max_results: 10,
            timeout: Duration::from_secs(20),
        }
    }

    /// Overrides the requested engines.
    pub fn engines(mut self, engines: Vec<String>) -> Self {
        self.engines = engines;
        self
    }

    /// Overrides the result cap.
    pub fn max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    /// Overrides the HTTP timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn search_url(&self) -> String {
        format!("{}/search", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, serde::Deserialize)]
struct SearxngResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

/// Search provider backed by a SearXNG instance's JSON API.
pub struct SearxngClient {
    client: reqwest::Client,
    config: SearxngConfig,
}

impl SearxngClient {
    /// Creates a client from explicit configuration.
    pub fn new(config: SearxngConfig) -> Result<Self, PipelineError> {
        if config.base_url.trim().is_empty() {
            return Err(PipelineError::Config(
                "SearXNG base_url must not be empty".into(),
            ));
        }
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PipelineError::Config(format!("failed to build search client: {e}")))?;
        Ok(Self { client, config })
    }
}

#[async_trait::async_trait]
impl SearchProvider for SearxngClient {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SearchError> {
        let response = self
            .client
            .get(self.config.search_url())
            .query(&[
                ("q", query),
                ("format", "json"),
                ("engines", &self.config.engines.join(",")),
            ])
            .send()
            .await
            .map_err(|e| SearchError::transport(format!("search request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::transport(format!(
                "search request failed with status {status}"
            )));
        }

        let payload: SearxngResponse = response
            .json()
            .await
            .map_err(|e| SearchError::malformed(format!("search payload undecodable: {e}")))?;

        let mut results = payload.results;
        results.truncate(self.config.max_results);
        debug!(result_count = results.len(), "search completed");
        Ok(results)
    }
}
