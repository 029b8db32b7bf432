//! Business-search boundary.
//!
//! Wraps the Fusion-style business search endpoint behind the
//! [`SearchClient`] trait: two free-text parameters in, a list of
//! [`Business`] records out. Callers treat every call as fallible; nothing
//! in here may take the hosting process down.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;

/// One search hit. Read-only to callers; the shape mirrors the service's
/// `businesses` array entries.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Business {
    pub name: String,
    #[serde(default)]
    pub rating: f64,
    pub url: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    businesses: Vec<Business>,
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("search service returned status {status}")]
    Status { status: u16 },
    #[error("search response could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
}

#[async_trait]
pub trait SearchClient: Send + Sync {
    async fn search(&self, term: &str, location: &str) -> Result<Vec<Business>, SearchError>;
}

/// HTTP client for the real search service.
pub struct HttpSearchClient {
    client: Client,
    api_key: SecretString,
    base_url: String,
}

impl HttpSearchClient {
    pub fn new(
        api_key: SecretString,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, SearchError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, api_key, base_url: trim_trailing_slash(base_url.into()) })
    }
}

fn trim_trailing_slash(mut url: String) -> String {
    while url.ends_with('/') {
        url.pop();
    }
    url
}

#[async_trait]
impl SearchClient for HttpSearchClient {
    async fn search(&self, term: &str, location: &str) -> Result<Vec<Business>, SearchError> {
        let response = self
            .client
            .get(format!("{}/businesses/search", self.base_url))
            .bearer_auth(self.api_key.expose_secret())
            .query(&[("term", term), ("location", location)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Status { status: status.as_u16() });
        }

        let body = response.text().await?;
        let parsed: SearchResponse = serde_json::from_str(&body)?;
        Ok(parsed.businesses)
    }
}

/// In-memory stand-in: hands back a fixed outcome and records every call.
/// Used by session tests and as the wiring default where no service is
/// reachable.
pub struct StaticSearchClient {
    mode: StaticSearchMode,
    calls: Mutex<Vec<(String, String)>>,
}

enum StaticSearchMode {
    Results(Vec<Business>),
    Unavailable,
}

impl StaticSearchClient {
    pub fn with_results(results: Vec<Business>) -> Self {
        Self { mode: StaticSearchMode::Results(results), calls: Mutex::new(Vec::new()) }
    }

    pub fn empty() -> Self {
        Self::with_results(Vec::new())
    }

    pub fn unavailable() -> Self {
        Self { mode: StaticSearchMode::Unavailable, calls: Mutex::new(Vec::new()) }
    }

    /// Every `(term, location)` pair this client has been asked for, in
    /// call order.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl SearchClient for StaticSearchClient {
    async fn search(&self, term: &str, location: &str) -> Result<Vec<Business>, SearchError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((term.to_owned(), location.to_owned()));
        }

        match &self.mode {
            StaticSearchMode::Results(results) => Ok(results.clone()),
            StaticSearchMode::Unavailable => Err(SearchError::Status { status: 503 }),
        }
    }
}
