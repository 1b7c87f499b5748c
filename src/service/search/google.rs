//! Google Custom Search implementation of the web search tool.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{info, instrument};

use crate::base::{
    config::Config,
    types::{Res, Void},
};

use super::{GenericSearchClient, SearchClient};

const CSE_ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";

/// Number of results requested per query.
const RESULT_COUNT: u8 = 5;

// Extra methods on `SearchClient` applied by the google implementation.

impl SearchClient {
    /// Creates a new Google Custom Search client.
    pub fn google(config: &Config) -> Res<Self> {
        let client = GoogleSearchClient::new(config)?;
        Ok(Self { inner: Arc::new(client) })
    }
}

// Structs.

/// Google Custom Search API response subset.
#[derive(Debug, Deserialize)]
struct CseResponse {
    #[serde(default)]
    items: Vec<CseItem>,
}

/// A single Google Custom Search result item.
#[derive(Debug, Deserialize)]
struct CseItem {
    title: String,
    link: String,
    #[serde(default)]
    snippet: Option<String>,
}

/// Google Custom Search client implementation.
#[derive(Clone)]
pub struct GoogleSearchClient {
    http: reqwest::Client,
    api_key: String,
    cse_id: String,
}

impl GoogleSearchClient {
    /// Create a new Google Custom Search client.
    pub fn new(config: &Config) -> Res<Self> {
        let http = reqwest::Client::builder().build()?;

        Ok(Self {
            http,
            api_key: config.google_api_key.clone(),
            cse_id: config.google_cse_id.clone(),
        })
    }

    /// Check that a response status is usable before parsing the body.
    fn check_status(status: reqwest::StatusCode) -> Void {
        if status.is_success() {
            return Ok(());
        }

        Err(anyhow::anyhow!("Google CSE returned {status}"))
    }
}

#[async_trait]
impl GenericSearchClient for GoogleSearchClient {
    #[instrument(name = "GoogleSearchClient::search", skip(self))]
    async fn search(&self, query: &str) -> Res<String> {
        let response = self
            .http
            .get(CSE_ENDPOINT)
            .query(&[
                ("key", self.api_key.as_str()),
                ("cx", self.cse_id.as_str()),
                ("q", query),
                ("num", &RESULT_COUNT.to_string()),
            ])
            .send()
            .await?;

        Self::check_status(response.status())?;

        let body: CseResponse = response.json().await?;

        info!("Google CSE returned {} results.", body.items.len());

        if body.items.is_empty() {
            return Ok("No results found.".to_string());
        }

        let digest = body
            .items
            .iter()
            .map(|item| {
                let snippet = item.snippet.as_deref().unwrap_or("");
                format!("{} — {} ({})", item.title, snippet, item.link)
            })
            .collect::<Vec<_>>()
            .join("\n");

        Ok(digest)
    }
}

// Tests.

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_response_without_items() {
        // Google omits `items` entirely when nothing matched.
        let body: CseResponse = serde_json::from_str("{}").unwrap();
        assert!(body.items.is_empty());
    }

    #[test]
    fn rejects_error_statuses() {
        assert!(GoogleSearchClient::check_status(reqwest::StatusCode::OK).is_ok());
        assert!(GoogleSearchClient::check_status(reqwest::StatusCode::TOO_MANY_REQUESTS).is_err());
        assert!(GoogleSearchClient::check_status(reqwest::StatusCode::FORBIDDEN).is_err());
    }
}
