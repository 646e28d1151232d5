//! Tavily search provider.
//!
//! Single request/response. The API key travels in the JSON body, not a header.

use async_trait::async_trait;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::inference::ProviderError;
use crate::search::{SearchProvider, SearchResult};

pub const DEFAULT_TAVILY_BASE_URL: &str = "https://api.tavily.com";
pub const DEFAULT_MAX_RESULTS: u32 = 5;

const FALLBACK_ERROR_MESSAGE: &str = "Tavily API error";

// ============================================================================
// Tavily API Types
// ============================================================================

#[derive(Serialize, Debug)]
struct SearchRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    max_results: u32,
    include_images: bool,
    include_raw_content: bool,
}

#[derive(Deserialize, Debug)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
    /// Reported as a number or a string depending on API version; only logged.
    #[serde(default)]
    response_time: Option<serde_json::Value>,
}

/// Extracts the provider's message: `{"error": "..."}` or `{"detail": {"error": "..."}}`.
fn error_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return FALLBACK_ERROR_MESSAGE.to_string();
    };
    value
        .get("error")
        .and_then(|e| e.as_str())
        .or_else(|| value.pointer("/detail/error").and_then(|e| e.as_str()))
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| FALLBACK_ERROR_MESSAGE.to_string())
}

// ============================================================================
// Provider Implementation
// ============================================================================

/// Request knobs sent with every search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchOptions {
    pub max_results: u32,
    pub include_images: bool,
    pub include_raw_content: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_RESULTS,
            include_images: false,
            include_raw_content: false,
        }
    }
}

pub struct TavilyProvider {
    api_key: Option<String>,
    base_url: String,
    options: SearchOptions,
    client: reqwest::Client,
}

impl TavilyProvider {
    /// Creates a new Tavily provider. A missing key is reported on first search.
    pub fn new(api_key: Option<String>, base_url: Option<String>, options: SearchOptions) -> Self {
        Self {
            api_key,
            base_url: base_url.unwrap_or_else(|| DEFAULT_TAVILY_BASE_URL.to_string()),
            options,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl SearchProvider for TavilyProvider {
    fn name(&self) -> &str {
        "tavily"
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, ProviderError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ProviderError::Config("TAVILY_API_KEY not configured".to_string()))?;

        let request = SearchRequest {
            api_key,
            query,
            max_results: self.options.max_results,
            include_images: self.options.include_images,
            include_raw_content: self.options.include_raw_content,
        };

        info!(
            "Tavily search: query_len={}, max_results={}",
            query.len(),
            request.max_results
        );

        let response = self
            .client
            .post(format!("{}/search", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        debug!("Tavily response status: {}", response.status());

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let err_body = response.text().await.unwrap_or_default();
            warn!("Tavily API error: {} - {}", status, err_body);
            return Err(ProviderError::Api {
                status,
                message: error_message(&err_body),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;
        let parsed: SearchResponse =
            serde_json::from_str(&body).map_err(|e| ProviderError::Parse(e.to_string()))?;

        info!(
            "Tavily returned {} results (response_time={:?})",
            parsed.results.len(),
            parsed.response_time
        );
        Ok(parsed.results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serializes_expected_fields() {
        let options = SearchOptions::default();
        let request = SearchRequest {
            api_key: "tvly-test",
            query: "latest rust release",
            max_results: options.max_results,
            include_images: options.include_images,
            include_raw_content: options.include_raw_content,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "api_key": "tvly-test",
                "query": "latest rust release",
                "max_results": 5,
                "include_images": false,
                "include_raw_content": false,
            })
        );
    }

    #[test]
    fn test_response_parses_results() {
        let body = r#"{
            "query": "q",
            "results": [
                {"title": "Rust 1.80", "url": "https://blog.rust-lang.org", "content": "Released", "score": 0.91}
            ],
            "response_time": 1.23
        }"#;
        let parsed: SearchResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.results.len(), 1);
        assert_eq!(parsed.results[0].title, "Rust 1.80");
        assert_eq!(parsed.results[0].score, 0.91);
    }

    #[test]
    fn test_error_message_shapes() {
        assert_eq!(error_message(r#"{"error":"Invalid key"}"#), "Invalid key");
        assert_eq!(
            error_message(r#"{"detail":{"error":"Unauthorized: missing or invalid API key."}}"#),
            "Unauthorized: missing or invalid API key."
        );
        assert_eq!(error_message("not json"), "Tavily API error");
        assert_eq!(error_message(r#"{"status":500}"#), "Tavily API error");
    }

    #[tokio::test]
    async fn test_missing_key_fails_on_first_use() {
        let provider = TavilyProvider::new(None, None, SearchOptions::default());
        let err = provider.search("anything").await.unwrap_err();
        assert_eq!(
            err,
            ProviderError::Config("TAVILY_API_KEY not configured".to_string())
        );
    }
}
