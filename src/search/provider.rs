use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::inference::ProviderError;

/// One ranked hit. Consumed once for model context and once for the sources line.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    /// Snippet of the page body.
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub score: f64,
}

#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Returns the name of the provider.
    fn name(&self) -> &str;

    /// Runs a single search request. No retries.
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, ProviderError>;
}
