//! Image search provider seam.
//!
//! Carried in `AppState` as `Arc<dyn SearchProvider>` so handlers can be
//! exercised against an in-memory provider.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One search hit. Field names mirror the provider's JSON so results pass
/// through to the browser unchanged.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ImageResult {
    #[serde(default)]
    pub title: String,
    /// Direct URL of the full-size image.
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub thumbnail: String,
    /// Page the image was found on.
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub source: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SafeSearch {
    On,
    Moderate,
    Off,
}

impl SafeSearch {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "on" | "strict" => Some(SafeSearch::On),
            "moderate" => Some(SafeSearch::Moderate),
            "off" => Some(SafeSearch::Off),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Search API error (status {status})")]
    Api { status: u16 },

    #[error("Could not obtain a search token for '{0}'")]
    MissingToken(String),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Keyword image search. Implement this to swap backends without touching handlers.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Returns up to `max_results` hits for `keywords`, in provider order.
    async fn search(&self, keywords: &str, max_results: usize)
        -> Result<Vec<ImageResult>, SearchError>;
}
