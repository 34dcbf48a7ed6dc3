//! DuckDuckGo image search client.
//!
//! Two-step protocol: the HTML front page is fetched once per query to obtain a
//! `vqd` token, then the `i.js` JSON endpoint is paged with that token until the
//! requested number of unique results is collected or the provider stops
//! returning a `next` cursor.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::search::provider::{ImageResult, SafeSearch, SearchError, SearchProvider};

const BASE_URL: &str = "https://duckduckgo.com";
/// Hard stop on `i.js` pages per query.
const MAX_PAGES: usize = 5;
const REQUEST_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Deserialize)]
struct ImagesPage {
    #[serde(default)]
    results: Vec<ImageResult>,
    #[serde(default)]
    next: Option<String>,
}

#[derive(Clone)]
pub struct DuckDuckGoClient {
    client: Client,
    base_url: String,
    region: String,
    safesearch: SafeSearch,
}

impl DuckDuckGoClient {
    pub fn new(user_agent: &str, region: &str, safesearch: SafeSearch) -> Result<Self, SearchError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            base_url: BASE_URL.to_string(),
            region: region.to_string(),
            safesearch,
        })
    }

    async fn fetch_token(&self, keywords: &str) -> Result<String, SearchError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("q", keywords)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Api {
                status: status.as_u16(),
            });
        }

        let html = response.text().await?;
        extract_vqd(&html).ok_or_else(|| SearchError::MissingToken(keywords.to_string()))
    }

    async fn fetch_page(
        &self,
        keywords: &str,
        vqd: &str,
        offset: usize,
    ) -> Result<ImagesPage, SearchError> {
        let offset = offset.to_string();
        let response = self
            .client
            .get(format!("{}/i.js", self.base_url))
            .header("Referer", format!("{}/", self.base_url))
            .query(&[
                ("l", self.region.as_str()),
                ("o", "json"),
                ("q", keywords),
                ("vqd", vqd),
                ("f", ",,,,,,"),
                ("p", safesearch_param(self.safesearch)),
                ("s", offset.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Api {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoClient {
    async fn search(
        &self,
        keywords: &str,
        max_results: usize,
    ) -> Result<Vec<ImageResult>, SearchError> {
        let vqd = self.fetch_token(keywords).await?;

        let mut results = Vec::with_capacity(max_results);
        let mut seen = HashSet::new();
        let mut offset = 0;

        for _ in 0..MAX_PAGES {
            let page = self.fetch_page(keywords, &vqd, offset).await?;
            let received = page.results.len();
            collect_unique(&mut results, &mut seen, page.results, max_results);
            debug!(
                "duckduckgo '{}' offset={} received={} total={}",
                keywords,
                offset,
                received,
                results.len()
            );

            if results.len() >= max_results || received == 0 {
                break;
            }
            match page.next.as_deref().and_then(next_offset) {
                Some(next) if next > offset => offset = next,
                _ => break,
            }
        }

        Ok(results)
    }
}

fn safesearch_param(safesearch: SafeSearch) -> &'static str {
    match safesearch {
        SafeSearch::On | SafeSearch::Moderate => "1",
        SafeSearch::Off => "-1",
    }
}

/// Appends results with a non-empty, unseen image URL until `limit` is reached.
fn collect_unique(
    into: &mut Vec<ImageResult>,
    seen: &mut HashSet<String>,
    page: Vec<ImageResult>,
    limit: usize,
) {
    for result in page {
        if into.len() >= limit {
            break;
        }
        if !result.image.is_empty() && seen.insert(result.image.clone()) {
            into.push(result);
        }
    }
}

/// Pulls the `vqd` token out of the DuckDuckGo front page.
fn extract_vqd(html: &str) -> Option<String> {
    const PATTERNS: [(&str, char); 3] = [("vqd=\"", '"'), ("vqd='", '\''), ("vqd=", '&')];

    PATTERNS.iter().find_map(|(start, end)| {
        let begin = html.find(start)? + start.len();
        let rest = &html[begin..];
        let token = &rest[..rest.find(*end)?];
        let valid = !token.is_empty()
            && token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        valid.then(|| token.to_string())
    })
}

/// Reads the `s=` offset from an `i.js` `next` cursor.
fn next_offset(next: &str) -> Option<usize> {
    let query = next.split_once('?').map_or(next, |(_, q)| q);
    query
        .split('&')
        .find_map(|pair| pair.strip_prefix("s="))
        .and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(image: &str) -> ImageResult {
        ImageResult {
            image: image.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_extract_vqd_double_quoted() {
        let html = r#"<script>DDG.deep.initialize('/d.js?q=cats&vqd="4-1234567890_abc"&kl=wt-wt');</script>"#;
        assert_eq!(extract_vqd(html).as_deref(), Some("4-1234567890_abc"));
    }

    #[test]
    fn test_extract_vqd_single_quoted() {
        let html = "nrj('/d.js?q=cats', vqd='4-98765');";
        assert_eq!(extract_vqd(html).as_deref(), Some("4-98765"));
    }

    #[test]
    fn test_extract_vqd_ampersand_terminated() {
        let html = "/i.js?q=cats&vqd=4-555&p=1";
        assert_eq!(extract_vqd(html).as_deref(), Some("4-555"));
    }

    #[test]
    fn test_extract_vqd_missing() {
        assert_eq!(extract_vqd("<html>no token here</html>"), None);
    }

    #[test]
    fn test_next_offset() {
        assert_eq!(next_offset("i.js?q=cats&o=json&p=1&s=100&u=bing"), Some(100));
        assert_eq!(next_offset("i.js?q=cats&o=json"), None);
        assert_eq!(next_offset("s=42"), Some(42));
    }

    #[test]
    fn test_collect_unique_skips_duplicates_and_blank_urls() {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        let page = vec![hit("a"), hit(""), hit("b"), hit("a"), hit("c"), hit("d")];
        collect_unique(&mut out, &mut seen, page, 3);
        let urls: Vec<&str> = out.iter().map(|r| r.image.as_str()).collect();
        assert_eq!(urls, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_images_page_parses_provider_json() {
        let body = r#"{
            "query": "cats",
            "results": [
                {"title": "Cat", "image": "https://img.test/cat.jpg", "thumbnail": "https://t.test/1",
                 "url": "https://site.test/cat", "height": 800, "width": 1200, "source": "Bing"}
            ],
            "next": "i.js?q=cats&s=100"
        }"#;
        let page: ImagesPage = serde_json::from_str(body).unwrap();
        assert_eq!(page.results.len(), 1);
        assert_eq!(page.results[0].width, 1200);
        assert_eq!(page.next.as_deref().and_then(next_offset), Some(100));
    }

    #[test]
    fn test_safesearch_param() {
        assert_eq!(safesearch_param(SafeSearch::Moderate), "1");
        assert_eq!(safesearch_param(SafeSearch::Off), "-1");
    }
}
