//! "Load more" result diversification.
//!
//! A repeated query tends to return the same top hits, so additional images are
//! gathered by querying a fixed list of keyword variants and keeping only URLs
//! the client has not seen yet.

use std::collections::HashSet;

use tracing::debug;

use crate::search::provider::{ImageResult, SearchProvider};

/// Suffixes appended to the query, tried in order after the bare query.
const VARIANT_SUFFIXES: [&str; 5] = ["صور", "photos", "images", "HD", "pictures"];

/// Keyword strings tried for a load-more request, in order.
pub fn keyword_variants(query: &str) -> Vec<String> {
    std::iter::once(query.to_string())
        .chain(VARIANT_SUFFIXES.iter().map(|suffix| format!("{query} {suffix}")))
        .collect()
}

/// Collects up to `batch` images whose URLs are not in `already_seen`.
///
/// Each variant asks the provider for `per_variant` results. A failing variant
/// is skipped; the remaining variants still run.
pub async fn load_more(
    provider: &dyn SearchProvider,
    query: &str,
    already_seen: impl IntoIterator<Item = String>,
    batch: usize,
    per_variant: usize,
) -> Vec<ImageResult> {
    let mut used: HashSet<String> = already_seen.into_iter().collect();
    let mut fresh = Vec::with_capacity(batch);

    for keywords in keyword_variants(query) {
        if fresh.len() >= batch {
            break;
        }

        let results = match provider.search(&keywords, per_variant).await {
            Ok(results) => results,
            Err(e) => {
                debug!("Search variant '{keywords}' failed: {e}");
                continue;
            }
        };

        for result in results {
            if fresh.len() >= batch {
                break;
            }
            if !result.image.is_empty() && used.insert(result.image.clone()) {
                fresh.push(result);
            }
        }
    }

    fresh
}
