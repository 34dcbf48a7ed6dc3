//! Axum route handlers for search, refresh, and load-more.

use axum::{extract::State, Form, Json};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::errors::AppError;
use crate::search::load_more::load_more;
use crate::search::provider::ImageResult;
use crate::state::AppState;
use crate::views::{self, Notice, NoticeLevel};

#[derive(Debug, Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    pub query: String,
}

#[derive(Debug, Deserialize)]
pub struct LoadMoreRequest {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub current_count: usize,
    /// Images the client already shows; only their `image` URL is read.
    #[serde(default)]
    pub current_images: Vec<serde_json::Value>,
}

impl LoadMoreRequest {
    fn seen_urls(&self) -> impl Iterator<Item = String> + '_ {
        self.current_images
            .iter()
            .filter_map(|img| img.get("image").and_then(|v| v.as_str()))
            .map(str::to_string)
    }
}

#[derive(Debug, Serialize)]
pub struct ImagesResponse {
    pub images: Vec<ImageResult>,
    pub query: String,
    pub count: usize,
}

impl ImagesResponse {
    fn new(query: String, images: Vec<ImageResult>) -> Self {
        Self {
            count: images.len(),
            images,
            query,
        }
    }
}

/// POST /search
///
/// Renders the results page, or the search form with a notice when there is
/// nothing to show.
pub async fn handle_search(
    State(state): State<AppState>,
    Form(form): Form<SearchForm>,
) -> axum::response::Html<String> {
    let query = form.query.trim();
    if query.is_empty() {
        return views::index_page(Some(&Notice::new(
            NoticeLevel::Warning,
            "Please enter a search term",
        )));
    }

    match state.search.search(query, state.config.search_max_results).await {
        Ok(images) if images.is_empty() => views::index_page(Some(&Notice::new(
            NoticeLevel::Info,
            format!("No images found for \"{query}\""),
        ))),
        Ok(images) => {
            info!("Search '{}' returned {} images", query, images.len());
            views::results_page(query, &images)
        }
        Err(e) => {
            error!("Error searching for images: {e}");
            views::index_page(Some(&Notice::new(
                NoticeLevel::Danger,
                "An error occurred while searching for images. Please try again.",
            )))
        }
    }
}

/// POST /refresh_search
pub async fn handle_refresh_search(
    State(state): State<AppState>,
    Form(form): Form<SearchForm>,
) -> Result<Json<ImagesResponse>, AppError> {
    let query = form.query.trim();
    if query.is_empty() {
        return Err(AppError::Validation("Query is required".to_string()));
    }

    let images = state
        .search
        .search(query, state.config.search_max_results)
        .await
        .map_err(|e| AppError::search("An error occurred while refreshing images", e))?;

    if images.is_empty() {
        return Err(AppError::NotFound(format!("No images found for \"{query}\"")));
    }

    Ok(Json(ImagesResponse::new(query.to_string(), images)))
}

/// POST /load_more_images
pub async fn handle_load_more(
    State(state): State<AppState>,
    Json(req): Json<LoadMoreRequest>,
) -> Result<Json<ImagesResponse>, AppError> {
    let query = req.query.trim();
    if query.is_empty() {
        return Err(AppError::Validation("Query is required".to_string()));
    }
    debug!(
        "Load more for '{}' (client shows {} images)",
        query, req.current_count
    );

    let images = load_more(
        state.search.as_ref(),
        query,
        req.seen_urls(),
        state.config.load_more_batch,
        state.config.load_more_per_variant,
    )
    .await;

    if images.is_empty() {
        return Err(AppError::NotFound("No more images available".to_string()));
    }

    Ok(Json(ImagesResponse::new(query.to_string(), images)))
}
