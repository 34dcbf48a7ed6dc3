use std::sync::Arc;

use crate::config::Config;
use crate::export::ImageSource;
use crate::search::provider::SearchProvider;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Pluggable search backend. Default: DuckDuckGo.
    pub search: Arc<dyn SearchProvider>,
    /// Downloads and decodes the images selected for export.
    pub images: Arc<dyn ImageSource>,
}
