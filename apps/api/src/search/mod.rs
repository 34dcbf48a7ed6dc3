// Image search: provider seam, DuckDuckGo backend, and load-more diversification.

pub mod duckduckgo;
pub mod handlers;
pub mod load_more;
pub mod provider;

pub use duckduckgo::DuckDuckGoClient;
