// Contact-sheet layout: grid presets, page geometry, and the placement engine.
// Pure and synchronous; callers run it inside tokio::task::spawn_blocking alongside encoding.

pub mod engine;
pub mod geometry;
pub mod presets;

// Re-export the public API consumed by the export pipeline.
pub use engine::{build_document, Document, LayoutError, PixelDimensions};
pub use geometry::Rect;
pub use presets::LayoutPreset;
