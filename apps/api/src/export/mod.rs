// Export pipeline: fetch selected images, then re-encode as a single JPEG, a ZIP
// archive, or a PDF contact sheet. Encoding is CPU-bound and runs in spawn_blocking.

pub mod archive;
pub mod fetch;
pub mod handlers;
pub mod jpeg;
pub mod pdf;

use thiserror::Error;

use crate::layout::LayoutError;

pub use fetch::{HttpImageSource, ImageSource, RasterImage};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Layout error: {0}")]
    Layout(#[from] LayoutError),

    #[error("Image encode error: {0}")]
    Encode(#[from] image::ImageError),

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Encoding task failed: {0}")]
    Task(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
