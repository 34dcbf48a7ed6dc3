//! Image download and decode.
//!
//! Every export route funnels through [`ImageSource`]. Failed downloads are
//! logged and dropped by [`fetch_all`]; callers only ever see decoded images.

use std::time::Duration;

use async_trait::async_trait;
use image::RgbImage;
use reqwest::Client;
use thiserror::Error;
use tracing::warn;

use crate::layout::PixelDimensions;

/// A decoded RGB image. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct RasterImage {
    pixels: RgbImage,
}

impl RasterImage {
    pub fn new(pixels: RgbImage) -> Self {
        Self { pixels }
    }

    /// Decodes any supported format and converts to 8-bit RGB.
    pub fn decode(bytes: &[u8]) -> Result<Self, image::ImageError> {
        Ok(Self::new(image::load_from_memory(bytes)?.to_rgb8()))
    }

    pub fn pixels(&self) -> &RgbImage {
        &self.pixels
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }
}

impl PixelDimensions for RasterImage {
    fn pixel_width(&self) -> u32 {
        self.width()
    }

    fn pixel_height(&self) -> u32 {
        self.height()
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected status {0}")]
    Status(u16),

    #[error("Decode error: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Decode task failed: {0}")]
    Task(String),
}

/// Resolves a URL to a decoded image.
#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<RasterImage, FetchError>;
}

/// Downloads images over HTTP with a browser user agent and a per-request timeout.
#[derive(Clone)]
pub struct HttpImageSource {
    client: Client,
}

impl HttpImageSource {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ImageSource for HttpImageSource {
    async fn fetch(&self, url: &str) -> Result<RasterImage, FetchError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let bytes = response.bytes().await?;
        tokio::task::spawn_blocking(move || RasterImage::decode(&bytes))
            .await
            .map_err(|e| FetchError::Task(e.to_string()))?
            .map_err(FetchError::from)
    }
}

/// Fetches `urls` in order, keeping each successful image with its input index.
pub async fn fetch_all(source: &dyn ImageSource, urls: &[String]) -> Vec<(usize, RasterImage)> {
    let mut images = Vec::with_capacity(urls.len());
    for (index, url) in urls.iter().enumerate() {
        match source.fetch(url).await {
            Ok(image) => images.push((index, image)),
            Err(e) => warn!("Error downloading image from {url}: {e}"),
        }
    }
    images
}
