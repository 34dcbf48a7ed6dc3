use image::codecs::jpeg::JpegEncoder;

use crate::export::fetch::RasterImage;

/// Quality for standalone downloads and ZIP entries.
pub const DOWNLOAD_QUALITY: u8 = 95;
/// Quality for images embedded in PDF contact sheets.
pub const EMBED_QUALITY: u8 = 90;

/// Re-encodes a decoded image as baseline JPEG.
pub fn encode_jpeg(image: &RasterImage, quality: u8) -> Result<Vec<u8>, image::ImageError> {
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, quality).encode_image(image.pixels())?;
    Ok(out)
}
