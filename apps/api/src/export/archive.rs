//! ZIP export: every downloaded image re-encoded as JPEG, deflate-compressed.

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::export::fetch::RasterImage;
use crate::export::jpeg::{encode_jpeg, DOWNLOAD_QUALITY};
use crate::export::ExportError;

/// Entry name for the image at `index` in the request (1-based, two digits).
pub fn entry_name(index: usize) -> String {
    format!("image_{:02}.jpg", index + 1)
}

/// Builds an in-memory archive. Entries keep the request index, so a failed
/// download leaves a gap in the numbering rather than shifting later names.
pub fn build_zip(images: &[(usize, RasterImage)]) -> Result<Vec<u8>, ExportError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (index, image) in images {
        let jpeg = encode_jpeg(image, DOWNLOAD_QUALITY)?;
        zip.start_file(entry_name(*index), options)?;
        zip.write_all(&jpeg)?;
    }

    Ok(zip.finish()?.into_inner())
}
