//! Axum route handlers for the three download formats.

use axum::{
    extract::{Path, RawQuery, State},
    http::header,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::Deserialize;
use tracing::{error, info};

use crate::errors::AppError;
use crate::export::archive::build_zip;
use crate::export::fetch::{fetch_all, RasterImage};
use crate::export::jpeg::{encode_jpeg, DOWNLOAD_QUALITY};
use crate::export::pdf::build_contact_sheet;
use crate::export::ExportError;
use crate::layout::LayoutPreset;
use crate::state::AppState;
use crate::views::DOWNLOAD_FAILED;

const DEFAULT_QUERY: &str = "images";

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ZipExportRequest {
    #[serde(default)]
    pub image_urls: Vec<String>,
    #[serde(default)]
    pub query: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PdfExportRequest {
    #[serde(default)]
    pub image_urls: Vec<String>,
    /// Preset key. Browsers send it as a string, API clients sometimes as a number.
    #[serde(default)]
    pub layout: Option<serde_json::Value>,
    #[serde(default)]
    pub stretch: bool,
    #[serde(default)]
    pub query: Option<String>,
}

impl PdfExportRequest {
    pub fn layout_key(&self) -> String {
        match &self.layout {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(serde_json::Value::Number(n)) => n.to_string(),
            _ => LayoutPreset::DEFAULT.key().to_string(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /download_single/*image_url
///
/// The image URL is the rest of the path; its own query string arrives as ours.
/// Any failure sends the browser back to the search page with a notice.
pub async fn handle_download_single(
    State(state): State<AppState>,
    Path(image_url): Path<String>,
    RawQuery(raw_query): RawQuery,
) -> Response {
    let url = match raw_query {
        Some(q) if !q.is_empty() => format!("{image_url}?{q}"),
        _ => image_url,
    };

    let image = match state.images.fetch(&url).await {
        Ok(image) => image,
        Err(e) => {
            error!("Error downloading image from {url}: {e}");
            return download_failed();
        }
    };

    match run_blocking(move || encode_jpeg(&image, DOWNLOAD_QUALITY).map_err(ExportError::from)).await {
        Ok(jpeg) => attachment(jpeg, "image/jpeg", &format!("image_{}.jpg", timestamp())),
        Err(e) => {
            error!("Error encoding single image: {e}");
            download_failed()
        }
    }
}

/// POST /download_images_zip
pub async fn handle_download_zip(
    State(state): State<AppState>,
    Json(req): Json<ZipExportRequest>,
) -> Result<Response, AppError> {
    if req.image_urls.is_empty() {
        return Err(AppError::Validation("No images selected".to_string()));
    }

    let images = fetch_all(state.images.as_ref(), &req.image_urls).await;
    info!(
        "ZIP export: {}/{} images downloaded",
        images.len(),
        req.image_urls.len()
    );

    let zip = run_blocking(move || build_zip(&images))
        .await
        .map_err(|e| AppError::export("Failed to create ZIP file", e))?;

    let filename = format!("{}_{}.zip", query_or_default(req.query.as_deref()), timestamp());
    Ok(attachment(zip, "application/zip", &filename))
}

/// POST /download_pdf
pub async fn handle_download_pdf(
    State(state): State<AppState>,
    Json(req): Json<PdfExportRequest>,
) -> Result<Response, AppError> {
    if req.image_urls.is_empty() {
        return Err(AppError::Validation("No images selected".to_string()));
    }

    let images: Vec<RasterImage> = fetch_all(state.images.as_ref(), &req.image_urls)
        .await
        .into_iter()
        .map(|(_, image)| image)
        .collect();
    if images.is_empty() {
        return Err(AppError::Validation("Failed to download any images".to_string()));
    }

    let layout_key = req.layout_key();
    let stretch = req.stretch;
    info!(
        "PDF export: {} images, layout '{}', stretch={}",
        images.len(),
        layout_key,
        stretch
    );

    let key = layout_key.clone();
    let pdf = run_blocking(move || build_contact_sheet(&images, &key, stretch))
        .await
        .map_err(|e| AppError::export("Failed to create PDF", e))?;

    let filename = format!(
        "{}_{}images_{}.pdf",
        query_or_default(req.query.as_deref()),
        layout_key,
        timestamp()
    );
    Ok(attachment(pdf, "application/pdf", &filename))
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

/// Runs CPU-bound encoding off the async scheduler.
async fn run_blocking<T, F>(work: F) -> Result<T, ExportError>
where
    F: FnOnce() -> Result<T, ExportError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ExportError::Task(e.to_string()))?
}

fn download_failed() -> Response {
    Redirect::to(&format!("/?notice={DOWNLOAD_FAILED}")).into_response()
}

fn timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

fn query_or_default(query: Option<&str>) -> &str {
    match query.map(str::trim) {
        Some(q) if !q.is_empty() => q,
        _ => DEFAULT_QUERY,
    }
}

/// Makes a user-supplied string safe inside a quoted `filename="..."` parameter.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '"' | '\\' | '/' | ';' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

fn attachment(body: Vec<u8>, content_type: &'static str, filename: &str) -> Response {
    let disposition = format!("attachment; filename=\"{}\"", sanitize_filename(filename));
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pdf_request(json: &str) -> PdfExportRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_layout_key_accepts_string_or_number() {
        assert_eq!(pdf_request(r#"{"layout": "6"}"#).layout_key(), "6");
        assert_eq!(pdf_request(r#"{"layout": 8}"#).layout_key(), "8");
        assert_eq!(pdf_request(r#"{}"#).layout_key(), "4");
        assert_eq!(pdf_request(r#"{"layout": null}"#).layout_key(), "4");
    }

    #[test]
    fn test_pdf_request_defaults() {
        let req = pdf_request(r#"{"image_urls": ["https://a.test/1.jpg"]}"#);
        assert!(!req.stretch);
        assert_eq!(req.image_urls.len(), 1);
        assert_eq!(query_or_default(req.query.as_deref()), "images");
    }

    #[test]
    fn test_query_or_default() {
        assert_eq!(query_or_default(Some("  owls ")), "owls");
        assert_eq!(query_or_default(Some("   ")), "images");
        assert_eq!(query_or_default(None), "images");
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("a\"b/c\\d;e\nf.pdf"), "a_b_c_d_e_f.pdf");
        assert_eq!(sanitize_filename("قطط_4images.pdf"), "قطط_4images.pdf");
    }
}
