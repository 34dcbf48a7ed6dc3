pub mod health;

use axum::{
    extract::Query,
    http::StatusCode,
    response::Html,
    routing::{get, post},
    Router,
};
use serde::Deserialize;

use crate::export::handlers as export;
use crate::search::handlers as search;
use crate::state::AppState;
use crate::views::{self, Notice};

#[derive(Debug, Deserialize)]
pub struct IndexQuery {
    pub notice: Option<String>,
}

/// GET /
async fn index_handler(Query(params): Query<IndexQuery>) -> Html<String> {
    let notice = params.notice.as_deref().and_then(Notice::from_code);
    views::index_page(notice.as_ref())
}

async fn not_found() -> (StatusCode, Html<String>) {
    (StatusCode::NOT_FOUND, views::index_page(None))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health::health_handler))
        // Search
        .route("/search", post(search::handle_search))
        .route("/refresh_search", post(search::handle_refresh_search))
        .route("/load_more_images", post(search::handle_load_more))
        // Export
        .route("/download_single/*image_url", get(export::handle_download_single))
        .route("/download_images_zip", post(export::handle_download_zip))
        .route("/download_pdf", post(export::handle_download_pdf))
        .fallback(not_found)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, Response};
    use image::RgbImage;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::export::fetch::FetchError;
    use crate::export::{ImageSource, RasterImage};
    use crate::search::provider::{ImageResult, SearchError, SearchProvider};

    /// "boom" fails, "nothing" is empty, anything else yields three in-memory images.
    struct FakeSearch;

    #[async_trait]
    impl SearchProvider for FakeSearch {
        async fn search(
            &self,
            keywords: &str,
            max_results: usize,
        ) -> Result<Vec<ImageResult>, SearchError> {
            match keywords {
                "boom" => Err(SearchError::Api { status: 500 }),
                "nothing" => Ok(Vec::new()),
                _ => Ok(["mem://640x480", "mem://300x900", "mem://1200x300"]
                    .iter()
                    .take(max_results)
                    .map(|url| ImageResult {
                        title: format!("{keywords} result"),
                        image: format!("{url}#{keywords}"),
                        ..Default::default()
                    })
                    .collect()),
            }
        }
    }

    /// Decodes `mem://<w>x<h>` into a blank image of that size.
    struct FakeImages;

    #[async_trait]
    impl ImageSource for FakeImages {
        async fn fetch(&self, url: &str) -> Result<RasterImage, FetchError> {
            let dims = url
                .strip_prefix("mem://")
                .map(|rest| rest.split(['#', '?']).next().unwrap_or(rest))
                .and_then(|rest| rest.split_once('x'))
                .and_then(|(w, h)| Some((w.parse().ok()?, h.parse().ok()?)));
            match dims {
                Some((w, h)) => Ok(RasterImage::new(RgbImage::new(w, h))),
                None => Err(FetchError::Status(404)),
            }
        }
    }

    fn app() -> Router {
        let config = Config::from_lookup(|_| None).unwrap();
        build_router(AppState {
            config,
            search: Arc::new(FakeSearch),
            images: Arc::new(FakeImages),
        })
    }

    async fn send(request: Request<Body>) -> Response<Body> {
        app().oneshot(request).await.unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn post_form(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_bytes(response: Response<Body>) -> Vec<u8> {
        to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec()
    }

    async fn body_text(response: Response<Body>) -> String {
        String::from_utf8(body_bytes(response).await).unwrap()
    }

    async fn body_json(response: Response<Body>) -> Value {
        serde_json::from_slice(&body_bytes(response).await).unwrap()
    }

    fn disposition(response: &Response<Body>) -> String {
        response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    }

    #[tokio::test]
    async fn test_health() {
        let response = send(get("/health")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_index_and_notice() {
        let plain = body_text(send(get("/")).await).await;
        assert!(plain.contains("action=\"/search\""));
        assert!(!plain.contains("class=\"alert"));

        let with_notice = body_text(send(get("/?notice=download_failed")).await).await;
        assert!(with_notice.contains("Failed to download the image"));
    }

    #[tokio::test]
    async fn test_unknown_route_renders_index_with_404() {
        let response = send(get("/no/such/page")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body_text(response).await.contains("action=\"/search\""));
    }

    #[tokio::test]
    async fn test_search_page_outcomes() {
        let empty = body_text(send(post_form("/search", "query=+++")).await).await;
        assert!(empty.contains("alert warning"));

        let none = body_text(send(post_form("/search", "query=nothing")).await).await;
        assert!(none.contains("alert info"));

        let failed = body_text(send(post_form("/search", "query=boom")).await).await;
        assert!(failed.contains("alert danger"));

        let results = body_text(send(post_form("/search", "query=owls")).await).await;
        assert!(results.contains("Results for \"owls\""));
        assert!(results.contains("mem://640x480#owls"));
    }

    #[tokio::test]
    async fn test_refresh_search_statuses() {
        let missing = send(post_form("/refresh_search", "query=")).await;
        assert_eq!(missing.status(), StatusCode::BAD_REQUEST);

        let none = send(post_form("/refresh_search", "query=nothing")).await;
        assert_eq!(none.status(), StatusCode::NOT_FOUND);

        let failed = send(post_form("/refresh_search", "query=boom")).await;
        assert_eq!(failed.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(failed).await["error"]["code"], "SEARCH_ERROR");

        let ok = send(post_form("/refresh_search", "query=owls")).await;
        assert_eq!(ok.status(), StatusCode::OK);
        let body = body_json(ok).await;
        assert_eq!(body["count"], 3);
        assert_eq!(body["query"], "owls");
    }

    #[tokio::test]
    async fn test_load_more_excludes_current_images() {
        let response = send(post_json(
            "/load_more_images",
            json!({
                "query": "owls",
                "current_count": 1,
                "current_images": [{"image": "mem://640x480#owls"}, "not an object"]
            }),
        ))
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        let urls: Vec<&str> = body["images"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|i| i["image"].as_str())
            .collect();
        // 2 left from the bare query, then 3 from each variant until 10
        assert_eq!(body["count"], 10);
        assert_eq!(urls.len(), 10);
        assert!(!urls.contains(&"mem://640x480#owls"));
        assert_eq!(urls[2], "mem://640x480#owls صور");
    }

    #[tokio::test]
    async fn test_load_more_requires_query() {
        let response = send(post_json("/load_more_images", json!({}))).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_download_pdf() {
        let response = send(post_json(
            "/download_pdf",
            json!({
                "image_urls": ["mem://640x480", "broken", "mem://300x900", "mem://10x10",
                               "mem://50x20", "mem://20x50", "mem://800x800", "mem://1x2"],
                "layout": "6",
                "stretch": false,
                "query": "owls"
            }),
        ))
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
        let name = disposition(&response);
        assert!(name.starts_with("attachment; filename=\"owls_6images_"), "{name}");
        assert!(name.ends_with(".pdf\""));

        let pdf = lopdf::Document::load_mem(&body_bytes(response).await).unwrap();
        // 7 decodable images on a 6-slot grid
        assert_eq!(pdf.get_pages().len(), 2);
    }

    #[tokio::test]
    async fn test_download_pdf_rejects_empty_or_undownloadable() {
        let empty = send(post_json("/download_pdf", json!({"image_urls": []}))).await;
        assert_eq!(empty.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(empty).await["error"]["message"], "No images selected");

        let broken = send(post_json("/download_pdf", json!({"image_urls": ["broken"]}))).await;
        assert_eq!(broken.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(broken).await["error"]["message"],
            "Failed to download any images"
        );
    }

    #[tokio::test]
    async fn test_download_zip() {
        let response = send(post_json(
            "/download_images_zip",
            json!({"image_urls": ["mem://4x4", "broken", "mem://8x2"]}),
        ))
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/zip");
        assert!(disposition(&response).contains("filename=\"images_"));

        let bytes = body_bytes(response).await;
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 2);
        assert!(archive.by_name("image_01.jpg").is_ok());
        assert!(archive.by_name("image_03.jpg").is_ok());
    }

    #[tokio::test]
    async fn test_download_zip_requires_urls() {
        let response = send(post_json("/download_images_zip", json!({"query": "owls"}))).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_download_single() {
        let response = send(get("/download_single/mem://32x16")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/jpeg");
        assert!(disposition(&response).contains("filename=\"image_"));

        let jpeg = body_bytes(response).await;
        let decoded = image::load_from_memory(&jpeg).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (32, 16));
    }

    #[tokio::test]
    async fn test_download_single_keeps_image_query_string() {
        let response = send(get("/download_single/mem://6x6?size=large")).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_download_single_failure_redirects_with_notice() {
        let response = send(get("/download_single/https://nowhere.test/x.jpg")).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers()[header::LOCATION],
            "/?notice=download_failed"
        );
    }
}
