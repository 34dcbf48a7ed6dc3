use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::export::ExportError;
use crate::layout::LayoutError;
use crate::search::provider::SearchError;

/// Application-level error type for the JSON endpoints.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unprocessable entity: {0}")]
    UnprocessableEntity(String),

    #[error("{message}: {source}")]
    Search {
        message: String,
        #[source]
        source: SearchError,
    },

    #[error("{message}: {source}")]
    Export {
        message: String,
        #[source]
        source: ExportError,
    },

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn search(message: impl Into<String>, source: SearchError) -> Self {
        AppError::Search {
            message: message.into(),
            source,
        }
    }

    /// Wraps an export failure. An image the layout engine rejects is the
    /// client's problem (422); everything else is a server fault.
    pub fn export(message: impl Into<String>, source: ExportError) -> Self {
        match source {
            ExportError::Layout(LayoutError::InvalidImage { index, width, height }) => {
                AppError::UnprocessableEntity(format!(
                    "Image {index} has invalid dimensions {width}x{height}"
                ))
            }
            ExportError::Layout(LayoutError::NoImages) => {
                AppError::Validation("No images to export".to_string())
            }
            source => AppError::Export {
                message: message.into(),
                source,
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::UnprocessableEntity(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "UNPROCESSABLE_ENTITY",
                msg.clone(),
            ),
            AppError::Search { message, source } => {
                tracing::error!("{message}: {source}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "SEARCH_ERROR",
                    message.clone(),
                )
            }
            AppError::Export { message, source } => {
                tracing::error!("{message}: {source}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "EXPORT_ERROR",
                    message.clone(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_image_maps_to_unprocessable() {
        let err = AppError::export(
            "Failed to create PDF",
            ExportError::Layout(LayoutError::InvalidImage {
                index: 3,
                width: 0,
                height: 10,
            }),
        );
        assert!(matches!(err, AppError::UnprocessableEntity(ref m) if m.contains("Image 3")));
        assert_eq!(err.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_encoder_failure_is_server_error() {
        let err = AppError::export("Failed to create PDF", ExportError::Pdf("boom".into()));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_validation_is_bad_request() {
        let err = AppError::Validation("No images selected".into());
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
