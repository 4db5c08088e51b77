use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

/// Request-level failures of the hydrant API.
///
/// Validation and not-found errors carry no side effects. Storage and image
/// errors are fatal to their request; their detail is logged server-side and
/// the client sees a generic message.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("Not found")]
    NotFound,
    #[error("storage error: {0}")]
    Storage(String),
    #[error("image processing error: {0}")]
    ImageProcessing(String),
}

impl ApiError {
    pub fn invalid_coordinates() -> Self {
        ApiError::Validation("Invalid coordinates".to_string())
    }

    pub fn invalid_id() -> Self {
        ApiError::Validation("Invalid id".to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::NotFound => (StatusCode::NOT_FOUND, "Not found".to_string()),
            ApiError::Storage(detail) => {
                tracing::error!(%detail, "storage failure");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            ApiError::ImageProcessing(detail) => {
                tracing::error!(%detail, "image processing failure");
                (StatusCode::INTERNAL_SERVER_ERROR, "Failed to process image".to_string())
            }
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::invalid_coordinates().into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::NotFound.into_response().status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::Storage("io".into()).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::ImageProcessing("bad png".into()).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
