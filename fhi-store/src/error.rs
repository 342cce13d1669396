//! HTTP error mapping for fhi-store
//!
//! Every failure leaves as `{"error": {"code", "message"}}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use fhi_common::api::ErrorResponse;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed path parameter (400)
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Common(#[from] fhi_common::Error),
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        use fhi_common::Error as E;
        match self {
            ApiError::BadRequest(_)
            | ApiError::Common(E::InvalidInput(_))
            | ApiError::Common(E::Json(_)) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Common(E::NotFound(_)) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::Common(E::Database(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR")
            }
            ApiError::Common(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let message = match &self {
            ApiError::BadRequest(msg) => msg.clone(),
            ApiError::Common(err) => err.to_string(),
        };

        if status.is_server_error() {
            tracing::error!(code, "{}", message);
        }

        (status, Json(ErrorResponse::new(code, message))).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ApiError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
            (fhi_common::Error::InvalidInput("x".into()).into(), StatusCode::BAD_REQUEST),
            (fhi_common::Error::NotFound("x".into()).into(), StatusCode::NOT_FOUND),
            (fhi_common::Error::Internal("x".into()).into(), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
