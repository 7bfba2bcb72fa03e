use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::warn;

use crate::dataset::WriteBackError;
use crate::server::services::CompletionError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    /// The completion service failed; its message is passed through verbatim.
    #[error("{0}")]
    Upstream(String),
    #[error("internal: {0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
struct ErrorPayload {
    status: &'static str,
    error: String,
}

impl ApiError {
    pub fn internal<E: std::fmt::Display>(err: E) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<CompletionError> for ApiError {
    fn from(err: CompletionError) -> Self {
        Self::Upstream(err.to_string())
    }
}

impl From<WriteBackError> for ApiError {
    fn from(err: WriteBackError) -> Self {
        match err {
            WriteBackError::MissingIdentifier | WriteBackError::EmptyHistory => {
                Self::BadRequest(err.to_string())
            }
            WriteBackError::NotFound(_) => Self::NotFound(err.to_string()),
            other => Self::internal(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Upstream(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            warn!("Request failed: {}", self);
        }
        let payload = ErrorPayload {
            status: "error",
            error: self.to_string(),
        };
        (status, Json(payload)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_back_errors_map_to_status() {
        let cases = [
            (WriteBackError::MissingIdentifier, StatusCode::BAD_REQUEST),
            (WriteBackError::EmptyHistory, StatusCode::BAD_REQUEST),
            (WriteBackError::NotFound("X".into()), StatusCode::NOT_FOUND),
        ];
        for (err, expected) in cases {
            let response = ApiError::from(err).into_response();
            assert_eq!(response.status(), expected);
        }
    }

    #[test]
    fn upstream_errors_are_500() {
        let err = ApiError::from(CompletionError::EmptyResponse);
        assert_eq!(err.to_string(), "completion service returned no message");
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
