use axum::{
    Json,
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::{PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use search_core::SearchError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::core::config::ConfigError;

const REDACTED: &str = "internal server error";

/// Public application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // --- Boot / config ---
    #[error(transparent)]
    Config(#[from] ConfigError),

    // --- IO / network / server ---
    #[error("failed to bind listener")]
    Bind(#[source] std::io::Error),

    #[error("server error")]
    Server(#[source] std::io::Error),

    // --- Request / routing ---
    #[error("{0}")]
    BadRequest(String),

    /// Rich HTTP error mapped from lower layers with specific status & code.
    #[error("{message}")]
    Http {
        status: StatusCode,
        code: &'static str,
        message: String,
    },
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Http { status, .. } => *status,
            // startup-only
            AppError::Config(_) | AppError::Bind(_) | AppError::Server(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Bind(_) => "BIND_ERROR",
            AppError::Server(_) => "SERVER_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Http { code, .. } => code,
        }
    }

    /// Maps the search taxonomy onto HTTP statuses.
    ///
    /// Internal failures are always logged; their details reach the client
    /// only when `expose_internal` is set.
    pub fn from_search(err: SearchError, expose_internal: bool) -> Self {
        let (status, code) = match &err {
            SearchError::Validation(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            SearchError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            SearchError::ServiceUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE")
            }
            SearchError::Timeout(_) => (StatusCode::GATEWAY_TIMEOUT, "TIMEOUT"),
            SearchError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let message = if err.is_internal() {
            error!(error = %err, "request failed with internal error");
            if expose_internal {
                err.to_string()
            } else {
                REDACTED.to_string()
            }
        } else {
            err.to_string()
        };

        AppError::Http {
            status,
            code,
            message,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorBody {
            error: self.error_code(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Handy result alias used across handlers.
pub type AppResult<T> = Result<T, AppError>;

impl From<QueryRejection> for AppError {
    fn from(err: QueryRejection) -> Self {
        AppError::BadRequest(err.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(err: PathRejection) -> Self {
        AppError::BadRequest(err.body_text())
    }
}

impl From<MultipartRejection> for AppError {
    fn from(err: MultipartRejection) -> Self {
        AppError::BadRequest(err.body_text())
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::Http {
                status: StatusCode::PAYLOAD_TOO_LARGE,
                code: "PAYLOAD_TOO_LARGE",
                message: err.body_text(),
            }
        } else {
            AppError::BadRequest(err.body_text())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn status_and_message(err: AppError) -> (StatusCode, String) {
        (err.status_code(), err.to_string())
    }

    #[test]
    fn search_errors_map_to_statuses() {
        let cases = [
            (SearchError::Validation("q".into()), StatusCode::BAD_REQUEST),
            (SearchError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (SearchError::ServiceUnavailable("x".into()), StatusCode::SERVICE_UNAVAILABLE),
            (SearchError::Timeout(Duration::from_secs(1)), StatusCode::GATEWAY_TIMEOUT),
            (SearchError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(AppError::from_search(err, false).status_code(), status);
        }
    }

    #[test]
    fn internal_details_are_redacted_by_default() {
        let (_, msg) = status_and_message(AppError::from_search(
            SearchError::Internal("grpc: connection reset".into()),
            false,
        ));
        assert_eq!(msg, REDACTED);

        let (_, msg) = status_and_message(AppError::from_search(
            SearchError::Internal("grpc: connection reset".into()),
            true,
        ));
        assert!(msg.contains("connection reset"));
    }

    #[test]
    fn client_errors_keep_their_message() {
        let err = AppError::from_search(SearchError::NotFound("image 9 not found".into()), false);
        assert_eq!(err.error_code(), "NOT_FOUND");
        assert_eq!(err.to_string(), "image 9 not found");
    }
}
