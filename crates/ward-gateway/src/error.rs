//! Gateway error types and their HTTP mappings.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;
use ward_approvals::ApprovalError;
use ward_runlog::RunLogError;

/// Errors surfaced by gateway handlers.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Malformed or incomplete request.
    #[error("{0}")]
    BadRequest(String),

    /// Approval workflow failure; status derives from the inner error.
    #[error(transparent)]
    Approvals(#[from] ApprovalError),

    /// Run log failure; status derives from the inner error.
    #[error(transparent)]
    RunLog(#[from] RunLogError),
}

/// JSON error body, mirrored by every non-2xx response.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl GatewayError {
    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Approvals(e) => match e {
                ApprovalError::Validation(_) => StatusCode::BAD_REQUEST,
                ApprovalError::NotFound { .. } => StatusCode::NOT_FOUND,
                ApprovalError::Conflict { .. } => StatusCode::CONFLICT,
                ApprovalError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::RunLog(e) => match e {
                RunLogError::Validation(_) => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(error = %self, "request failed");
        }
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Result type for gateway handlers.
pub type GatewayResult<T> = Result<T, GatewayError>;
