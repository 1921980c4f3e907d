//! HTTP error responses

use crate::CompareError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Error returned by API handlers
#[derive(Debug)]
pub struct ApiError(pub CompareError);

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            CompareError::UnknownPlatform(_) => StatusCode::NOT_FOUND,
            err if err.is_client_error() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<CompareError> for ApiError {
    fn from(err: CompareError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self.0);
        } else {
            tracing::debug!("Rejected request: {}", self.0);
        }

        (
            status,
            Json(ErrorBody {
                detail: self.0.to_string(),
            }),
        )
            .into_response()
    }
}
