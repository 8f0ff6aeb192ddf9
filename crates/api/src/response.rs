//! Response envelope.
//!
//! Every route answers with `{status, code, message, data?}`. Errors never
//! carry a `data` field.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use fundline_shared::AppError;
use serde::Serialize;

/// JSON envelope returned by every route.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    /// `"success"` or `"error"`.
    pub status: &'static str,
    /// Stable numeric code.
    pub code: u32,
    /// Human-readable message.
    pub message: String,
    /// Payload, omitted on error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// Builds a success response.
pub fn success<T: Serialize>(status: StatusCode, code: u32, message: &str, data: T) -> Response {
    (
        status,
        Json(ApiResponse {
            status: "success",
            code,
            message: message.to_string(),
            data: Some(data),
        }),
    )
        .into_response()
}

/// Builds an error response from an [`AppError`].
pub fn error(err: &AppError) -> Response {
    tracing::debug!(kind = err.error_code(), code = err.code(), "Responding with error");
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(ApiResponse::<()> {
            status: "error",
            code: err.code(),
            message: err.message().to_string(),
            data: None,
        }),
    )
        .into_response()
}

/// Builds the 405 response for a route.
pub fn method_not_allowed(code: u32, allowed: &str) -> Response {
    error(&AppError::MethodNotAllowed {
        code,
        message: format!("Only {allowed} method is allowed"),
    })
}
