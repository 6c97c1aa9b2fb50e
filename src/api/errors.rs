use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::fmt;

/// Error body returned by the API, a short message plus a more detailed
/// description of what went wrong
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub message: String,
    pub description: String,
    #[serde(skip)]
    pub code: u16,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiError({}, {}: {})", self.code, self.message, self.description)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = axum::Json(self);
        (status, body).into_response()
    }
}

/// Helper function to create API errors
pub fn api_error(status: StatusCode, message: &str, description: &str) -> ApiError {
    ApiError {
        message: message.to_string(),
        description: description.to_string(),
        code: status.as_u16(),
    }
}
