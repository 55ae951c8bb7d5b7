use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use shared::Error;

/// Envelope shared by every JSON response.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            error: None,
            details: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    /// `connected`, `unreachable` or `disabled`.
    pub tier2: &'static str,
}

/// An error rendered in the envelope with `success: false`.
///
/// `details` carries the debug rendering of the error and is only filled in
/// when the server runs in development.
#[derive(Debug)]
pub struct ApiError {
    error: Error,
    expose_details: bool,
}

impl ApiError {
    pub fn new(error: Error, expose_details: bool) -> Self {
        Self {
            error,
            expose_details,
        }
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.error.status_code()).unwrap_or(StatusCode::BAD_GATEWAY)
    }
}

fn error_kind(error: &Error) -> &'static str {
    match error {
        Error::Validation { .. } => "validation_error",
        Error::Unauthorized => "unauthorized",
        Error::Forbidden => "forbidden",
        Error::NotFound => "not_found",
        Error::Upstream { .. } => "upstream_error",
        Error::Unavailable(_) => "upstream_unavailable",
        Error::Codec(_) | Error::Tier(_) | Error::Config(_) | Error::Internal(_) => {
            "internal_error"
        }
    }
}

fn public_message(error: &Error) -> String {
    match error {
        Error::Validation { .. } | Error::Upstream { .. } => error.to_string(),
        Error::Unauthorized => "Authentication required".to_string(),
        Error::Forbidden => "Access denied".to_string(),
        Error::NotFound => "Resource not found".to_string(),
        Error::Unavailable(_) => "Hotel search service is temporarily unavailable".to_string(),
        Error::Codec(_) | Error::Tier(_) | Error::Config(_) | Error::Internal(_) => {
            "Internal server error".to_string()
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), "Request failed: {}", self.error);
        } else {
            tracing::debug!(status = status.as_u16(), "Request rejected: {}", self.error);
        }

        let body: ApiResponse<()> = ApiResponse {
            success: false,
            data: None,
            message: Some(public_message(&self.error)),
            error: Some(error_kind(&self.error).to_string()),
            details: self.expose_details.then(|| format!("{:?}", self.error)),
        };
        (status, Json(body)).into_response()
    }
}
