//! API response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use larder_core::{ErrorResponse, LarderError};
use serde::{Deserialize, Serialize};
use tracing::error;

/// Envelope around every JSON body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorResponse>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(error: ErrorResponse) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            error: Some(error),
        }
    }
}

/// Error returned from handlers, rendered with the envelope and the status
/// of the underlying [`LarderError`].
#[derive(Debug)]
pub struct AppError(pub LarderError);

impl From<LarderError> for AppError {
    fn from(err: LarderError) -> Self {
        Self(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self.0, "request failed");
        }

        error_response(status, ErrorResponse::from_error(&self.0))
    }
}

/// Renders an enveloped error body with the given status.
pub fn error_response(status: StatusCode, error: ErrorResponse) -> Response {
    (status, Json(ApiResponse::<()>::error(error))).into_response()
}

/// Result type for Axum handlers.
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, AppError>;

/// Result type for handlers answering 201.
pub type CreatedResult<T> = Result<(StatusCode, Json<ApiResponse<T>>), AppError>;

pub fn ok<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse::success(data)))
}

pub fn created<T: Serialize>(data: T) -> CreatedResult<T> {
    Ok((StatusCode::CREATED, Json(ApiResponse::success(data))))
}

pub fn no_content() -> StatusCode {
    StatusCode::NO_CONTENT
}
