use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tokio::task::JoinError;
use utoipa::ToSchema;

use crate::predict::PredictError;

#[derive(Debug)]
pub enum ApiError {
    Validation(String),
    NotFound(String),
    Timezone(String),
    Internal(String),
}

impl From<PredictError> for ApiError {
    fn from(e: PredictError) -> Self {
        match e {
            PredictError::InvalidCoordinates { .. } | PredictError::TimeOutOfRange(_) => {
                ApiError::Validation(e.to_string())
            }
            PredictError::UnknownSatellite(_) => ApiError::NotFound(e.to_string()),
            PredictError::TimezoneNotFound { .. } | PredictError::UnknownTimezone(_) => {
                ApiError::Timezone(e.to_string())
            }
            _ => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<JoinError> for ApiError {
    fn from(e: JoinError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Timezone(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::Validation(msg) => ErrorResponse::with_message("validation_failed", &msg),
            ApiError::NotFound(msg) => ErrorResponse::with_message("satellite_not_found", &msg),
            ApiError::Timezone(msg) => ErrorResponse::with_message("timezone_unavailable", &msg),
            ApiError::Internal(msg) => {
                log::warn!("Request failed: {}", msg);
                ErrorResponse::with_message("internal_error", &msg)
            }
        };
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: &str) -> Self {
        ErrorResponse {
            error: error.to_string(),
            message: None,
        }
    }

    pub fn with_message(error: &str, message: &str) -> Self {
        ErrorResponse {
            error: error.to_string(),
            message: Some(message.to_string()),
        }
    }
}
