use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::document::ParseError;

/// Rejections surfaced to the caller. None of them is fatal: the store is left
/// untouched and the client gets a readable message. Model call failures never
/// show up here; they stay as `OpenAiError` and are recovered locally.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("State mismatch: {0}")]
    StateMismatch(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Could not read document: {0}")]
    Parse(#[from] ParseError),
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::StateMismatch(_) => "STATE_MISMATCH",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Parse(_) => "PARSE_ERROR",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::StateMismatch(_) => StatusCode::CONFLICT,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Parse(e) => {
                tracing::warn!(target: "resume", error = %e, "Document parse failed");
                StatusCode::UNPROCESSABLE_ENTITY
            }
        };

        let message = match &self {
            AppError::Parse(_) => format!(
                "{self}. Could not extract resume data automatically, please retry or enter your details manually."
            ),
            _ => self.to_string(),
        };

        let body = Json(json!({
            "error": {
                "code": self.code(),
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
