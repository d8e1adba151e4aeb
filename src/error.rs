/*
 * Responsibility
 * - Application-wide ApiError definition
 * - IntoResponse implementation (HTTP status / JSON error body)
 * - Unify repo errors, request validation errors and auth errors
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::repos::error::RepoError;
use crate::services::auth::AuthError;

/// `{"success": false, "error": <status>, "message": "..."}`
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: u16,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: status.as_u16(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{message}")]
    Unprocessable { message: String },
    #[error("{resource} not found.")]
    NotFound { resource: &'static str },
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("internal server error")]
    Internal,
}

impl AppError {
    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self::Unprocessable {
            message: message.into(),
        }
    }

    pub fn not_found(resource: &'static str) -> Self {
        Self::NotFound { resource }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Auth(err) => return err.into_response(),
            AppError::Unprocessable { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = ErrorResponse::new(status, self.to_string());

        (status, Json(body)).into_response()
    }
}

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::Conflict => AppError::unprocessable("A drink with this title already exists."),
            RepoError::Db(err) => {
                tracing::error!(error = %err, "database error");
                AppError::Internal
            }
            RepoError::EncodeRecipe(err) => {
                tracing::error!(error = %err, "recipe could not be encoded");
                AppError::Internal
            }
            RepoError::CorruptRecipe { id, source } => {
                tracing::error!(drink_id = id, error = %source, "stored recipe is not valid json");
                AppError::Internal
            }
        }
    }
}
