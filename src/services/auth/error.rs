/*
 * Responsibility
 * - Failure taxonomy of the authorization pipeline
 * - Stable code / status / message per failure, rendered as the JSON error body
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::error::ErrorResponse;
use crate::services::auth::jwks::KeySourceError;

/// Every way a request can fail to be authorized.
///
/// Each variant is terminal for the request it occurs in. `status()` is the
/// HTTP status the boundary answers with, and also the `error` field of the
/// JSON body.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing Authorization header.")]
    MissingAuthHeader,

    #[error("{0}")]
    MalformedAuthHeader(&'static str),

    #[error("Authorization malformed.")]
    MalformedToken,

    #[error("Unable to find the appropriate key.")]
    UnknownSigningKey,

    #[error("Unable to parse authentication token.")]
    TokenInvalid,

    #[error("Token expired.")]
    TokenExpired,

    #[error("Incorrect claims. Please, check the audience.")]
    AudienceMismatch,

    #[error("Incorrect claims. Please, check the issuer.")]
    IssuerMismatch,

    #[error("Permissions not in JWT.")]
    InsufficientPermissions,

    #[error("Unable to fetch signing keys.")]
    KeySourceUnavailable(#[source] KeySourceError),
}

impl AuthError {
    pub const BEARER_SCHEME_REQUIRED: &'static str = "\"Bearer\" must be first part of Auth header.";
    pub const INVALID_HEADER_FORMAT: &'static str = "Invalid token format.";

    /// Machine-stable identifier, used in logs.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingAuthHeader => "missing_auth_header",
            Self::MalformedAuthHeader(_) => "malformed_auth_header",
            Self::MalformedToken => "malformed_token",
            Self::UnknownSigningKey => "unknown_signing_key",
            Self::TokenInvalid => "token_invalid",
            Self::TokenExpired => "token_expired",
            Self::AudienceMismatch => "audience_mismatch",
            Self::IssuerMismatch => "issuer_mismatch",
            Self::InsufficientPermissions => "insufficient_permissions",
            Self::KeySourceUnavailable(_) => "key_source_unavailable",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::MalformedToken | Self::UnknownSigningKey | Self::TokenInvalid => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::UNAUTHORIZED,
        }
    }
}

impl From<KeySourceError> for AuthError {
    fn from(e: KeySourceError) -> Self {
        Self::KeySourceUnavailable(e)
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse::new(status, self.to_string());

        (status, Json(body)).into_response()
    }
}
