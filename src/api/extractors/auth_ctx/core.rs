use axum::extract::FromRequestParts;
use axum::http::{StatusCode, request::Parts};

use super::AuthCtx;

/// Extractor for handlers behind a permission gate.
///
/// Relies on the permission middleware having inserted `AuthCtx` into the
/// request extensions; without it (route not guarded) the request gets a 401.
pub struct AuthCtxExtractor(pub AuthCtx);

impl<S> FromRequestParts<S> for AuthCtxExtractor
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthCtx>()
            .cloned()
            .map(AuthCtxExtractor)
            .ok_or(StatusCode::UNAUTHORIZED)
    }
}
