use axum::http::{HeaderMap, header};

use crate::services::auth::{
    error::AuthError,
    permission::{Permission, has_permission},
    token::{TokenClaims, TokenValidator},
};

/// Header → token → claims → permission, in that order.
#[derive(Debug)]
pub struct Authorizer {
    validator: TokenValidator,
}

impl Authorizer {
    pub fn new(validator: TokenValidator) -> Self {
        Self { validator }
    }

    pub fn validator(&self) -> &TokenValidator {
        &self.validator
    }

    /// Authorize a request for `required`, returning the verified claims.
    pub async fn authorize(
        &self,
        required: &Permission,
        headers: &HeaderMap,
    ) -> Result<TokenClaims, AuthError> {
        debug_assert!(
            !required.as_str().is_empty(),
            "protected operations must name a permission"
        );

        let token = bearer_token(headers)?;
        let claims = self.validator.verify(token).await?;

        if !has_permission(required, &claims) {
            return Err(AuthError::InsufficientPermissions);
        }

        Ok(claims)
    }
}

/// Extract the token from `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingAuthHeader)?;

    let value = value
        .to_str()
        .map_err(|_| AuthError::MalformedAuthHeader(AuthError::INVALID_HEADER_FORMAT))?;

    let mut parts = value.split_whitespace();

    let scheme = parts.next().unwrap_or_default();
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::MalformedAuthHeader(
            AuthError::BEARER_SCHEME_REQUIRED,
        ));
    }

    match (parts.next(), parts.next()) {
        (Some(token), None) => Ok(token),
        _ => Err(AuthError::MalformedAuthHeader(
            AuthError::INVALID_HEADER_FORMAT,
        )),
    }
}
