/*
 * Responsibility
 * - The "authenticated context" type handlers see
 * - The permission middleware verifies the token and stores this in request extensions;
 *   handlers only ever receive this type
 */
use crate::services::auth::TokenClaims;

/// Context attached to a request that passed its permission gate.
#[derive(Debug, Clone)]
pub struct AuthCtx {
    pub claims: TokenClaims,
}

impl AuthCtx {
    pub fn new(claims: TokenClaims) -> Self {
        Self { claims }
    }

    /// `sub` of the token, for logging / auditing.
    pub fn subject(&self) -> Option<&str> {
        self.claims.subject()
    }

    pub fn permissions(&self) -> &[String] {
        self.claims.permissions().unwrap_or_default()
    }
}
