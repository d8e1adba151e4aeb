use std::sync::Arc;

use jsonwebtoken::{
    Algorithm, DecodingKey, Validation,
    errors::ErrorKind,
    jwk::PublicKeyUse,
};
use serde::Deserialize;

use crate::services::auth::error::AuthError;
use crate::services::auth::jwks::KeyResolver;

/// `aud` may be a single string or an array of strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum AudienceClaim {
    One(String),
    Many(Vec<String>),
}

impl AudienceClaim {
    fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(aud) => vec![aud],
            Self::Many(auds) => auds,
        }
    }
}

// Payload as it comes off the wire. Never leaves this module.
#[derive(Debug, Deserialize)]
struct RawClaims {
    #[serde(default)]
    iss: Option<String>,
    #[serde(default)]
    aud: Option<AudienceClaim>,
    #[serde(default)]
    sub: Option<String>,
    exp: u64,
    #[serde(default)]
    permissions: Option<Vec<String>>,
}

/// Claims of a fully verified access token.
///
/// Only [`TokenValidator::verify`] produces values of this type, and only after
/// signature, expiry, audience and issuer have all been checked.
#[derive(Debug, Clone)]
pub struct TokenClaims {
    subject: Option<String>,
    issuer: String,
    audience: Vec<String>,
    expires_at: u64,
    permissions: Option<Vec<String>>,
}

impl TokenClaims {
    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn audience(&self) -> &[String] {
        &self.audience
    }

    pub fn expires_at(&self) -> u64 {
        self.expires_at
    }

    /// `None` when the token carried no `permissions` claim at all.
    pub fn permissions(&self) -> Option<&[String]> {
        self.permissions.as_deref()
    }

    #[cfg(test)]
    pub(crate) fn for_tests(permissions: Option<Vec<String>>) -> Self {
        Self {
            subject: Some("auth0|test".into()),
            issuer: "https://coffee-shop.test/".into(),
            audience: vec!["coffee-shop".into()],
            expires_at: u64::MAX,
            permissions,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ValidatorSettings {
    pub issuer: String,
    pub audience: String,
    /// Accepted signature algorithms. Anything else is rejected before verification.
    pub algorithms: Vec<Algorithm>,
    pub leeway_seconds: u64,
}

/// Verifies bearer tokens against the keys published by the identity provider.
#[derive(Debug)]
pub struct TokenValidator {
    keys: Arc<KeyResolver>,
    settings: ValidatorSettings,
}

impl TokenValidator {
    pub fn new(keys: Arc<KeyResolver>, settings: ValidatorSettings) -> Self {
        Self { keys, settings }
    }

    pub fn keys(&self) -> &KeyResolver {
        &self.keys
    }

    /// Verify and decode a raw token.
    ///
    /// Steps run in order and the first failure wins:
    /// 1. header parses and names a `kid` (`MalformedToken`)
    /// 2. `kid` is in the key set (`UnknownSigningKey`)
    /// 3. `alg` is allowed and the signature verifies (`TokenInvalid`)
    /// 4. `exp` (`TokenExpired`), then `aud` (`AudienceMismatch`), then `iss` (`IssuerMismatch`)
    pub async fn verify(&self, token: &str) -> Result<TokenClaims, AuthError> {
        let header = jsonwebtoken::decode_header(token).map_err(|err| {
            tracing::debug!(error = %err, "token header did not parse");
            AuthError::MalformedToken
        })?;

        let kid = header
            .kid
            .as_deref()
            .filter(|kid| !kid.is_empty())
            .ok_or(AuthError::MalformedToken)?;

        let jwk = self
            .keys
            .find(kid)
            .await?
            .ok_or(AuthError::UnknownSigningKey)?;

        if !self.settings.algorithms.contains(&header.alg) {
            tracing::debug!(alg = ?header.alg, "token algorithm not allowed");
            return Err(AuthError::TokenInvalid);
        }

        if matches!(jwk.common.public_key_use, Some(PublicKeyUse::Encryption)) {
            tracing::debug!(kid = %kid, "key is published for encryption, not signing");
            return Err(AuthError::TokenInvalid);
        }

        let key = DecodingKey::from_jwk(&jwk).map_err(|err| {
            tracing::debug!(kid = %kid, error = %err, "jwk is not a usable decoding key");
            AuthError::TokenInvalid
        })?;

        let mut validation = Validation::new(header.alg);
        validation.leeway = self.settings.leeway_seconds;
        validation.validate_exp = true;
        validation.validate_nbf = true;
        // aud/iss are compared below so that each gets its own error.
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp"]);

        let raw = jsonwebtoken::decode::<RawClaims>(token, &key, &validation)
            .map_err(map_decode_error)?
            .claims;

        let audience = raw.aud.map(AudienceClaim::into_vec).unwrap_or_default();
        if !audience.iter().any(|aud| *aud == self.settings.audience) {
            return Err(AuthError::AudienceMismatch);
        }

        let issuer = match raw.iss {
            Some(iss) if iss == self.settings.issuer => iss,
            _ => return Err(AuthError::IssuerMismatch),
        };

        Ok(TokenClaims {
            subject: raw.sub,
            issuer,
            audience,
            expires_at: raw.exp,
            permissions: raw.permissions,
        })
    }
}

fn map_decode_error(err: jsonwebtoken::errors::Error) -> AuthError {
    match err.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        ErrorKind::InvalidAudience => AuthError::AudienceMismatch,
        ErrorKind::InvalidIssuer => AuthError::IssuerMismatch,
        _ => {
            tracing::debug!(error = %err, "token failed verification");
            AuthError::TokenInvalid
        }
    }
}
