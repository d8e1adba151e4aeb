/// Factory: build the `Authorizer` (and the key resolver behind it) from application `Config`.
use std::sync::Arc;

use crate::config::Config;
use crate::services::auth::{
    Authorizer,
    jwks::{
        HttpKeySource, KeyResolver, KeyResolverSettings, KeySource, KeySourceError,
        StaticKeySource, parse_key_set,
    },
    token::{TokenValidator, ValidatorSettings},
};

fn key_source(config: &Config) -> Result<Arc<dyn KeySource>, KeySourceError> {
    if let Some(path) = &config.jwks_file {
        let body = std::fs::read(path)
            .map_err(|e| KeySourceError::Unreachable(format!("{}: {e}", path.display())))?;
        return Ok(Arc::new(StaticKeySource::new(parse_key_set(&body)?)));
    }

    Ok(Arc::new(HttpKeySource::new(
        config.jwks_url.clone(),
        config.jwks_fetch_timeout,
    )?))
}

pub fn build_authorizer(config: &Config) -> Result<Arc<Authorizer>, KeySourceError> {
    let keys = KeyResolver::new(
        key_source(config)?,
        KeyResolverSettings {
            cache_ttl: config.jwks_cache_ttl,
            min_refresh_interval: config.jwks_min_refresh_interval,
        },
    );

    let validator = TokenValidator::new(
        Arc::new(keys),
        ValidatorSettings {
            issuer: config.auth_issuer.clone(),
            audience: config.auth_audience.clone(),
            algorithms: config.auth_algorithms.clone(),
            leeway_seconds: config.access_token_leeway_seconds,
        },
    );

    Ok(Arc::new(Authorizer::new(validator)))
}
