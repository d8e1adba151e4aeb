/*
 * Responsibility
 * - Load settings from the environment (.env supported): DATABASE_URL, CORS, auth provider
 * - Validate them (missing or invalid values abort startup)
 */
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use jsonwebtoken::Algorithm;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        match std::env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,

    pub database_url: String,
    pub database_max_connections: u32,

    pub auth_issuer: String,
    pub auth_audience: String,
    pub auth_algorithms: Vec<Algorithm>,
    pub access_token_leeway_seconds: u64,

    pub jwks_url: Url,
    pub jwks_file: Option<PathBuf>,
    pub jwks_cache_ttl: Duration,
    pub jwks_min_refresh_interval: Duration,
    pub jwks_fetch_timeout: Duration,
}

/// Clock skew allowed on `exp`/`nbf` unless `ACCESS_TOKEN_LEEWAY_SECONDS` says otherwise.
pub const DEFAULT_ACCESS_TOKEN_LEEWAY_SECONDS: u64 = 0;

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = env_or("PORT", 5000);
        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::from_env();

        let cors_allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        let database_url =
            std::env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;
        let database_max_connections = env_or("DATABASE_MAX_CONNECTIONS", 5);

        let auth_domain = std::env::var("AUTH_DOMAIN")
            .map(|d| d.trim().trim_end_matches('/').to_string())
            .ok()
            .filter(|d| !d.is_empty())
            .ok_or(ConfigError::Missing("AUTH_DOMAIN"))?;

        let auth_issuer =
            std::env::var("AUTH_ISSUER").unwrap_or_else(|_| format!("https://{auth_domain}/"));

        let auth_audience =
            std::env::var("AUTH_AUDIENCE").map_err(|_| ConfigError::Missing("AUTH_AUDIENCE"))?;

        let auth_algorithms =
            parse_algorithms(&std::env::var("AUTH_ALGORITHMS").unwrap_or_else(|_| "RS256".into()))?;

        let access_token_leeway_seconds = env_or(
            "ACCESS_TOKEN_LEEWAY_SECONDS",
            DEFAULT_ACCESS_TOKEN_LEEWAY_SECONDS,
        );

        let jwks_url = std::env::var("JWKS_URL")
            .unwrap_or_else(|_| format!("https://{auth_domain}/.well-known/jwks.json"));
        let jwks_url = Url::parse(&jwks_url).map_err(|_| ConfigError::Invalid("JWKS_URL"))?;

        // Local development: serve keys from a JWKS file instead of the provider.
        let jwks_file = std::env::var("JWKS_FILE")
            .ok()
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        let jwks_cache_ttl = Duration::from_secs(env_or("JWKS_CACHE_TTL_SECONDS", 600));
        let jwks_min_refresh_interval = Duration::from_secs(env_or("JWKS_MIN_REFRESH_SECONDS", 30));
        let jwks_fetch_timeout = Duration::from_secs(env_or("JWKS_FETCH_TIMEOUT_SECONDS", 5));

        Ok(Self {
            addr,
            app_env,
            cors_allowed_origins,
            database_url,
            database_max_connections,
            auth_issuer,
            auth_audience,
            auth_algorithms,
            access_token_leeway_seconds,
            jwks_url,
            jwks_file,
            jwks_cache_ttl,
            jwks_min_refresh_interval,
            jwks_fetch_timeout,
        })
    }
}

/// Parse a comma separated allow-list such as `RS256,ES256`.
///
/// HMAC algorithms are rejected; only asymmetric ones can be checked against a JWK set.
pub fn parse_algorithms(raw: &str) -> Result<Vec<Algorithm>, ConfigError> {
    let mut algorithms = Vec::new();

    for name in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let alg =
            Algorithm::from_str(name).map_err(|_| ConfigError::Invalid("AUTH_ALGORITHMS"))?;

        if matches!(alg, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512) {
            return Err(ConfigError::Invalid("AUTH_ALGORITHMS"));
        }

        if !algorithms.contains(&alg) {
            algorithms.push(alg);
        }
    }

    if algorithms.is_empty() {
        return Err(ConfigError::Invalid("AUTH_ALGORITHMS"));
    }

    Ok(algorithms)
}
