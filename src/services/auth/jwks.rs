//! Signing-key resolution: fetch the published JWK set and keep a cached snapshot of it.
use std::{
    collections::HashSet,
    sync::Arc,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use jsonwebtoken::jwk::{Jwk, JwkSet};
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use url::Url;

/// Failures while obtaining the key set. All of them surface as `KeySourceUnavailable`.
#[derive(Debug, Error)]
pub enum KeySourceError {
    #[error("key set endpoint unreachable: {0}")]
    Unreachable(String),
    #[error("key set endpoint answered with status {0}")]
    Status(u16),
    #[error("key set fetch timed out")]
    Timeout,
    #[error("malformed key set: {0}")]
    Malformed(String),
}

/// Where the signing keys come from.
///
/// Implementations return the whole set on every call; caching is done by
/// [`KeyResolver`].
#[async_trait]
pub trait KeySource: Send + Sync + 'static {
    // Returns a description of the source (for logging).
    fn describe(&self) -> String;

    async fn fetch(&self) -> Result<JwkSet, KeySourceError>;
}

/// Remote JWKS document, e.g. `https://<domain>/.well-known/jwks.json`.
#[derive(Clone, Debug)]
pub struct HttpKeySource {
    client: reqwest::Client,
    url: Url,
}

impl HttpKeySource {
    pub fn new(url: Url, timeout: Duration) -> Result<Self, KeySourceError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| KeySourceError::Unreachable(e.to_string()))?;

        Ok(Self { client, url })
    }
}

#[async_trait]
impl KeySource for HttpKeySource {
    fn describe(&self) -> String {
        self.url.to_string()
    }

    async fn fetch(&self) -> Result<JwkSet, KeySourceError> {
        let resp = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .map_err(from_reqwest)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(KeySourceError::Status(status.as_u16()));
        }

        let body = resp.bytes().await.map_err(from_reqwest)?;
        parse_key_set(&body)
    }
}

fn from_reqwest(e: reqwest::Error) -> KeySourceError {
    if e.is_timeout() {
        KeySourceError::Timeout
    } else {
        KeySourceError::Unreachable(e.to_string())
    }
}

/// Fixed in-memory key set (local development, tests).
#[derive(Clone, Debug)]
pub struct StaticKeySource {
    keys: JwkSet,
}

impl StaticKeySource {
    pub fn new(keys: JwkSet) -> Self {
        Self { keys }
    }
}

#[async_trait]
impl KeySource for StaticKeySource {
    fn describe(&self) -> String {
        format!("static ({} keys)", self.keys.keys.len())
    }

    async fn fetch(&self) -> Result<JwkSet, KeySourceError> {
        Ok(self.keys.clone())
    }
}

#[derive(Deserialize)]
struct RawKeySet {
    keys: Vec<serde_json::Value>,
}

/// Parse a JWKS document.
///
/// The document itself must be an object with a `keys` array. Entries that are
/// not usable keys (unsupported `kty`, missing components) are skipped.
pub fn parse_key_set(body: &[u8]) -> Result<JwkSet, KeySourceError> {
    let raw: RawKeySet =
        serde_json::from_slice(body).map_err(|e| KeySourceError::Malformed(e.to_string()))?;

    let mut keys = Vec::with_capacity(raw.keys.len());
    for entry in raw.keys {
        match serde_json::from_value::<Jwk>(entry) {
            Ok(jwk) => keys.push(jwk),
            Err(err) => tracing::warn!(error = %err, "skipping unparseable jwk entry"),
        }
    }

    Ok(JwkSet { keys })
}

/// Keep the first key for each `kid`; keys without a `kid` can never be selected.
fn dedupe_by_kid(set: JwkSet) -> JwkSet {
    let mut seen = HashSet::new();
    let keys = set
        .keys
        .into_iter()
        .filter(|jwk| match jwk.common.key_id.as_deref() {
            Some(kid) if seen.insert(kid.to_string()) => true,
            Some(kid) => {
                tracing::warn!(kid = %kid, "duplicate kid in key set, keeping the first entry");
                false
            }
            None => {
                tracing::debug!("dropping jwk without kid");
                false
            }
        })
        .collect();

    JwkSet { keys }
}

#[derive(Debug, Clone, Copy)]
pub struct KeyResolverSettings {
    /// How long a fetched set is served from cache. Zero disables caching.
    pub cache_ttl: Duration,
    /// Minimum gap between refreshes forced by an unknown `kid`.
    pub min_refresh_interval: Duration,
}

#[derive(Clone)]
struct KeySnapshot {
    keys: Arc<JwkSet>,
    fetched_at: Instant,
}

/// Cached view over a [`KeySource`].
///
/// The current set is an immutable `Arc<JwkSet>` that refreshes replace as a
/// whole, so readers only ever see a complete set. Only one fetch runs at a
/// time.
pub struct KeyResolver {
    source: Arc<dyn KeySource>,
    settings: KeyResolverSettings,
    snapshot: RwLock<Option<KeySnapshot>>,
    // Held for the duration of a fetch. Guards the time of the last forced
    // attempt, successful or not.
    refresh_lock: Mutex<Option<Instant>>,
}

impl std::fmt::Debug for KeyResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyResolver")
            .field("source", &self.source.describe())
            .field("settings", &self.settings)
            .finish()
    }
}

impl KeyResolver {
    pub fn new(source: Arc<dyn KeySource>, settings: KeyResolverSettings) -> Self {
        Self {
            source,
            settings,
            snapshot: RwLock::new(None),
            refresh_lock: Mutex::new(None),
        }
    }

    /// Current key set, fetched if the cached one is missing or stale.
    pub async fn resolve(&self) -> Result<Arc<JwkSet>, KeySourceError> {
        if let Some(snapshot) = self.snapshot.read().await.as_ref()
            && self.is_fresh(snapshot)
        {
            return Ok(snapshot.keys.clone());
        }

        self.refresh(false).await
    }

    /// Key with the given `kid`, or `None` if the source does not publish it.
    ///
    /// A miss forces one refresh (subject to `min_refresh_interval`) so that
    /// rotated keys are picked up before the cache expires. If that refresh
    /// fails the answer comes from the set already held.
    pub async fn find(&self, kid: &str) -> Result<Option<Jwk>, KeySourceError> {
        let keys = self.resolve().await?;
        if let Some(jwk) = keys.find(kid) {
            return Ok(Some(jwk.clone()));
        }

        tracing::debug!(kid = %kid, "kid not in cached key set, forcing refresh");
        match self.refresh(true).await {
            Ok(keys) => Ok(keys.find(kid).cloned()),
            Err(err) => {
                tracing::warn!(
                    kid = %kid,
                    error = %err,
                    "forced key refresh failed, answering from cached set"
                );
                Ok(keys.find(kid).cloned())
            }
        }
    }

    fn is_fresh(&self, snapshot: &KeySnapshot) -> bool {
        snapshot.fetched_at.elapsed() < self.settings.cache_ttl
    }

    async fn refresh(&self, force: bool) -> Result<Arc<JwkSet>, KeySourceError> {
        let mut last_forced = self.refresh_lock.lock().await;

        // Another caller may have refreshed while we waited for the lock.
        if let Some(snapshot) = self.snapshot.read().await.as_ref() {
            let rate_limited = last_forced
                .is_some_and(|at| at.elapsed() < self.settings.min_refresh_interval);
            if (!force && self.is_fresh(snapshot)) || (force && rate_limited) {
                return Ok(snapshot.keys.clone());
            }
        }

        if force {
            *last_forced = Some(Instant::now());
        }

        let keys = match self.source.fetch().await {
            Ok(keys) => Arc::new(dedupe_by_kid(keys)),
            Err(err) => {
                tracing::warn!(
                    source = %self.source.describe(),
                    error = %err,
                    "signing key fetch failed"
                );
                return Err(err);
            }
        };

        tracing::debug!(
            source = %self.source.describe(),
            keys = keys.keys.len(),
            "signing keys refreshed"
        );

        *self.snapshot.write().await = Some(KeySnapshot {
            keys: keys.clone(),
            fetched_at: Instant::now(),
        });

        Ok(keys)
    }
}
