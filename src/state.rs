/*
 * Responsibility
 * - Shared context bound to the Router (AppState)
 *   - db: PgPool, auth: Authorizer (token validator + cached signing keys)
 * - Cloned per request, so everything inside is Arc/Clone cheap
 */
use std::sync::Arc;

use crate::services::auth::Authorizer;

#[derive(Clone, Debug)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub auth: Arc<Authorizer>,
}

impl AppState {
    pub fn new(db: sqlx::PgPool, auth: Arc<Authorizer>) -> Self {
        Self { db, auth }
    }
}
