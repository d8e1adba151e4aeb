//! Permission gate: bearer token → verified claims → required permission → AuthCtx in extensions.
//!
//! Every protected route is wrapped individually with the permission it needs:
//!
//! ```ignore
//! let route = get(list_drinks).merge(permission::require(
//!     post(create_drink),
//!     Permission::POST_DRINKS,
//!     state.auth.clone(),
//! ));
//! ```
//!
//! The wrapped handler only runs when every gate passed; otherwise the
//! `AuthError` is rendered (through `AppError`) as the JSON error body.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
    routing::MethodRouter,
};

use crate::api::extractors::AuthCtx;
use crate::error::AppError;
use crate::services::auth::{Authorizer, Permission};

#[derive(Clone)]
struct PermissionGuard {
    authorizer: Arc<Authorizer>,
    required: Permission,
}

/// Wrap `route` so that it only runs for tokens granting `required`.
pub fn require<S>(
    route: MethodRouter<S>,
    required: Permission,
    authorizer: Arc<Authorizer>,
) -> MethodRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    let guard = PermissionGuard {
        authorizer,
        required,
    };

    // route_layer: applies only to the methods registered so far, so public
    // methods merged afterwards stay public.
    route.route_layer(middleware::from_fn_with_state(guard, permission_middleware))
}

async fn permission_middleware(
    State(guard): State<PermissionGuard>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let claims = match guard
        .authorizer
        .authorize(&guard.required, req.headers())
        .await
    {
        Ok(claims) => claims,
        Err(err) => {
            tracing::warn!(
                code = err.code(),
                permission = %guard.required,
                method = %req.method(),
                path = %req.uri().path(),
                error = %err,
                "authorization rejected"
            );
            return Err(err.into());
        }
    };

    tracing::debug!(
        permission = %guard.required,
        subject = claims.subject().unwrap_or("-"),
        issuer = claims.issuer(),
        audience = ?claims.audience(),
        expires_at = claims.expires_at(),
        "authorized"
    );

    // middleware → extractor
    req.extensions_mut().insert(AuthCtx::new(claims));

    Ok(next.run(req).await)
}
