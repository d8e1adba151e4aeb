/*
 * Responsibility
 * - tracing / panic hook setup
 * - load Config → build dependencies (db pool, authorizer) → assemble Router
 * - apply middleware (security headers, CORS, request id / trace / limits)
 * - start serving with axum::serve()
 */
use std::{panic, process};

use anyhow::{Context, Result};
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{api, config::Config, middleware, services::auth::build_authorizer, state::AppState};

fn init_tracing() {
    // RUST_LOG wins when set, e.g.
    // RUST_LOG=info,coffee_shop_api=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // Development: crash the whole process so the panic is noticed.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env().context("loading configuration")?;

    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting API in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config).await?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn build_state(config: &Config) -> Result<AppState> {
    let db = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .context("connecting to database")?;

    let auth = build_authorizer(config).context("building authorizer")?;

    // Warm the key cache; a failure here is not fatal, requests will retry the fetch.
    match auth.validator().keys().resolve().await {
        Ok(keys) => tracing::info!(
            source = ?auth.validator().keys(),
            keys = keys.keys.len(),
            "signing keys loaded"
        ),
        Err(err) => tracing::warn!(
            source = ?auth.validator().keys(),
            error = %err,
            "signing keys unavailable at startup"
        ),
    }

    Ok(AppState::new(db, auth))
}

fn build_router(state: AppState, config: &Config) -> Router {
    let router = Router::new()
        .merge(api::routes(&state))
        .with_state(state);

    let router = middleware::security_headers::apply(router);
    let router = middleware::cors::apply(router, config);
    middleware::http::apply(router)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
