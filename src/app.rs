/*
 * Responsibility
 * - tracing 初期化 → Config読み込み → AuthGate 生成 → Router 組み立て
 * - Middleware の適用 (auth gate / HTTP 共通 layer)
 * - axum::serve() で起動
 */
use std::{panic, process, sync::Arc};

use anyhow::{Context, Result};
use axum::Router;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::config::Config;
use crate::middleware::http::{self, HttpLimits};
use crate::services::auth::{AuthGate, build_auth_gate};

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,openid_gate=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    // Keep the default hook as a fallback (prints to stderr with location/payload).
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // Always surface panics via tracing so they don't get lost.
        tracing::error!(?info, "panic");

        // Development: crash the whole process so we notice immediately.
        // Production: default behavior, the server keeps running.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env().context("failed to load configuration")?;

    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting gate in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    // Configuration faults stop the process here unless configFaults=perRequest.
    let gate = build_auth_gate(&config).context("invalid auth gate configuration")?;
    let app = build_router(gate, HttpLimits::from_config(&config));

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_router(gate: Arc<AuthGate>, limits: HttpLimits) -> Router {
    let router = Router::new().nest("/api/v1", api::v1::routes(gate));

    http::apply(router, limits)
}
