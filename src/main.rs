//! Cherryty Back binary entrypoint wiring the REST API, snapshot restore and background tasks.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cherryty_back::{
    config::AppConfig,
    dao::snapshot_store::file::FileSnapshotStore,
    error::handle_panic,
    routes,
    services::flush_scheduler,
    state::{AppState, SharedState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let store = Arc::new(FileSnapshotStore::new(config.data_dir().clone()));
    info!(data_dir = %store.data_dir().display(), "restoring snapshots");
    let app_state = AppState::restore(config, store).await;

    let flusher = tokio::spawn(flush_scheduler::run(app_state.clone()));
    spawn_keep_alive(&app_state);

    // Build the HTTP router once the shared state is ready.
    let app = build_router(app_state.clone());

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(3000);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    // Stop the scheduler so the final flush is never reported as busy.
    flusher.abort();
    let _ = flusher.await;
    let report = flush_scheduler::flush_all(&app_state).await;
    if report.failed() {
        warn!(?report, "final snapshot flush failed; changes since the last flush are lost");
    } else {
        info!(?report, "final snapshot flush complete");
    }

    Ok(())
}

#[cfg(feature = "keep-alive")]
fn spawn_keep_alive(state: &SharedState) {
    if let Some(config) = state.config().keep_alive() {
        tokio::spawn(cherryty_back::services::keep_alive::run(config.clone()));
    }
}

#[cfg(not(feature = "keep-alive"))]
fn spawn_keep_alive(state: &SharedState) {
    if state.config().keep_alive().is_some() {
        warn!("keep-alive URL configured but the `keep-alive` feature is disabled");
    }
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = signal(SignalKind::terminate()).expect("install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
