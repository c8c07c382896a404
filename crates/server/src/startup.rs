use std::{net::SocketAddr, sync::Arc};

use axum::Router;
use common::utils::logging::init_logging;
use dotenvy::dotenv;
use tower_http::cors::CorsLayer;
use tracing::info;

use configs::AppConfig;
use service::auth::{Argon2Hasher, TokenConfig};
use service::payment::SandboxGateway;
use service::services::BillingPlan;
use service::{seed, storage, Services};

use crate::errors::StartupError;
use crate::routes::{self, auth::ServerState};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn bind_addr(cfg: &AppConfig) -> Result<SocketAddr, StartupError> {
    format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("server address: {e}")))
}

/// Opens storage, seeds it and wires every service behind the router.
pub async fn build_state(cfg: &AppConfig) -> anyhow::Result<ServerState> {
    let store = storage::open(&cfg.storage, &cfg.database).await?;
    seed::seed(&store, &Argon2Hasher, cfg.storage.seed_demo_data).await?;

    let services = Services::new(
        store,
        Arc::new(Argon2Hasher),
        Arc::new(SandboxGateway::from_config(&cfg.payment)),
        TokenConfig::from(&cfg.auth),
        BillingPlan::from(&cfg.payment),
    );
    Ok(ServerState { services, secure_cookies: cfg.auth.secure_cookies })
}

pub async fn build_app(cfg: &AppConfig) -> anyhow::Result<Router> {
    let state = build_state(cfg).await?;
    Ok(routes::build_router(state, build_cors()))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
    info!("shutdown signal received");
}

/// Public entry: load config, build the app and serve until Ctrl+C.
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    let cfg = AppConfig::load_and_validate().map_err(|e| StartupError::InvalidConfig(e.to_string()))?;
    init_logging(&cfg.server.log_format);

    let app = build_app(&cfg).await?;
    let addr = bind_addr(&cfg)?;
    info!(%addr, backend = ?cfg.storage.backend, "starting server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    info!("server stopped");
    Ok(())
}
