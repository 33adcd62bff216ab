#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod server;

use std::process;

use anyhow::Context;
use axum::Router;
use vizor_server::handler::routes;
use vizor_server::middleware::{
    RouterObservabilityExt, RouterOpenApiExt, RouterRecoveryExt, RouterSecurityExt,
    SecurityHeadersConfig,
};
use vizor_server::service::ServiceState;

use crate::config::{Cli, MiddlewareConfig};

/// Tracing target for server startup events.
pub const TRACING_TARGET_SERVER_STARTUP: &str = "vizor_cli::server::startup";

/// Tracing target for server shutdown events.
pub const TRACING_TARGET_SERVER_SHUTDOWN: &str = "vizor_cli::server::shutdown";

/// Tracing target for configuration events.
pub const TRACING_TARGET_CONFIG: &str = "vizor_cli::config";

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        tracing::error!(
            target: TRACING_TARGET_SERVER_STARTUP,
            error = format!("{err:#}"),
            "Server exited with an error"
        );
        process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();
    cli.init_tracing();
    cli.validate()?;
    cli.log();

    let state = ServiceState::from_config(&cli.service)
        .await
        .context("failed to initialize services")?;

    let app = create_router(state, &cli.middleware);
    server::serve(app, cli.server).await?;

    Ok(())
}

/// Builds the application router with every middleware layer.
///
/// Layers run outermost first: recovery, observability, security.
fn create_router(state: ServiceState, middleware: &MiddlewareConfig) -> Router {
    routes()
        .with_open_api(&middleware.openapi)
        .with_state(state)
        .with_security(&middleware.cors, &SecurityHeadersConfig::default())
        .with_observability()
        .with_recovery(&middleware.recovery)
}
