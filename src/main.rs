// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};
use tracing_subscriber::EnvFilter;

use crate::application::dashboard_service::DashboardService;
use crate::application::license_service::LicenseService;
use crate::infrastructure::config::load_dashboard_config;
use crate::infrastructure::license_client::LicenseServerClient;
use crate::presentation::app_state::AppState;
use crate::presentation::router::router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = load_dashboard_config()?;

    // Create repository (infrastructure layer)
    let repository = Arc::new(LicenseServerClient::new(
        &config.backend.base_url,
        config.backend.request_timeout(),
    )?);

    // Create services (application layer)
    let state = Arc::new(AppState {
        dashboard_service: DashboardService::new(repository.clone()),
        license_service: LicenseService::new(repository.clone()),
        repository,
    });

    // Build router (presentation layer)
    let router = router(state);

    // Start server
    let addr: SocketAddr = config.server.bind.parse()?;
    tracing::info!(
        "Starting license-dashboard on {} (license server: {})",
        addr,
        config.backend.base_url
    );

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
