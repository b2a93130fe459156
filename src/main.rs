// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod error;
mod infrastructure;
mod presentation;

use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crate::application::analytics_source::AnalyticsSource;
use crate::application::pages::{MlPage, OverviewPage};
use crate::application::poller::Poller;
use crate::infrastructure::config::load_dashboard_config;
use crate::infrastructure::http_source::HttpAnalyticsSource;
use crate::presentation::app_state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = load_dashboard_config()?;

    // Create analytics source (infrastructure layer)
    let source: Arc<dyn AnalyticsSource> = Arc::new(
        HttpAnalyticsSource::new(&config.api.base_url, config.api.timeout())
            .context("Failed to build analytics client")?,
    );

    // Create one poller per page (application layer)
    let settings = config.poll.settings();
    let state = Arc::new(AppState {
        overview: Arc::new(Poller::new(
            OverviewPage::new(config.api.country_limit),
            source.clone(),
            settings.clone(),
        )),
        ml: Arc::new(Poller::new(MlPage::new(), source, settings)),
    });
    state.start_all();

    // Build router (presentation layer)
    let router = presentation::router(state.clone());

    let listener = tokio::net::TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind))?;
    tracing::info!(
        bind = %config.server.bind,
        api = %config.api.base_url,
        "Starting retail-dashboard service"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.shutdown_all().await;
    tracing::info!("Pollers stopped");

    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(s) => s,
                Err(_) => {
                    let _ = tokio::signal::ctrl_c().await;
                    return;
                }
            };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
    tracing::info!("Received shutdown signal");
}
