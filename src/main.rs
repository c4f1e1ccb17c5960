// Main entry point - Dependency injection and server setup
mod domain;
mod application;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};
use anyhow::Context;
use axum::{routing::get, Router};
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

use crate::application::chart_service::ChartService;
use crate::domain::label::{KeyLabels, LabelLookup};
use crate::infrastructure::config::{load_channels_config, load_server_config};
use crate::infrastructure::json_log_source::JsonLogSource;
use crate::infrastructure::labels::ConfigLabels;
use crate::infrastructure::logging::init_tracing;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{channel_chart, charts, health_check};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    // Load configuration
    let server_config = load_server_config()?.server;
    let channels_config = load_channels_config()?;
    let channels = channels_config.channels_by_id()?;
    tracing::info!(channels = channels.len(), "loaded channel configuration");

    // Log source (infrastructure layer)
    let source = Arc::new(JsonLogSource::new(server_config.logs_dir.clone()));

    // Services (application layer)
    let chart_service = ChartService::new(source, channels);

    let label_table = channels_config.label_table();
    let labels: Arc<dyn LabelLookup> = if label_table.is_empty() {
        Arc::new(KeyLabels)
    } else {
        Arc::new(ConfigLabels::new(label_table))
    };

    let state = Arc::new(AppState {
        chart_service,
        labels,
        default_interval: server_config.default_interval,
    });

    // Router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/channels/:id/chart", get(channel_chart))
        .route("/charts", get(charts))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr: SocketAddr = server_config
        .bind
        .parse()
        .with_context(|| format!("invalid bind address {:?}", server_config.bind))?;
    tracing::info!(%addr, logs_dir = %server_config.logs_dir.display(), "starting channel-charts service");

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
