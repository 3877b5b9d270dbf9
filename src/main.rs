mod config;
mod engine;
mod errors;
mod models;
mod server;
mod state;

use crate::engine::PricingEngine;
use crate::models::registry::ModelRegistry;
use crate::state::{AppState, PerfCounters};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    // Structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("option_heatmap starting");

    // Load config
    let cfg = match config::AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("config error: {e}");
            std::process::exit(1);
        }
    };

    if cfg.grid_threads > 0 {
        if let Err(e) = rayon::ThreadPoolBuilder::new()
            .num_threads(cfg.grid_threads)
            .build_global()
        {
            tracing::error!("rayon pool error: {e}");
            std::process::exit(1);
        }
    }

    // Model registry (injected into the engine, read-only from here on)
    let registry = match ModelRegistry::from_config(&cfg) {
        Ok(r) => r,
        Err(e) => {
            tracing::error!("model registry error: {e}");
            std::process::exit(1);
        }
    };
    tracing::info!(
        models = ?registry.ids(),
        mc_paths = cfg.mc_paths,
        binomial_steps = cfg.binomial_steps,
        max_grid_cells = cfg.max_grid_cells,
        "pricing models ready"
    );

    let counters = Arc::new(PerfCounters::new());
    let engine = PricingEngine::new(Arc::new(registry), counters.clone(), cfg.max_grid_cells);
    let port = cfg.server_port;
    let app = server::router(AppState::new(cfg, engine, counters));

    let addr = format!("0.0.0.0:{port}");
    tracing::info!("server listening on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("bind error: {e}");
            std::process::exit(1);
        });

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("server error: {e}");
    }
}
