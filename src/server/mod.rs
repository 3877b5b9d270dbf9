pub mod routes;

use crate::state::AppState;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/option-price", post(routes::option_price))
        .route("/heatmap-data", post(routes::heatmap_data))
        .route("/api/models", get(routes::get_models))
        .route("/api/counters", get(routes::get_counters))
        .route("/health", get(routes::health))
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        .with_state(state)
}
