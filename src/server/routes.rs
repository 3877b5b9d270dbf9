use crate::engine::format::{ErrorBody, ValuationResponse};
use crate::engine::validate::{RawGridRequest, RawPricingRequest};
use crate::errors::PricingError;
use crate::models::registry::DEFAULT_MODEL;
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use std::sync::Arc;

/// POST /option-price -- one valuation (CPU work off the async runtime)
pub async fn option_price(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RawPricingRequest>, JsonRejection>,
) -> Response {
    let req = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return refuse_body(&state, rejection),
    };
    match tokio::task::spawn_blocking(move || state.engine.price(&req)).await {
        Ok(Ok(price)) => Json(ValuationResponse { option_price: price }).into_response(),
        Ok(Err(e)) => error_response(&e),
        Err(e) => join_failure(e),
    }
}

/// POST /heatmap-data -- spot × vol grid
pub async fn heatmap_data(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RawGridRequest>, JsonRejection>,
) -> Response {
    let req = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return refuse_body(&state, rejection),
    };
    match tokio::task::spawn_blocking(move || state.engine.heatmap(&req)).await {
        Ok(Ok(heatmap)) => Json(heatmap).into_response(),
        Ok(Err(e)) => error_response(&e),
        Err(e) => join_failure(e),
    }
}

/// GET /api/models -- registered model ids and their numerical settings
pub async fn get_models(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "models": state.engine.registry().ids(),
        "default": DEFAULT_MODEL,
        "mc_paths": state.config.mc_paths,
        "binomial_steps": state.config.binomial_steps,
        "max_grid_cells": state.config.max_grid_cells,
    }))
}

/// GET /api/counters -- lock-free reads
pub async fn get_counters(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(state.counters.to_json())
}

/// GET /health
pub async fn health() -> &'static str {
    "ok"
}

fn error_response(err: &PricingError) -> Response {
    let status = if err.is_validation() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    };
    (status, Json(ErrorBody::from(err))).into_response()
}

/// A body axum could not decode still goes through the observer and comes
/// back as a tagged 400.
fn refuse_body(state: &AppState, rejection: JsonRejection) -> Response {
    let err = state.engine.rejected(body_rejection(rejection));
    error_response(&err)
}

const DATA_ERROR_PREFIX: &str = "Failed to deserialize the JSON body into the target type: ";

/// Type mismatches carry the serde path of the offending value
/// (`spotPrice`, `spotPrices[1]`); anything else is blamed on the body.
fn body_rejection(rejection: JsonRejection) -> PricingError {
    match rejection {
        JsonRejection::JsonDataError(e) => {
            let text = e.body_text();
            let detail = text.strip_prefix(DATA_ERROR_PREFIX).unwrap_or(&text);
            match detail.split_once(": ") {
                Some((path, reason)) if is_field_path(path) => PricingError::invalid(path, reason),
                _ => PricingError::invalid("body", detail),
            }
        }
        other => PricingError::invalid("body", other.body_text()),
    }
}

fn is_field_path(path: &str) -> bool {
    path.starts_with(|c: char| c.is_ascii_alphabetic())
        && path
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '[' | ']'))
}

fn join_failure(err: tokio::task::JoinError) -> Response {
    tracing::error!(error = %err, "valuation task did not complete");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "error": "internal error", "kind": "Internal" })),
    )
        .into_response()
}
