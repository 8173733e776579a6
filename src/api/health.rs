use crate::api::AppState;
use crate::error::ApiError;
use crate::mortgage::MortgageInputs;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Json};
use axum::routing::get;
use axum::Router;
use serde_json::json;
use std::collections::HashMap;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/health", get(api_health))
        .route("/api/calculator", get(api_calculator))
}

async fn api_health(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.cache.snapshot();
    Json(json!({
        "status": "ok",
        "listings": snapshot.listings.len(),
        "store": state.cache.repository().store_name(),
        "images": state.uploader.provider(),
        "auth": state.auth.provider_name(),
        "error": snapshot.error,
    }))
}

async fn api_calculator(
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, ApiError> {
    let inputs = MortgageInputs::from_query(&params);
    let breakdown = inputs
        .calculate()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    Ok(Json(json!({ "inputs": inputs, "result": breakdown })))
}
