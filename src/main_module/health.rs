//! Health check handler

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use std::sync::Arc;

use crate::shared::state::AppState;

pub async fn health_check(State(state): State<Arc<AppState>>) -> (StatusCode, Json<serde_json::Value>) {
    let store = state.store.read().await;
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "ok",
            "service": "crmserver",
            "version": env!("CARGO_PKG_VERSION"),
            "companies": store.companies().len(),
            "pricingTiers": state.pricing.tiers().len()
        })),
    )
}
