use axum::{extract::State, Json};
use std::sync::Arc;

use crate::crm::stats::{self, DashboardStats, Overview, TierBreakdown};
use crate::shared::state::AppState;

pub async fn get_dashboard(State(state): State<Arc<AppState>>) -> Json<DashboardStats> {
    let store = state.store.read().await;
    Json(stats::dashboard(&store, &state.pricing))
}

pub async fn get_mrr_breakdown(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let store = state.store.read().await;
    let tiers: Vec<TierBreakdown> = stats::mrr_breakdown(&store, &state.pricing);
    Json(serde_json::json!({ "tiers": tiers }))
}

pub async fn get_overview(State(state): State<Arc<AppState>>) -> Json<Overview> {
    let store = state.store.read().await;
    Json(stats::overview(&store))
}
