//! REST API for the sales dashboard.
//!
//! Handlers only read from the shared snapshot and hand the pricing engine's
//! results back as JSON; the recompute route is the one writer.

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::shared::state::AppState;

pub mod error;
pub mod pricing;
pub mod stats;

pub use error::ApiError;

pub fn configure_api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/pricing/tiers", get(pricing::list_tiers))
        .route("/api/pricing/price", get(pricing::get_price))
        .route("/api/potentials", get(pricing::list_potentials))
        .route("/api/potentials/recompute", post(pricing::recompute_potentials))
        .route("/api/companies/:id/potential", get(pricing::get_company_potential))
        .route("/api/stats/dashboard", get(stats::get_dashboard))
        .route("/api/stats/mrr-breakdown", get(stats::get_mrr_breakdown))
        .route("/api/stats/overview", get(stats::get_overview))
}
