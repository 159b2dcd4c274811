use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::error::ApiError;
use crate::crm::CrmDirectory;
use crate::pricing::{classify_potential, PotentialResult, PricingTier, RecomputeReport, Sek};
use crate::shared::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PriceQuery {
    pub agents: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PriceResponse {
    pub agents: i64,
    pub price: Sek,
    pub tier: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyPotential {
    pub company_id: String,
    pub company_name: String,
    #[serde(flatten)]
    pub result: PotentialResult,
}

pub async fn list_tiers(State(state): State<Arc<AppState>>) -> Json<Vec<PricingTier>> {
    Json(state.pricing.tiers().to_vec())
}

pub async fn get_price(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PriceQuery>,
) -> Result<Json<PriceResponse>, ApiError> {
    let raw = query
        .agents
        .ok_or_else(|| ApiError::Validation("agents is required".to_string()))?;
    let agents: i64 = raw
        .trim()
        .parse()
        .map_err(|_| ApiError::Validation(format!("agents must be an integer, got '{raw}'")))?;

    Ok(Json(PriceResponse {
        agents,
        price: state.pricing.price_for_agent_count(agents),
        tier: state.pricing.tier_label(agents).to_string(),
    }))
}

pub async fn get_company_potential(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<PotentialResult>, ApiError> {
    let store = state.store.read().await;
    let company = store
        .company(&id)
        .ok_or_else(|| ApiError::NotFound(format!("Company {id}")))?;

    let agents = store.agents_of(&company.id);
    Ok(Json(classify_potential(
        &state.pricing,
        company,
        &agents,
        store.brand_of(company),
    )))
}

/// Every company's potential, largest first.
pub async fn list_potentials(State(state): State<Arc<AppState>>) -> Json<Vec<CompanyPotential>> {
    let store = state.store.read().await;
    let mut potentials: Vec<CompanyPotential> = store
        .companies()
        .iter()
        .map(|company| {
            let agents = store.agents_of(&company.id);
            CompanyPotential {
                company_id: company.id.clone(),
                company_name: company.name.clone(),
                result: classify_potential(
                    &state.pricing,
                    company,
                    &agents,
                    store.brand_of(company),
                ),
            }
        })
        .collect();

    potentials.sort_by(|a, b| b.result.potential.cmp(&a.result.potential));
    Json(potentials)
}

pub async fn recompute_potentials(State(state): State<Arc<AppState>>) -> Json<RecomputeReport> {
    let mut store = state.store.write().await;
    Json(store.recompute_potentials(&state.pricing))
}
