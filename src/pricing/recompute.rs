use log::{debug, info};
use serde::Serialize;

use super::potential::classify_potential;
use super::{PricingTable, Sek};
use crate::crm::{Company, CrmDirectory};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PotentialUpdate {
    pub company_id: String,
    pub previous: Option<Sek>,
    pub potential: Sek,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecomputeReport {
    pub updated_count: usize,
    #[serde(skip)]
    pub updates: Vec<PotentialUpdate>,
}

/// Reclassifies every company and collects the potentials that differ from
/// the stored `potential_value`. A company with no stored value always
/// counts as changed. Nothing is written; callers persist `updates`.
pub fn recompute_all<D>(table: &PricingTable, companies: &[Company], directory: &D) -> RecomputeReport
where
    D: CrmDirectory + ?Sized,
{
    let updates: Vec<PotentialUpdate> = companies
        .iter()
        .filter_map(|company| {
            let agents = directory.agents_of(&company.id);
            let brand = directory.brand_of(company);
            let result = classify_potential(table, company, &agents, brand);

            if company.potential_value == Some(result.potential) {
                return None;
            }
            debug!(
                "Potential for company {} changed: {:?} -> {}",
                company.id, company.potential_value, result.potential
            );
            Some(PotentialUpdate {
                company_id: company.id.clone(),
                previous: company.potential_value,
                potential: result.potential,
            })
        })
        .collect();

    info!(
        "Recomputed potential for {} companies, {} changed",
        companies.len(),
        updates.len()
    );

    RecomputeReport {
        updated_count: updates.len(),
        updates,
    }
}
