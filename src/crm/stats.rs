//! Dashboard statistics over a CRM snapshot.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{CrmDirectory, CrmStore};
use crate::pricing::{classify_potential, PricingTable, Sek};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BrandStatus {
    #[serde(rename = "kund")]
    Customer,
    #[serde(rename = "blandad")]
    Mixed,
    #[serde(rename = "prospekt")]
    Prospect,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandSummary {
    pub brand_id: String,
    pub brand_name: String,
    pub company_count: usize,
    pub agent_count: usize,
    pub mrr: Sek,
    pub status: BrandStatus,
    pub central_contract: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_brands: usize,
    pub total_companies: usize,
    pub total_agents: usize,
    pub active_licenses: usize,
    pub coverage: u32,
    #[serde(rename = "totalMRR")]
    pub total_mrr: Sek,
    pub potential: Sek,
    pub brand_breakdown: Vec<BrandSummary>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TierBreakdown {
    pub label: String,
    pub price: Sek,
    pub companies: usize,
    pub total: Sek,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CompanyCounts {
    pub total: usize,
    pub customers: usize,
    pub prospects: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AgentCounts {
    pub total: usize,
    pub active: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandCounts {
    pub total: usize,
    pub with_central_contract: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MrrTotals {
    pub total: Sek,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Overview {
    pub companies: CompanyCounts,
    pub agents: AgentCounts,
    pub brands: BrandCounts,
    pub mrr: MrrTotals,
}

fn saturating_total(amounts: impl Iterator<Item = Sek>) -> Sek {
    amounts.fold(0, Sek::saturating_add)
}

fn customer_count<'a>(companies: impl Iterator<Item = &'a super::Company>) -> usize {
    companies.filter(|c| c.status.is_customer()).count()
}

pub fn brand_breakdown(store: &CrmStore, table: &PricingTable) -> Vec<BrandSummary> {
    let mut summaries: Vec<BrandSummary> = store
        .brands()
        .iter()
        .map(|brand| {
            let companies: Vec<_> = store.companies_of_brand(&brand.id).collect();
            let company_count = companies.len();
            let agent_counts: Vec<usize> =
                companies.iter().map(|c| store.agents_of(&c.id).len()).collect();
            let agent_count = agent_counts.iter().sum();

            let mrr = brand.central_contract_mrr().unwrap_or_else(|| {
                saturating_total(companies.iter().zip(&agent_counts).map(
                    |(company, agents)| match company.current_mrr() {
                        0 => table.price_for_agent_count(*agents as i64),
                        paid => paid,
                    },
                ))
            });

            let customers = customer_count(companies.iter().copied());
            let status = if brand.has_active_central_contract()
                || (company_count > 0 && customers == company_count)
            {
                BrandStatus::Customer
            } else if customers > 0 {
                BrandStatus::Mixed
            } else {
                BrandStatus::Prospect
            };

            BrandSummary {
                brand_id: brand.id.clone(),
                brand_name: brand.name.clone(),
                company_count,
                agent_count,
                mrr,
                status,
                central_contract: brand.has_active_central_contract(),
            }
        })
        .collect();

    summaries.sort_by(|a, b| b.agent_count.cmp(&a.agent_count));
    summaries
}

/// Sum of every positive classified potential.
pub fn total_potential(store: &CrmStore, table: &PricingTable) -> Sek {
    saturating_total(
        store
            .companies()
            .iter()
            .map(|company| {
                let agents = store.agents_of(&company.id);
                classify_potential(table, company, &agents, store.brand_of(company)).potential
            })
            .filter(|p| *p > 0),
    )
}

pub fn dashboard(store: &CrmStore, table: &PricingTable) -> DashboardStats {
    let total_companies = store.companies().len();
    let customers = customer_count(store.companies().iter());
    let coverage = if total_companies > 0 {
        ((customers as f64 / total_companies as f64) * 100.0).round() as u32
    } else {
        0
    };

    let brand_breakdown = brand_breakdown(store, table);
    let total_mrr = saturating_total(brand_breakdown.iter().map(|b| b.mrr));

    DashboardStats {
        total_brands: store.brands().len(),
        total_companies,
        total_agents: store.agents().len(),
        active_licenses: store.agents().iter().filter(|a| a.is_licensed()).count(),
        coverage,
        total_mrr,
        potential: total_potential(store, table),
        brand_breakdown,
        timestamp: Utc::now(),
    }
}

/// Companies and revenue per price tier, by each company's total agent count.
pub fn mrr_breakdown(store: &CrmStore, table: &PricingTable) -> Vec<TierBreakdown> {
    let mut breakdown: Vec<TierBreakdown> = table
        .tiers()
        .iter()
        .map(|tier| TierBreakdown {
            label: tier.label.clone(),
            price: tier.monthly_price,
            companies: 0,
            total: 0,
        })
        .collect();

    for company in store.companies() {
        let agents = store.agents_of(&company.id).len() as i64;
        let Some(idx) = table.tiers().iter().position(|t| t.contains(agents)) else {
            continue;
        };
        breakdown[idx].companies += 1;
        breakdown[idx].total = breakdown[idx].total.saturating_add(breakdown[idx].price);
    }

    breakdown
}

pub fn overview(store: &CrmStore) -> Overview {
    let companies = store.companies();
    let customers = customer_count(companies.iter());

    let contract_mrr =
        saturating_total(store.brands().iter().filter_map(|b| b.central_contract_mrr()));
    let direct_mrr = saturating_total(
        companies
            .iter()
            .filter(|c| !store.brand_of(c).is_some_and(|b| b.has_active_central_contract()))
            .map(|c| c.current_mrr())
            .filter(|mrr| *mrr > 0),
    );

    Overview {
        companies: CompanyCounts {
            total: companies.len(),
            customers,
            // Everyone who is not a customer, inactive and unknown included.
            prospects: companies.len() - customers,
        },
        agents: AgentCounts {
            total: store.agents().len(),
            active: store.agents().iter().filter(|a| a.is_licensed()).count(),
        },
        brands: BrandCounts {
            total: store.brands().len(),
            with_central_contract: store
                .brands()
                .iter()
                .filter(|b| b.has_active_central_contract())
                .count(),
        },
        mrr: MrrTotals {
            total: contract_mrr.saturating_add(direct_mrr),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> CrmStore {
        let agents: Vec<String> = [("c1", 12, 12), ("c2", 8, 6), ("c3", 15, 0), ("c4", 6, 6), ("c5", 2, 0)]
            .iter()
            .flat_map(|(company, total, active)| {
                (0..*total).map(move |i| {
                    let status = if i < *active { "aktiv" } else { "ingen" };
                    format!(
                        r#"{{ "_id": "{company}-{i}", "companyId": "{company}", "licens": {{ "status": "{status}" }} }}"#
                    )
                })
            })
            .collect();

        let json = format!(
            r#"{{
                "brands": [
                    {{ "_id": "era", "name": "ERA Mäklare", "centralContract": {{ "active": true, "mrr": 125000 }} }},
                    {{ "_id": "mh", "name": "Mäklarhuset", "centralContract": {{ "active": false }} }},
                    {{ "_id": "sf", "name": "Svensk Fastighetsförmedling" }}
                ],
                "companies": [
                    {{ "_id": "c1", "brandId": "era", "status": "kund", "payment": 1649 }},
                    {{ "_id": "c2", "brandId": "mh", "status": "kund", "payment": 849 }},
                    {{ "_id": "c3", "brandId": "mh", "status": "prospekt" }},
                    {{ "_id": "c4", "brandId": "sf", "status": "kund", "payment": 849 }},
                    {{ "_id": "c5", "status": "prospekt" }}
                ],
                "agents": [{}]
            }}"#,
            agents.join(",")
        );

        CrmStore::from_json(&json).unwrap()
    }

    #[test]
    fn test_brand_breakdown() {
        let breakdown = brand_breakdown(&store(), PricingTable::standard());
        let names: Vec<&str> = breakdown.iter().map(|b| b.brand_id.as_str()).collect();
        assert_eq!(names, vec!["mh", "era", "sf"]);

        let mh = &breakdown[0];
        assert_eq!(mh.company_count, 2);
        assert_eq!(mh.agent_count, 23);
        // c2 pays 849, c3 pays nothing so it is priced at its 15 agents.
        assert_eq!(mh.mrr, 849 + 1649);
        assert_eq!(mh.status, BrandStatus::Mixed);
        assert!(!mh.central_contract);

        let era = &breakdown[1];
        assert_eq!(era.mrr, 125_000);
        assert_eq!(era.status, BrandStatus::Customer);
        assert!(era.central_contract);

        let sf = &breakdown[2];
        assert_eq!(sf.mrr, 849);
        assert_eq!(sf.status, BrandStatus::Customer);
    }

    #[test]
    fn test_brand_without_companies_is_prospect() {
        let store = CrmStore::from_json(r#"{ "brands": [{ "_id": "b1", "name": "Tom" }] }"#).unwrap();
        let breakdown = brand_breakdown(&store, PricingTable::standard());
        assert_eq!(breakdown[0].status, BrandStatus::Prospect);
        assert_eq!(breakdown[0].mrr, 0);
    }

    #[test]
    fn test_dashboard() {
        let stats = dashboard(&store(), PricingTable::standard());
        assert_eq!(stats.total_brands, 3);
        assert_eq!(stats.total_companies, 5);
        assert_eq!(stats.total_agents, 43);
        assert_eq!(stats.active_licenses, 24);
        assert_eq!(stats.coverage, 60);
        assert_eq!(stats.total_mrr, 125_000 + 849 + 1649 + 849);
        // c2 upsell 250, c3 new customer 1649, c4 and c5 nothing, c1 central.
        assert_eq!(stats.potential, 250 + 1649);
    }

    #[test]
    fn test_dashboard_of_empty_store() {
        let stats = dashboard(&CrmStore::default(), PricingTable::standard());
        assert_eq!(stats.coverage, 0);
        assert_eq!(stats.total_mrr, 0);
        assert_eq!(stats.potential, 0);
        assert!(stats.brand_breakdown.is_empty());
    }

    #[test]
    fn test_mrr_breakdown() {
        let breakdown = mrr_breakdown(&store(), PricingTable::standard());
        assert_eq!(breakdown.len(), 5);

        let counts: Vec<usize> = breakdown.iter().map(|t| t.companies).collect();
        assert_eq!(counts, vec![1, 1, 2, 0, 0]);
        assert_eq!(breakdown[2].label, "10-15 medarbetare");
        assert_eq!(breakdown[2].total, 2 * 1649);
    }

    #[test]
    fn test_overview() {
        let overview = overview(&store());
        assert_eq!(
            overview.companies,
            CompanyCounts {
                total: 5,
                customers: 3,
                prospects: 2
            }
        );
        assert_eq!(overview.agents, AgentCounts { total: 43, active: 24 });
        assert_eq!(
            overview.brands,
            BrandCounts {
                total: 3,
                with_central_contract: 1
            }
        );
        // c1 is covered by the ERA contract, so only c2 and c4 add to it.
        assert_eq!(overview.mrr.total, 125_000 + 849 + 849);
    }

    #[test]
    fn test_overview_counts_every_non_customer_as_prospect() {
        let store = CrmStore::from_json(
            r#"{
                "companies": [
                    { "_id": "c1", "status": "kund" },
                    { "_id": "c2", "status": "inaktiv" },
                    { "_id": "c3" },
                    { "_id": "c4", "status": "prospekt" }
                ]
            }"#,
        )
        .unwrap();

        let overview = overview(&store);
        assert_eq!(overview.companies.customers, 1);
        assert_eq!(overview.companies.prospects, 3);
    }

    #[test]
    fn test_totals_saturate_on_extreme_payments() {
        let store = CrmStore::from_json(
            r#"{
                "brands": [{ "_id": "b1", "name": "Dyrbar" }],
                "companies": [
                    { "_id": "c1", "brandId": "b1", "status": "kund", "payment": 1e300 },
                    { "_id": "c2", "brandId": "b1", "status": "kund", "payment": 1e300 },
                    { "_id": "c3", "status": "kund", "payment": -1e30 }
                ]
            }"#,
        )
        .unwrap();

        let stats = dashboard(&store, PricingTable::standard());
        assert_eq!(stats.brand_breakdown[0].mrr, Sek::MAX);
        assert_eq!(stats.total_mrr, Sek::MAX);
        assert_eq!(overview(&store).mrr.total, Sek::MAX);
    }
}
