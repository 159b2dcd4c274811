//! Revenue potential of a single company.
//!
//! Classification is first-match-wins: a company covered by a central
//! contract never gets a potential, a non-customer is priced as a new
//! customer, and a customer is checked for unlicensed agents before being
//! checked for underpayment.

use serde::Serialize;

use super::format::format_sek;
use super::{PricingTable, Sek};
use crate::crm::{Agent, Brand, Company};

pub const CENTRAL_CONTRACT_TIER: &str = "Centralt avtal";
pub const CENTRAL_CONTRACT_DESCRIPTION: &str = "Täcks av centralt avtal";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Opportunity {
    CentralContract,
    NewCustomer {
        agents: i64,
        price: Sek,
    },
    UpsellUnlicensed {
        unlicensed: i64,
        delta: Sek,
    },
    PriceCorrection {
        should_pay: Sek,
        delta: Sek,
    },
    NoOpportunity,
}

impl Opportunity {
    pub fn potential(&self) -> Sek {
        match self {
            Self::NewCustomer { price, .. } => *price,
            Self::UpsellUnlicensed { delta, .. } | Self::PriceCorrection { delta, .. } => *delta,
            Self::CentralContract | Self::NoOpportunity => 0,
        }
    }

    pub fn upsell(&self) -> Sek {
        match self {
            Self::UpsellUnlicensed { delta, .. } | Self::PriceCorrection { delta, .. } => *delta,
            _ => 0,
        }
    }

    pub fn description(&self) -> String {
        match self {
            Self::CentralContract => CENTRAL_CONTRACT_DESCRIPTION.to_string(),
            Self::NewCustomer { agents, price } => {
                format!("Ny kund: {agents} mäklare → {}/mån", format_sek(*price))
            }
            Self::UpsellUnlicensed { unlicensed, delta } => format!(
                "Upsell: {unlicensed} mäklare utan licens → +{}/mån",
                format_sek(*delta)
            ),
            Self::PriceCorrection { should_pay, delta } => format!(
                "Prisjustering: Borde betala {} → +{}/mån",
                format_sek(*should_pay),
                format_sek(*delta)
            ),
            Self::NoOpportunity => String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PotentialResult {
    pub potential: Sek,
    pub description: String,
    #[serde(rename = "currentMRR")]
    pub current_mrr: Sek,
    #[serde(rename = "maxMRR")]
    pub max_mrr: Sek,
    #[serde(rename = "upsellMRR")]
    pub upsell_mrr: Sek,
    /// Price for the licensed agents only. Reported, not classified on.
    #[serde(rename = "currentShouldBeMRR")]
    pub current_should_be_mrr: Sek,
    #[serde(rename = "totalAgents")]
    pub total_agents: i64,
    #[serde(rename = "activeAgents")]
    pub active_agents: i64,
    pub tier: String,
    #[serde(rename = "isCentral")]
    pub is_central: bool,
    pub opportunity: Opportunity,
}

/// Classifies the untapped revenue at `company`.
///
/// Agents belonging to other companies are ignored, so callers may pass a
/// wider roster than needed.
pub fn classify_potential(
    table: &PricingTable,
    company: &Company,
    agents: &[&Agent],
    brand: Option<&Brand>,
) -> PotentialResult {
    let roster: Vec<&Agent> = agents
        .iter()
        .copied()
        .filter(|a| a.company_id == company.id)
        .collect();
    let total_agents = roster.len() as i64;
    let active_agents = roster.iter().filter(|a| a.is_licensed()).count() as i64;
    let current_mrr = company.current_mrr();
    let is_customer = company.status.is_customer() || company.is_paying();

    let brand_covered = brand.is_some_and(Brand::has_active_central_contract);
    if company.central_contract || brand_covered {
        let opportunity = Opportunity::CentralContract;
        return PotentialResult {
            potential: 0,
            description: opportunity.description(),
            current_mrr,
            max_mrr: 0,
            upsell_mrr: 0,
            current_should_be_mrr: 0,
            total_agents,
            active_agents,
            tier: CENTRAL_CONTRACT_TIER.to_string(),
            is_central: true,
            opportunity,
        };
    }

    let max_mrr = table.price_for_agent_count(total_agents);
    // TODO: price correction compares against `current_mrr`; decide with sales
    // whether it should compare against this licensed-agent price instead.
    let current_should_be_mrr = table.price_for_agent_count(active_agents);
    let priced = total_agents >= i64::from(table.minimum_agents());

    // Deltas are whole kronor; the underpayment check uses the exact payment.
    let delta = max_mrr.saturating_sub(current_mrr);
    let opportunity = if !priced {
        Opportunity::NoOpportunity
    } else if !is_customer {
        Opportunity::NewCustomer {
            agents: total_agents,
            price: max_mrr,
        }
    } else if active_agents < total_agents {
        Opportunity::UpsellUnlicensed {
            unlicensed: total_agents - active_agents,
            delta,
        }
    } else if company.payment < max_mrr as f64 {
        Opportunity::PriceCorrection {
            should_pay: max_mrr,
            delta,
        }
    } else {
        Opportunity::NoOpportunity
    };

    PotentialResult {
        potential: opportunity.potential(),
        description: opportunity.description(),
        current_mrr,
        max_mrr,
        upsell_mrr: opportunity.upsell(),
        current_should_be_mrr,
        total_agents,
        active_agents,
        tier: table.tier_label(total_agents).to_string(),
        is_central: false,
        opportunity,
    }
}
