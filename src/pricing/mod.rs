//! Broker license pricing.
//!
//! A [`PricingTable`] maps the number of agents at a company to a monthly
//! license price in whole kronor. The table is validated once when it is
//! built, so lookups never fail.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub mod format;
pub mod potential;
pub mod recompute;

pub use format::format_sek;
pub use potential::{classify_potential, Opportunity, PotentialResult};
pub use recompute::{recompute_all, PotentialUpdate, RecomputeReport};

/// Whole Swedish kronor.
pub type Sek = i64;

pub const UNDER_MINIMUM_LABEL: &str = "Under minimum";

static STANDARD_TABLE: Lazy<PricingTable> = Lazy::new(|| PricingTable {
    tiers: vec![
        PricingTier::bounded(4, 6, 849, "4-6 medarbetare"),
        PricingTier::bounded(7, 9, 1099, "7-9 medarbetare"),
        PricingTier::bounded(10, 15, 1649, "10-15 medarbetare"),
        PricingTier::bounded(16, 20, 2099, "16-20 medarbetare"),
        PricingTier::unbounded(21, 2449, "21+ medarbetare"),
    ],
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingTier {
    pub min_agents: u32,
    /// `None` means the tier has no upper bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_agents: Option<u32>,
    pub monthly_price: Sek,
    pub label: String,
}

impl PricingTier {
    pub fn bounded(min_agents: u32, max_agents: u32, monthly_price: Sek, label: &str) -> Self {
        Self {
            min_agents,
            max_agents: Some(max_agents),
            monthly_price,
            label: label.to_string(),
        }
    }

    pub fn unbounded(min_agents: u32, monthly_price: Sek, label: &str) -> Self {
        Self {
            min_agents,
            max_agents: None,
            monthly_price,
            label: label.to_string(),
        }
    }

    pub fn contains(&self, agents: i64) -> bool {
        agents >= i64::from(self.min_agents)
            && self.max_agents.map_or(true, |max| agents <= i64::from(max))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PricingError {
    #[error("Pricing table has no tiers")]
    Empty,
    #[error("Tier '{label}' ends before it starts ({min}..{max})")]
    InvertedTier { label: String, min: u32, max: u32 },
    #[error("Gap between tier '{previous}' and '{next}'")]
    Gap { previous: String, next: String },
    #[error("Tier '{previous}' overlaps tier '{next}'")]
    Overlap { previous: String, next: String },
    #[error("Only the last tier may be unbounded, found '{0}'")]
    UnboundedNotLast(String),
    #[error("Last tier '{0}' must be unbounded")]
    BoundedLastTier(String),
    #[error("Tier '{0}' has a negative price")]
    NegativePrice(String),
    #[error("Tier '{next}' is cheaper than tier '{previous}'")]
    DecreasingPrice { previous: String, next: String },
    #[error("Failed to read pricing file: {0}")]
    Read(String),
    #[error("Failed to parse pricing file: {0}")]
    Parse(String),
}

#[derive(Debug, Deserialize)]
struct PricingFile {
    tiers: Vec<PricingTier>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PricingTable {
    tiers: Vec<PricingTier>,
}

impl PricingTable {
    /// Builds a table, rejecting gaps, overlaps and decreasing prices.
    pub fn new(tiers: Vec<PricingTier>) -> Result<Self, PricingError> {
        validate_tiers(&tiers)?;
        Ok(Self { tiers })
    }

    /// The broker license price list.
    pub fn standard() -> &'static PricingTable {
        &STANDARD_TABLE
    }

    pub fn from_toml(content: &str) -> Result<Self, PricingError> {
        let file: PricingFile =
            toml::from_str(content).map_err(|e| PricingError::Parse(e.to_string()))?;
        Self::new(file.tiers)
    }

    pub fn load_from_file(path: &Path) -> Result<Self, PricingError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| PricingError::Read(e.to_string()))?;
        Self::from_toml(&content)
    }

    pub fn tiers(&self) -> &[PricingTier] {
        &self.tiers
    }

    /// Smallest agent count that has a price.
    pub fn minimum_agents(&self) -> u32 {
        self.tiers.first().map_or(0, |t| t.min_agents)
    }

    pub fn tier_for(&self, agents: i64) -> Option<&PricingTier> {
        if agents < i64::from(self.minimum_agents()) {
            return None;
        }
        self.tiers.iter().find(|t| t.contains(agents))
    }

    /// Monthly price for `agents`; 0 below the lowest tier, negatives included.
    pub fn price_for_agent_count(&self, agents: i64) -> Sek {
        self.tier_for(agents).map_or(0, |t| t.monthly_price)
    }

    pub fn tier_label(&self, agents: i64) -> &str {
        self.tier_for(agents)
            .map_or(UNDER_MINIMUM_LABEL, |t| t.label.as_str())
    }
}

impl Default for PricingTable {
    fn default() -> Self {
        Self::standard().clone()
    }
}

/// Price for `agents` under the standard table.
pub fn price_for_agent_count(agents: i64) -> Sek {
    PricingTable::standard().price_for_agent_count(agents)
}

fn validate_tiers(tiers: &[PricingTier]) -> Result<(), PricingError> {
    let last = tiers.last().ok_or(PricingError::Empty)?;
    if last.max_agents.is_some() {
        return Err(PricingError::BoundedLastTier(last.label.clone()));
    }

    for tier in tiers {
        if tier.monthly_price < 0 {
            return Err(PricingError::NegativePrice(tier.label.clone()));
        }
        if let Some(max) = tier.max_agents {
            if max < tier.min_agents {
                return Err(PricingError::InvertedTier {
                    label: tier.label.clone(),
                    min: tier.min_agents,
                    max,
                });
            }
        }
    }

    for pair in tiers.windows(2) {
        let (previous, next) = (&pair[0], &pair[1]);
        let Some(max) = previous.max_agents else {
            return Err(PricingError::UnboundedNotLast(previous.label.clone()));
        };

        let expected = u64::from(max) + 1;
        let start = u64::from(next.min_agents);
        if start > expected {
            return Err(PricingError::Gap {
                previous: previous.label.clone(),
                next: next.label.clone(),
            });
        }
        if start < expected {
            return Err(PricingError::Overlap {
                previous: previous.label.clone(),
                next: next.label.clone(),
            });
        }
        if next.monthly_price < previous.monthly_price {
            return Err(PricingError::DecreasingPrice {
                previous: previous.label.clone(),
                next: next.label.clone(),
            });
        }
    }

    Ok(())
}
