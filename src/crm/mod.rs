//! Brand, company and agent records as the CRM stores them.
//!
//! Records come from a document store that has been edited by hand and by
//! import scripts over the years, so decoding is lenient: unknown statuses,
//! `null`s and non-numeric payments decode to defaults instead of failing.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::pricing::Sek;

pub mod stats;
pub mod store;

pub use store::{CrmStore, StoreError};

/// Read-only lookups the pricing engine needs from a CRM data source.
pub trait CrmDirectory {
    fn agents_of(&self, company_id: &str) -> Vec<&Agent>;
    fn brand(&self, brand_id: &str) -> Option<&Brand>;

    fn brand_of(&self, company: &Company) -> Option<&Brand> {
        company.brand_id.as_deref().and_then(|id| self.brand(id))
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum CompanyStatus {
    #[serde(rename = "kund", alias = "customer")]
    Customer,
    #[serde(rename = "prospekt", alias = "prospect")]
    Prospect,
    #[serde(rename = "inaktiv", alias = "inactive")]
    Inactive,
    #[default]
    #[serde(rename = "unknown", other)]
    Unknown,
}

impl CompanyStatus {
    pub fn is_customer(&self) -> bool {
        matches!(self, Self::Customer)
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum LicenseStatus {
    #[serde(rename = "aktiv", alias = "active")]
    Active,
    #[serde(rename = "ingen", alias = "none")]
    NoLicense,
    #[serde(rename = "test")]
    Test,
    #[default]
    #[serde(rename = "other", other)]
    Other,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AgentLicense {
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: LicenseStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub company_id: String,
    #[serde(default, alias = "licens", deserialize_with = "lenient_object")]
    pub license: Option<AgentLicense>,
}

impl Agent {
    pub fn is_licensed(&self) -> bool {
        self.license
            .as_ref()
            .is_some_and(|l| l.status == LicenseStatus::Active)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub brand_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: CompanyStatus,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub payment: f64,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub central_contract: bool,
    #[serde(default, deserialize_with = "lenient_optional_amount")]
    pub potential_value: Option<Sek>,
}

impl Company {
    pub fn is_paying(&self) -> bool {
        self.payment > 0.0
    }

    /// Current monthly payment rounded to whole kronor.
    pub fn current_mrr(&self) -> Sek {
        if self.payment.is_finite() {
            self.payment.round() as Sek
        } else {
            0
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CentralContract {
    #[serde(default, deserialize_with = "lenient_flag")]
    pub active: bool,
    #[serde(default, deserialize_with = "lenient_optional_amount")]
    pub mrr: Option<Sek>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Brand {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_object")]
    pub central_contract: Option<CentralContract>,
}

impl Brand {
    pub fn has_active_central_contract(&self) -> bool {
        self.central_contract.as_ref().is_some_and(|c| c.active)
    }

    /// Monthly fee of the active central contract, when one is recorded.
    pub fn central_contract_mrr(&self) -> Option<Sek> {
        self.central_contract
            .as_ref()
            .filter(|c| c.active)
            .and_then(|c| c.mrr)
            .filter(|mrr| *mrr > 0)
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Decodes `T` from an object; anything else, or an object that does not
/// fit, is `None`.
fn lenient_object<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .filter(Value::is_object)
        .and_then(|v| serde_json::from_value(v).ok()))
}

fn parse_amount(value: &Value) -> Option<f64> {
    let amount = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) if s.trim().is_empty() => Some(0.0),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    amount.filter(|v| v.is_finite())
}

fn lenient_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(parse_amount).unwrap_or(0.0))
}

fn lenient_optional_amount<'de, D>(deserializer: D) -> Result<Option<Sek>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(parse_amount)
        .map(|v| v.round() as Sek))
}

/// `true`, or a contract object whose `active` flag is `true`.
fn lenient_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Bool(b)) => b,
        Some(Value::Object(map)) => matches!(map.get("active"), Some(Value::Bool(true))),
        _ => false,
    })
}
