use log::info;
use std::path::PathBuf;

use crate::pricing::{PricingError, PricingTable};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub server: ServerConfig,
    /// JSON snapshot of brands, companies and agents.
    pub data_path: Option<PathBuf>,
    /// TOML price list replacing the standard tiers.
    pub pricing_path: Option<PathBuf>,
    pub recompute_on_start: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            data_path: None,
            pricing_path: None,
            recompute_on_start: true,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| get(key).filter(|v| !v.trim().is_empty());

        let port = match non_empty("CRM_SERVER_PORT") {
            Some(v) => v.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "CRM_SERVER_PORT",
                value: v.clone(),
            })?,
            None => defaults.server.port,
        };

        let recompute_on_start = match non_empty("CRM_RECOMPUTE_ON_START") {
            Some(v) => parse_bool(&v).ok_or(ConfigError::InvalidValue {
                key: "CRM_RECOMPUTE_ON_START",
                value: v.clone(),
            })?,
            None => defaults.recompute_on_start,
        };

        Ok(Self {
            server: ServerConfig {
                host: non_empty("CRM_SERVER_HOST").unwrap_or(defaults.server.host),
                port,
            },
            data_path: non_empty("CRM_DATA_PATH").map(PathBuf::from),
            pricing_path: non_empty("CRM_PRICING_PATH").map(PathBuf::from),
            recompute_on_start,
        })
    }

    /// The configured price list, or the standard one. Any table defect is
    /// returned as an error so startup can abort.
    pub fn pricing_table(&self) -> Result<PricingTable, ConfigError> {
        match &self.pricing_path {
            Some(path) => {
                let table = PricingTable::load_from_file(path)?;
                info!(
                    "Loaded {} pricing tiers from {}",
                    table.tiers().len(),
                    path.display()
                );
                Ok(table)
            }
            None => Ok(PricingTable::standard().clone()),
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
