use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::AppConfig;
use crate::crm::CrmStore;
use crate::pricing::PricingTable;

pub struct AppState {
    pub config: AppConfig,
    pub pricing: PricingTable,
    pub store: RwLock<CrmStore>,
}

impl AppState {
    pub fn new(config: AppConfig, pricing: PricingTable, store: CrmStore) -> Arc<Self> {
        Arc::new(Self {
            config,
            pricing,
            store: RwLock::new(store),
        })
    }
}
