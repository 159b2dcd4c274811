use log::{info, warn};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use super::{Agent, Brand, Company, CrmDirectory};
use crate::pricing::{recompute_all, PotentialUpdate, PricingTable, RecomputeReport};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to read CRM snapshot: {0}")]
    Read(String),
    #[error("Failed to parse CRM snapshot: {0}")]
    Parse(String),
}

#[derive(Debug, Default, Deserialize)]
struct Snapshot {
    #[serde(default)]
    brands: Vec<Brand>,
    #[serde(default)]
    companies: Vec<Company>,
    #[serde(default)]
    agents: Vec<Agent>,
}

/// In-memory snapshot of the CRM collections.
#[derive(Debug, Clone, Default)]
pub struct CrmStore {
    brands: Vec<Brand>,
    companies: Vec<Company>,
    agents: Vec<Agent>,
    agents_by_company: HashMap<String, Vec<usize>>,
}

impl CrmStore {
    pub fn new(brands: Vec<Brand>, companies: Vec<Company>, agents: Vec<Agent>) -> Self {
        let mut agents_by_company: HashMap<String, Vec<usize>> = HashMap::new();
        for (idx, agent) in agents.iter().enumerate() {
            agents_by_company
                .entry(agent.company_id.clone())
                .or_default()
                .push(idx);
        }

        Self {
            brands,
            companies,
            agents,
            agents_by_company,
        }
    }

    pub fn from_json(content: &str) -> Result<Self, StoreError> {
        let snapshot: Snapshot =
            serde_json::from_str(content).map_err(|e| StoreError::Parse(e.to_string()))?;
        Ok(Self::new(snapshot.brands, snapshot.companies, snapshot.agents))
    }

    pub async fn load_from_file(path: &Path) -> Result<Self, StoreError> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| StoreError::Read(e.to_string()))?;

        let store = Self::from_json(&content)?;
        info!(
            "Loaded CRM snapshot from {}: {} brands, {} companies, {} agents",
            path.display(),
            store.brands.len(),
            store.companies.len(),
            store.agents.len()
        );

        let orphans = store
            .agents
            .iter()
            .filter(|a| store.company(&a.company_id).is_none())
            .count();
        if orphans > 0 {
            warn!("{orphans} agents reference companies missing from the snapshot");
        }

        Ok(store)
    }

    pub fn brands(&self) -> &[Brand] {
        &self.brands
    }

    pub fn companies(&self) -> &[Company] {
        &self.companies
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn company(&self, company_id: &str) -> Option<&Company> {
        self.companies.iter().find(|c| c.id == company_id)
    }

    pub fn companies_of_brand<'a>(&'a self, brand_id: &'a str) -> impl Iterator<Item = &'a Company> {
        self.companies
            .iter()
            .filter(move |c| c.brand_id.as_deref() == Some(brand_id))
    }

    /// Writes recomputed potentials back onto their companies.
    pub fn apply_updates(&mut self, updates: &[PotentialUpdate]) -> usize {
        let mut applied = 0;
        for update in updates {
            if let Some(company) = self
                .companies
                .iter_mut()
                .find(|c| c.id == update.company_id)
            {
                company.potential_value = Some(update.potential);
                applied += 1;
            }
        }
        applied
    }

    pub fn recompute_potentials(&mut self, table: &PricingTable) -> RecomputeReport {
        let report = recompute_all(table, &self.companies, &*self);
        self.apply_updates(&report.updates);
        report
    }
}

impl CrmDirectory for CrmStore {
    fn agents_of(&self, company_id: &str) -> Vec<&Agent> {
        self.agents_by_company
            .get(company_id)
            .map(|indices| indices.iter().map(|&i| &self.agents[i]).collect())
            .unwrap_or_default()
    }

    fn brand(&self, brand_id: &str) -> Option<&Brand> {
        self.brands.iter().find(|b| b.id == brand_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::Sek;
    use std::io::Write;

    const SNAPSHOT: &str = r#"{
        "brands": [
            { "_id": "b1", "name": "ERA Mäklare", "centralContract": { "active": true, "mrr": 125000 } },
            { "_id": "b2", "name": "Mäklarhuset", "centralContract": { "active": false } }
        ],
        "companies": [
            { "_id": "c1", "name": "ERA Lund", "brandId": "b1", "status": "kund", "payment": 1649 },
            { "_id": "c2", "name": "Mäklarhuset Kalmar", "brandId": "b2", "status": "prospekt" }
        ],
        "agents": [
            { "_id": "a1", "companyId": "c1", "licens": { "status": "aktiv" } },
            { "_id": "a2", "companyId": "c2", "licens": { "status": "ingen" } },
            { "_id": "a3", "companyId": "c2" },
            { "_id": "a4", "companyId": "gone" }
        ]
    }"#;

    #[test]
    fn test_from_json() {
        let store = CrmStore::from_json(SNAPSHOT).unwrap();
        assert_eq!(store.brands().len(), 2);
        assert_eq!(store.companies().len(), 2);
        assert_eq!(store.agents().len(), 4);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(matches!(
            CrmStore::from_json("[1, 2"),
            Err(StoreError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_collections_default_to_empty() {
        let store = CrmStore::from_json(r#"{ "companies": [] }"#).unwrap();
        assert!(store.brands().is_empty());
        assert!(store.agents().is_empty());
    }

    #[test]
    fn test_directory_lookups() {
        let store = CrmStore::from_json(SNAPSHOT).unwrap();

        let ids: Vec<&str> = store.agents_of("c2").iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["a2", "a3"]);
        assert!(store.agents_of("nope").is_empty());

        let c1 = store.company("c1").unwrap();
        assert_eq!(store.brand_of(c1).map(|b| b.name.as_str()), Some("ERA Mäklare"));
        assert!(store.brand("b9").is_none());
        assert_eq!(store.companies_of_brand("b2").count(), 1);
    }

    #[test]
    fn test_apply_updates_skips_unknown_companies() {
        let mut store = CrmStore::from_json(SNAPSHOT).unwrap();
        let applied = store.apply_updates(&[
            PotentialUpdate {
                company_id: "c2".to_string(),
                previous: None,
                potential: 849,
            },
            PotentialUpdate {
                company_id: "missing".to_string(),
                previous: None,
                potential: 1,
            },
        ]);

        assert_eq!(applied, 1);
        assert_eq!(store.company("c2").unwrap().potential_value, Some(849));
    }

    #[test]
    fn test_recompute_potentials_persists_values() {
        let mut store = CrmStore::from_json(SNAPSHOT).unwrap();

        let report = store.recompute_potentials(PricingTable::standard());
        assert_eq!(report.updated_count, 2);
        assert_eq!(store.company("c1").unwrap().potential_value, Some(0));
        assert_eq!(store.company("c2").unwrap().potential_value, Some(0));

        let again = store.recompute_potentials(PricingTable::standard());
        assert_eq!(again.updated_count, 0);
    }

    #[test]
    fn test_malformed_records_do_not_reject_the_snapshot() {
        let store = CrmStore::from_json(
            r#"{
                "brands": [{ "_id": "b1", "name": "ERA Mäklare", "centralContract": true }],
                "companies": [{ "_id": "c1", "name": null, "brandId": "b1", "status": "kund" }],
                "agents": [{ "_id": "a1", "companyId": "c1", "licens": "aktiv" }]
            }"#,
        )
        .unwrap();

        let company = store.company("c1").unwrap();
        assert!(!store.brand_of(company).unwrap().has_active_central_contract());
        assert!(!store.agents()[0].is_licensed());
    }

    #[test]
    fn test_recompute_with_extreme_payments() {
        let agents: Vec<String> = (0..8)
            .map(|i| {
                let status = if i < 6 { "aktiv" } else { "ingen" };
                format!(r#"{{ "_id": "a{i}", "companyId": "c1", "licens": {{ "status": "{status}" }} }}"#)
            })
            .collect();
        let json = format!(
            r#"{{
                "companies": [
                    {{ "_id": "c1", "status": "kund", "payment": -1e30 }},
                    {{ "_id": "c2", "status": "kund", "payment": 1e300 }}
                ],
                "agents": [{}]
            }}"#,
            agents.join(",")
        );
        let mut store = CrmStore::from_json(&json).unwrap();

        let report = store.recompute_potentials(PricingTable::standard());
        assert_eq!(report.updated_count, 2);
        assert_eq!(store.company("c1").unwrap().potential_value, Some(Sek::MAX));
        assert_eq!(store.company("c2").unwrap().potential_value, Some(0));
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SNAPSHOT.as_bytes()).unwrap();

        let store = CrmStore::load_from_file(file.path()).await.unwrap();
        assert_eq!(store.companies().len(), 2);
    }

    #[tokio::test]
    async fn test_load_from_missing_file() {
        let result = CrmStore::load_from_file(Path::new("/nonexistent/crm.json")).await;
        assert!(matches!(result, Err(StoreError::Read(_))));
    }
}
