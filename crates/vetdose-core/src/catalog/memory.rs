//! In-memory drug catalog.

use std::collections::BTreeMap;

use super::{CatalogResult, DrugCatalog};
use crate::models::{DrugKind, DrugProfile};

/// Drug catalog held in memory, one table per [`DrugKind`].
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    standard: BTreeMap<u64, DrugProfile>,
    custom: BTreeMap<u64, DrugProfile>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self, kind: DrugKind) -> &BTreeMap<u64, DrugProfile> {
        match kind {
            DrugKind::Standard => &self.standard,
            DrugKind::Custom => &self.custom,
        }
    }

    /// Insert or replace a drug after validating it.
    pub fn upsert_drug(&mut self, drug: DrugProfile) -> CatalogResult<()> {
        drug.validate()?;
        let table = match drug.kind {
            DrugKind::Standard => &mut self.standard,
            DrugKind::Custom => &mut self.custom,
        };
        table.insert(drug.id, drug);
        Ok(())
    }

    /// Remove a drug, returning it if present.
    pub fn remove_drug(&mut self, kind: DrugKind, id: u64) -> Option<DrugProfile> {
        match kind {
            DrugKind::Standard => self.standard.remove(&id),
            DrugKind::Custom => self.custom.remove(&id),
        }
    }

    /// Total number of drugs across both tables.
    pub fn len(&self) -> usize {
        self.standard.len() + self.custom.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DrugCatalog for MemoryCatalog {
    fn find_drug(&self, kind: DrugKind, id: u64) -> CatalogResult<Option<DrugProfile>> {
        Ok(self.table(kind).get(&id).cloned())
    }

    fn search_drugs(
        &self,
        kind: DrugKind,
        query: &str,
        limit: usize,
    ) -> CatalogResult<Vec<DrugProfile>> {
        let needle = query.trim().to_lowercase();
        Ok(self
            .table(kind)
            .values()
            .filter(|drug| {
                needle.is_empty()
                    || drug.name.to_lowercase().contains(&needle)
                    || drug.active_ingredient.to_lowercase().contains(&needle)
            })
            .take(limit)
            .cloned()
            .collect())
    }
}
