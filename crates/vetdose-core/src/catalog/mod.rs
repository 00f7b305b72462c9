//! Drug catalog access.
//!
//! The dosage service reads dosing rules through [`DrugCatalog`]; storage is
//! owned by the host. [`MemoryCatalog`] backs tests and embedded use.

mod memory;

pub use memory::*;

use thiserror::Error;

use crate::models::{DrugKind, DrugProfile, DrugValidationError};

/// Catalog errors.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Invalid drug data: {0}")]
    Invalid(#[from] DrugValidationError),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Source of drug dosing rules.
pub trait DrugCatalog {
    /// Get a drug by kind and ID.
    fn find_drug(&self, kind: DrugKind, id: u64) -> CatalogResult<Option<DrugProfile>>;

    /// Search drugs of a kind by name or active ingredient.
    fn search_drugs(&self, kind: DrugKind, query: &str, limit: usize)
        -> CatalogResult<Vec<DrugProfile>>;
}
