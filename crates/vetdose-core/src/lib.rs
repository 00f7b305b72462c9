//! VetDose Core Library
//!
//! Dosage calculation and unit conversion engine for veterinary drug
//! information.
//!
//! # Architecture
//!
//! ```text
//!   DosageRequest (drug id, weight, species, target unit)
//!         │
//!         ▼
//!   DosageService ── DrugCatalog ──► DrugProfile (dose per weight, unit)
//!         │
//!         ▼
//!   dosage::calculate ── weight factor × base dose
//!         │
//!         ▼
//!   units::convert ──── family check, base-unit scaling, round half-up
//!         │
//!         ▼
//!   DosageResult { calculated_dose: "250.00000", unit: "mg" }
//! ```
//!
//! # Core Principle
//!
//! **Every dose is exact decimal.** No binary floating point touches a dose;
//! every result carries exactly five fractional digits.
//!
//! # Modules
//!
//! - [`units`]: Unit families, compatibility and conversion
//! - [`dosage`]: Weight-scaled dose calculation
//! - [`models`]: Domain types (DrugProfile, DosageRequest, DosageResult)
//! - [`catalog`]: Drug catalog seam and in-memory catalog
//! - [`service`]: Request-level validation, logging and history
//! - [`history`]: Search history log
//! - [`config`]: Service configuration

pub mod catalog;
pub mod config;
pub mod dosage;
pub mod history;
pub mod models;
pub mod service;
pub mod units;

// Re-export commonly used types
pub use catalog::{DrugCatalog, MemoryCatalog};
pub use config::DosageConfig;
pub use dosage::{calculate, CalculatedDose, DosageError, WeightBasis};
pub use models::{DosageRequest, DosageResult, DrugKind, DrugProfile};
pub use service::{DosageService, ServiceError};
pub use units::{convert, family_of, is_compatible, round_dose, UnitFamily};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::str::FromStr;
use std::sync::{Arc, Mutex};

use rust_decimal::Decimal;

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
#[uniffi(flat_error)]
pub enum VetDoseError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid weight: {0}")]
    InvalidWeight(String),

    #[error("Invalid dose: {0}")]
    InvalidDose(String),

    #[error("Incompatible units: {0}")]
    IncompatibleUnits(String),

    #[error("Unknown unit: {0}")]
    UnknownUnit(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<DosageError> for VetDoseError {
    fn from(e: DosageError) -> Self {
        let message = e.to_string();
        match e {
            DosageError::InvalidWeight(_) => VetDoseError::InvalidWeight(message),
            DosageError::InvalidDose(_) => VetDoseError::InvalidDose(message),
            DosageError::InvalidPerWeightReference(_) => VetDoseError::InvalidInput(message),
            DosageError::IncompatibleUnits { .. } => VetDoseError::IncompatibleUnits(message),
            DosageError::UnknownUnit(code) => VetDoseError::UnknownUnit(code),
            DosageError::Overflow(_) => VetDoseError::CalculationError(message),
        }
    }
}

impl From<units::ConversionError> for VetDoseError {
    fn from(e: units::ConversionError) -> Self {
        DosageError::from(e).into()
    }
}

impl From<ServiceError> for VetDoseError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Calculation(inner) => inner.into(),
            ServiceError::Conversion(inner) => inner.into(),
            ServiceError::WeightOutOfRange { .. } => VetDoseError::InvalidWeight(e.to_string()),
            ServiceError::DrugNotFound { .. } => VetDoseError::NotFound(e.to_string()),
            ServiceError::AccessDenied { .. } => VetDoseError::AccessDenied(e.to_string()),
            ServiceError::InvalidDrug { .. } => VetDoseError::InvalidInput(e.to_string()),
            ServiceError::SpeciesMismatch { .. } => VetDoseError::InvalidInput(e.to_string()),
            ServiceError::Catalog(_) => VetDoseError::InvalidInput(e.to_string()),
            ServiceError::Config(_) | ServiceError::UnitTable(_) => {
                VetDoseError::ConfigError(e.to_string())
            }
        }
    }
}

impl From<catalog::CatalogError> for VetDoseError {
    fn from(e: catalog::CatalogError) -> Self {
        VetDoseError::InvalidInput(e.to_string())
    }
}

impl From<config::ConfigError> for VetDoseError {
    fn from(e: config::ConfigError) -> Self {
        VetDoseError::ConfigError(e.to_string())
    }
}

impl From<models::DrugValidationError> for VetDoseError {
    fn from(e: models::DrugValidationError) -> Self {
        VetDoseError::InvalidInput(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for VetDoseError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        VetDoseError::CalculationError(format!("Lock poisoned: {}", e))
    }
}

fn parse_decimal(field: &str, value: &str) -> Result<Decimal, VetDoseError> {
    Decimal::from_str(value.trim())
        .map_err(|e| VetDoseError::InvalidInput(format!("{} '{}': {}", field, value, e)))
}

/// Map the Greek small letter mu (U+03BC), common in host-stored unit codes,
/// to the micro sign (U+00B5) the unit tables use.
fn normalize_unit(code: String) -> String {
    if code.contains('\u{03bc}') {
        code.replace('\u{03bc}', "\u{00b5}")
    } else {
        code
    }
}

fn parse_optional_decimal(
    field: &str,
    value: Option<String>,
) -> Result<Option<Decimal>, VetDoseError> {
    value.map(|v| parse_decimal(field, &v)).transpose()
}

// =========================================================================
// Engine Functions (exported to FFI)
// =========================================================================

/// Calculate a weight-scaled dose. Decimals are passed as strings.
///
/// An absent `per_weight_reference` applies the weight directly.
#[uniffi::export]
pub fn calculate_dose(
    base_dose: String,
    per_weight_reference: Option<String>,
    weight: String,
    source_unit: String,
    target_unit: String,
) -> Result<FfiCalculatedDose, VetDoseError> {
    let base_dose = parse_decimal("base_dose", &base_dose)?;
    let reference = parse_optional_decimal("per_weight_reference", per_weight_reference)?;
    let weight = parse_decimal("weight", &weight)?;
    let source_unit = normalize_unit(source_unit);
    let target_unit = normalize_unit(target_unit);

    let dose = dosage::calculate(
        base_dose,
        WeightBasis::from_stored(reference),
        weight,
        &source_unit,
        &target_unit,
    )?;
    Ok(dose.into())
}

/// Convert a value between two units of the same family.
#[uniffi::export]
pub fn convert_units(
    value: String,
    from_unit: String,
    to_unit: String,
) -> Result<String, VetDoseError> {
    let value = parse_decimal("value", &value)?;
    let (from_unit, to_unit) = (normalize_unit(from_unit), normalize_unit(to_unit));
    Ok(units::convert(value, &from_unit, &to_unit)?.to_string())
}

/// Whether two unit codes belong to the same family.
#[uniffi::export]
pub fn units_compatible(unit_a: String, unit_b: String) -> bool {
    units::is_compatible(&normalize_unit(unit_a), &normalize_unit(unit_b))
}

/// Family name ("mass", "volume", "concentration") of a unit code.
#[uniffi::export]
pub fn unit_family(unit: String) -> Result<String, VetDoseError> {
    Ok(units::family_of(&normalize_unit(unit))?.name().to_string())
}

/// Unit codes convertible with `unit`, including itself.
#[uniffi::export]
pub fn compatible_units(unit: String) -> Result<Vec<String>, VetDoseError> {
    let family = units::family_of(&normalize_unit(unit))?;
    Ok(units::units_in(family).into_iter().map(String::from).collect())
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe dosage service wrapper for FFI.
#[derive(uniffi::Object)]
pub struct DosageEngine {
    service: Arc<Mutex<DosageService<MemoryCatalog>>>,
}

#[uniffi::export]
impl DosageEngine {
    /// Create an engine with an empty catalog. `config_json` overrides defaults.
    #[uniffi::constructor]
    pub fn new(config_json: Option<String>) -> Result<Arc<Self>, VetDoseError> {
        let config = match config_json {
            Some(json) => DosageConfig::from_json_str(&json)?,
            None => DosageConfig::default(),
        };
        let service = DosageService::new(MemoryCatalog::new(), config)?;
        Ok(Arc::new(Self {
            service: Arc::new(Mutex::new(service)),
        }))
    }

    // =========================================================================
    // Catalog Operations
    // =========================================================================

    /// Add or update a drug.
    pub fn upsert_drug(&self, drug: FfiDrug) -> Result<(), VetDoseError> {
        let profile = DrugProfile::try_from(drug)?;
        let mut service = self.service.lock()?;
        service.catalog_mut().upsert_drug(profile)?;
        Ok(())
    }

    /// Get a drug by kind ("standard" or "custom") and ID.
    pub fn get_drug(&self, kind: String, id: u64) -> Result<Option<FfiDrug>, VetDoseError> {
        let kind = DrugKind::from_str(&kind)?;
        let service = self.service.lock()?;
        let drug = service.catalog().find_drug(kind, id)?;
        Ok(drug.map(|d| d.into()))
    }

    /// Search drugs by name or active ingredient.
    pub fn search_drugs(
        &self,
        kind: String,
        query: String,
        limit: u32,
    ) -> Result<Vec<FfiDrug>, VetDoseError> {
        let kind = DrugKind::from_str(&kind)?;
        let service = self.service.lock()?;
        let drugs = service.catalog().search_drugs(kind, &query, limit as usize)?;
        Ok(drugs.into_iter().map(|d| d.into()).collect())
    }

    // =========================================================================
    // Dosage Operations
    // =========================================================================

    /// Calculate a catalog drug's dose for one animal.
    pub fn calculate(&self, request: FfiDosageRequest) -> Result<FfiDosageResult, VetDoseError> {
        let request = DosageRequest::try_from(request)?;
        let service = self.service.lock()?;
        let result = service.calculate(&request)?;
        Ok(result.into())
    }

    /// Unit codes a drug's dose can be expressed in.
    pub fn target_units(&self, kind: String, id: u64) -> Result<Vec<String>, VetDoseError> {
        let kind = DrugKind::from_str(&kind)?;
        let service = self.service.lock()?;
        let codes = service.target_units(kind, id)?;
        Ok(codes.into_iter().map(String::from).collect())
    }

    // =========================================================================
    // History Operations
    // =========================================================================

    /// Get a user's dosage history, newest first.
    pub fn history_for(&self, user: String) -> Result<Vec<FfiHistoryEntry>, VetDoseError> {
        let service = self.service.lock()?;
        let entries = service.history().entries_for(&user);
        Ok(entries.into_iter().map(|e| e.into()).collect())
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe calculated dose.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiCalculatedDose {
    pub calculated_dose: String,
    pub unit: String,
}

impl From<CalculatedDose> for FfiCalculatedDose {
    fn from(dose: CalculatedDose) -> Self {
        Self {
            calculated_dose: dose.calculated_dose.to_string(),
            unit: dose.unit,
        }
    }
}

/// FFI-safe drug profile.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDrug {
    pub id: u64,
    pub kind: String,
    pub name: String,
    pub active_ingredient: String,
    pub species: String,
    pub contraindications: Option<String>,
    pub measurement_value: String,
    pub measurement_unit: String,
    pub per_weight_value: Option<String>,
    pub per_weight_unit: Option<String>,
    /// Required for custom drugs
    pub owner: Option<String>,
}

impl From<DrugProfile> for FfiDrug {
    fn from(drug: DrugProfile) -> Self {
        Self {
            id: drug.id,
            kind: drug.kind.to_string().to_lowercase(),
            name: drug.name,
            active_ingredient: drug.active_ingredient,
            species: drug.species,
            contraindications: drug.contraindications,
            measurement_value: drug.measurement_value.to_string(),
            measurement_unit: drug.measurement_unit,
            per_weight_value: drug.per_weight_value.map(|v| v.to_string()),
            per_weight_unit: drug.per_weight_unit,
            owner: drug.owner,
        }
    }
}

impl TryFrom<FfiDrug> for DrugProfile {
    type Error = VetDoseError;

    fn try_from(drug: FfiDrug) -> Result<Self, Self::Error> {
        Ok(DrugProfile {
            id: drug.id,
            kind: DrugKind::from_str(&drug.kind)?,
            name: drug.name,
            active_ingredient: drug.active_ingredient,
            species: drug.species,
            contraindications: drug.contraindications,
            measurement_value: parse_decimal("measurement_value", &drug.measurement_value)?,
            measurement_unit: normalize_unit(drug.measurement_unit),
            per_weight_value: parse_optional_decimal("per_weight_value", drug.per_weight_value)?,
            per_weight_unit: drug.per_weight_unit.map(normalize_unit),
            owner: drug.owner,
        })
    }
}

/// FFI-safe dosage request.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDosageRequest {
    pub drug_id: u64,
    pub drug_kind: String,
    pub weight: String,
    pub species: String,
    pub target_unit: String,
    pub user: Option<String>,
}

impl TryFrom<FfiDosageRequest> for DosageRequest {
    type Error = VetDoseError;

    fn try_from(request: FfiDosageRequest) -> Result<Self, Self::Error> {
        Ok(DosageRequest {
            drug_id: request.drug_id,
            drug_kind: DrugKind::from_str(&request.drug_kind)?,
            weight: parse_decimal("weight", &request.weight)?,
            species: request.species,
            target_unit: normalize_unit(request.target_unit),
            user: request.user,
        })
    }
}

/// FFI-safe dosage result.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDosageResult {
    pub drug_id: u64,
    pub calculated_dose: String,
    pub unit: String,
}

impl From<DosageResult> for FfiDosageResult {
    fn from(result: DosageResult) -> Self {
        Self {
            drug_id: result.drug_id,
            calculated_dose: result.calculated_dose.to_string(),
            unit: result.unit,
        }
    }
}

/// FFI-safe history entry.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiHistoryEntry {
    pub id: String,
    pub module: String,
    pub query: String,
    pub created_at: String,
}

impl From<history::HistoryEntry> for FfiHistoryEntry {
    fn from(entry: history::HistoryEntry) -> Self {
        Self {
            id: entry.id.to_string(),
            module: entry.module,
            query: entry.query,
            created_at: entry.created_at.to_rfc3339(),
        }
    }
}
