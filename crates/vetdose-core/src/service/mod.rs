//! Request-level dosage service.
//!
//! Pipeline: weight bounds → drug lookup → owner check → drug validation →
//! species check → engine
//! [`calculate`](crate::dosage::calculate) → history entry.
//!
//! The engine itself is pure; logging and history recording happen here.

use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::catalog::{CatalogError, DrugCatalog};
use crate::config::{ConfigError, DosageConfig};
use crate::dosage::{self, DosageError};
use crate::history::{SearchHistory, DOSAGE_MODULE};
use crate::models::{DosageRequest, DosageResult, DrugKind, DrugProfile, DrugValidationError};
use crate::units::{self, ConversionError, DuplicateUnit};

/// Service errors.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Weight must be greater than {min} and less than {max}, got {weight}")]
    WeightOutOfRange {
        weight: Decimal,
        min: Decimal,
        max: Decimal,
    },

    #[error("{kind} drug with ID {id} does not exist")]
    DrugNotFound { kind: DrugKind, id: u64 },

    #[error("You don't have access to custom drug {id}")]
    AccessDenied { id: u64 },

    #[error("{kind} drug with ID {id} has invalid data: {source}")]
    InvalidDrug {
        kind: DrugKind,
        id: u64,
        source: DrugValidationError,
    },

    #[error("Drug {drug} is not compatible with species {species}")]
    SpeciesMismatch { drug: String, species: String },

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Calculation(#[from] DosageError),

    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Unit table error: {0}")]
    UnitTable(#[from] DuplicateUnit),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Dosage service over a drug catalog.
pub struct DosageService<C> {
    catalog: C,
    config: DosageConfig,
    history: SearchHistory,
}

impl<C: DrugCatalog> DosageService<C> {
    /// Create a service, checking the unit tables and the configuration.
    pub fn new(catalog: C, config: DosageConfig) -> ServiceResult<Self> {
        units::validate_tables()?;
        config.validate()?;
        let history = SearchHistory::with_capacity(config.history_capacity);
        Ok(Self {
            catalog,
            config,
            history,
        })
    }

    /// Create a service with [`DosageConfig::default`].
    pub fn with_default_config(catalog: C) -> ServiceResult<Self> {
        Self::new(catalog, DosageConfig::default())
    }

    /// Calculate the dose of a catalog drug for one animal.
    pub fn calculate(&self, request: &DosageRequest) -> ServiceResult<DosageResult> {
        match self.try_calculate(request) {
            Ok(result) => Ok(result),
            Err(e) => {
                warn!(
                    drug_id = request.drug_id,
                    kind = %request.drug_kind,
                    weight = %request.weight,
                    target_unit = %request.target_unit,
                    error = %e,
                    "Dosage calculation rejected"
                );
                Err(e)
            }
        }
    }

    fn try_calculate(&self, request: &DosageRequest) -> ServiceResult<DosageResult> {
        let weight = self.normalize_weight(request.weight)?;
        let drug = self.require_drug(request.drug_kind, request.drug_id)?;

        if !drug.is_accessible_by(request.user.as_deref()) {
            return Err(ServiceError::AccessDenied { id: drug.id });
        }
        // Host catalogs are not required to validate on write
        drug.validate().map_err(|source| ServiceError::InvalidDrug {
            kind: drug.kind,
            id: drug.id,
            source,
        })?;

        if !drug.is_species_compatible(&request.species) {
            return Err(ServiceError::SpeciesMismatch {
                drug: drug.name,
                species: request.species.clone(),
            });
        }

        let dose = dosage::calculate(
            drug.measurement_value,
            drug.weight_basis(),
            weight,
            &drug.measurement_unit,
            &request.target_unit,
        )?;

        info!(
            drug = %drug.name,
            drug_id = drug.id,
            weight = %weight,
            dose = %dose.calculated_dose,
            unit = %dose.unit,
            "Calculated dose"
        );

        if self.config.record_history {
            let query = format!(
                "{} ({}) for {} {} {}: {} {}",
                drug.name,
                drug.active_ingredient,
                weight,
                drug.per_weight_unit.as_deref().unwrap_or("kg"),
                request.species,
                dose.calculated_dose,
                dose.unit
            );
            let entry = self
                .history
                .record(DOSAGE_MODULE, query, request.user.clone());
            debug!(entry_id = %entry.id, "Recorded dosage history");
        }

        Ok(DosageResult {
            drug_id: drug.id,
            calculated_dose: dose.calculated_dose,
            unit: dose.unit,
        })
    }

    /// Round the request weight to the configured precision and check bounds.
    fn normalize_weight(&self, weight: Decimal) -> ServiceResult<Decimal> {
        let rounded = weight.round_dp_with_strategy(
            self.config.weight_decimal_places,
            RoundingStrategy::MidpointAwayFromZero,
        );
        if rounded <= self.config.min_weight_exclusive
            || rounded >= self.config.max_weight_exclusive
        {
            return Err(ServiceError::WeightOutOfRange {
                weight,
                min: self.config.min_weight_exclusive,
                max: self.config.max_weight_exclusive,
            });
        }
        Ok(rounded)
    }

    fn require_drug(&self, kind: DrugKind, id: u64) -> ServiceResult<DrugProfile> {
        self.catalog
            .find_drug(kind, id)?
            .ok_or(ServiceError::DrugNotFound { kind, id })
    }

    /// Unit codes a drug's dose can be expressed in.
    pub fn target_units(&self, kind: DrugKind, id: u64) -> ServiceResult<Vec<&'static str>> {
        let drug = self.require_drug(kind, id)?;
        let family = units::family_of(&drug.measurement_unit)?;
        Ok(units::units_in(family))
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut C {
        &mut self.catalog
    }

    pub fn config(&self) -> &DosageConfig {
        &self.config
    }

    pub fn history(&self) -> &SearchHistory {
        &self.history
    }
}
