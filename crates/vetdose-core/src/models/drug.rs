//! Drug profiles: a dosing rule plus the identity it is stored under.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dosage::WeightBasis;

/// Which table a drug comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrugKind {
    /// Shared reference catalog
    Standard,
    /// Added by a user for their own practice; visible only to its owner
    Custom,
}

impl fmt::Display for DrugKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DrugKind::Standard => f.write_str("Standard"),
            DrugKind::Custom => f.write_str("Custom"),
        }
    }
}

impl FromStr for DrugKind {
    type Err = DrugValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "standard" => Ok(DrugKind::Standard),
            "custom" => Ok(DrugKind::Custom),
            other => Err(DrugValidationError::UnknownKind(other.to_string())),
        }
    }
}

/// Drug data rejected before it reaches the catalog.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DrugValidationError {
    #[error("Name cannot be empty")]
    EmptyName,

    #[error("Active ingredient cannot be empty")]
    EmptyActiveIngredient,

    #[error("Measurement value must be positive, got {0}")]
    NonPositiveMeasurement(Decimal),

    #[error("Per-weight value must be positive, got {0}")]
    NonPositivePerWeight(Decimal),

    #[error("Unknown drug type: {0}")]
    UnknownKind(String),

    #[error("Custom drugs must have an owner")]
    MissingOwner,

    #[error("Standard drugs cannot have an owner, got {0}")]
    UnexpectedOwner(String),
}

/// A drug with its dosing rule: `measurement_value` of `measurement_unit`
/// per `per_weight_value` of `per_weight_unit` body weight.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DrugProfile {
    /// Identifier within its kind's table
    pub id: u64,
    pub kind: DrugKind,
    pub name: String,
    pub active_ingredient: String,
    /// Species this dosing rule applies to (e.g. "canine")
    pub species: String,
    pub contraindications: Option<String>,
    /// Base dose
    pub measurement_value: Decimal,
    /// Unit code of the base dose (e.g. "mg")
    pub measurement_unit: String,
    /// Reference body weight; absent means the weight scales 1:1
    pub per_weight_value: Option<Decimal>,
    /// Unit of the reference body weight (e.g. "kg")
    pub per_weight_unit: Option<String>,
    /// User who added a custom drug; always `None` for standard drugs
    #[serde(default)]
    pub owner: Option<String>,
}

impl DrugProfile {
    /// Create a standard drug with a direct (unreferenced) dosing rule.
    pub fn new(
        id: u64,
        name: impl Into<String>,
        active_ingredient: impl Into<String>,
        species: impl Into<String>,
        measurement_value: Decimal,
        measurement_unit: impl Into<String>,
    ) -> Self {
        Self {
            id,
            kind: DrugKind::Standard,
            name: name.into(),
            active_ingredient: active_ingredient.into(),
            species: species.into(),
            contraindications: None,
            measurement_value,
            measurement_unit: measurement_unit.into(),
            per_weight_value: None,
            per_weight_unit: None,
            owner: None,
        }
    }

    /// Set the reference weight ("per 10 kg").
    pub fn per_weight(mut self, value: Decimal, unit: impl Into<String>) -> Self {
        self.per_weight_value = Some(value);
        self.per_weight_unit = Some(unit.into());
        self
    }

    /// Mark as a custom drug owned by `owner`.
    pub fn custom(mut self, owner: impl Into<String>) -> Self {
        self.kind = DrugKind::Custom;
        self.owner = Some(owner.into());
        self
    }

    /// Whether `user` may calculate with this drug.
    ///
    /// Standard drugs are open to everyone. Custom drugs only to their owner;
    /// an anonymous request never matches.
    pub fn is_accessible_by(&self, user: Option<&str>) -> bool {
        match self.kind {
            DrugKind::Standard => true,
            DrugKind::Custom => user.is_some() && self.owner.as_deref() == user,
        }
    }

    /// How this drug's dose scales with body weight.
    pub fn weight_basis(&self) -> WeightBasis {
        WeightBasis::from_stored(self.per_weight_value)
    }

    /// Check if this drug's dosing rule applies to a given species.
    pub fn is_species_compatible(&self, species: &str) -> bool {
        self.species.trim().eq_ignore_ascii_case(species.trim())
    }

    /// Validate field contents before storing.
    pub fn validate(&self) -> Result<(), DrugValidationError> {
        if self.name.trim().is_empty() {
            return Err(DrugValidationError::EmptyName);
        }
        if self.active_ingredient.trim().is_empty() {
            return Err(DrugValidationError::EmptyActiveIngredient);
        }
        if self.measurement_value <= Decimal::ZERO {
            return Err(DrugValidationError::NonPositiveMeasurement(
                self.measurement_value,
            ));
        }
        if let Some(value) = self.per_weight_value {
            if value <= Decimal::ZERO {
                return Err(DrugValidationError::NonPositivePerWeight(value));
            }
        }
        match (self.kind, &self.owner) {
            (DrugKind::Custom, None) => Err(DrugValidationError::MissingOwner),
            (DrugKind::Custom, Some(owner)) if owner.trim().is_empty() => {
                Err(DrugValidationError::MissingOwner)
            }
            (DrugKind::Standard, Some(owner)) => {
                Err(DrugValidationError::UnexpectedOwner(owner.clone()))
            }
            _ => Ok(()),
        }
    }
}
