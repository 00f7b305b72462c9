//! Weight-scaled dosage calculation.
//!
//! ```text
//! weight_factor = weight / per_weight_reference    (or weight, in Direct mode)
//! raw_dose      = base_dose * weight_factor
//! dose          = round_dose(raw_dose)              if source == target
//!               = convert(raw_dose, source, target) otherwise
//! ```
//!
//! Pure and stateless: safe to call from any number of threads.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::units::{self, ConversionError};

/// Dosage calculation errors. Each variant maps to one violated precondition.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DosageError {
    #[error("Weight must be greater than zero, got {0}")]
    InvalidWeight(Decimal),

    #[error("Dose must be greater than zero, got {0}")]
    InvalidDose(Decimal),

    #[error("Per-weight reference must be greater than zero, got {0}")]
    InvalidPerWeightReference(Decimal),

    #[error("Unit {source_unit} is not compatible with unit {target_unit}")]
    IncompatibleUnits {
        source_unit: String,
        target_unit: String,
    },

    #[error("Unknown unit: {0}")]
    UnknownUnit(String),

    #[error("Dose calculation overflowed: {0}")]
    Overflow(String),
}

impl From<ConversionError> for DosageError {
    fn from(e: ConversionError) -> Self {
        match e {
            ConversionError::UnknownUnit(code) => DosageError::UnknownUnit(code),
            ConversionError::IncompatibleUnits { from, to } => DosageError::IncompatibleUnits {
                source_unit: from,
                target_unit: to,
            },
            ConversionError::Overflow(value) => DosageError::Overflow(value),
        }
    }
}

pub type CalculationResult<T> = Result<T, DosageError>;

/// How the animal's weight scales the base dose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode", content = "reference")]
pub enum WeightBasis {
    /// The base dose is given per `reference` weight units, e.g. 100 mg per 10 kg.
    PerReference(Decimal),
    /// No reference weight is recorded; the weight multiplies the base dose as is.
    Direct,
}

impl WeightBasis {
    /// Basis for a stored per-weight value. Absent or zero selects [`WeightBasis::Direct`].
    ///
    /// Negative values are kept so that [`calculate`] rejects them.
    pub fn from_stored(per_weight_value: Option<Decimal>) -> Self {
        match per_weight_value {
            Some(reference) if !reference.is_zero() => WeightBasis::PerReference(reference),
            _ => WeightBasis::Direct,
        }
    }

    /// Multiplier applied to the base dose for an animal of `weight`.
    pub fn weight_factor(self, weight: Decimal) -> CalculationResult<Decimal> {
        match self {
            WeightBasis::PerReference(reference) => {
                if reference <= Decimal::ZERO {
                    return Err(DosageError::InvalidPerWeightReference(reference));
                }
                weight
                    .checked_div(reference)
                    .ok_or_else(|| DosageError::Overflow(format!("{weight} / {reference}")))
            }
            WeightBasis::Direct => Ok(weight),
        }
    }
}

/// Dose produced by [`calculate`]: exactly five fractional digits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculatedDose {
    pub calculated_dose: Decimal,
    pub unit: String,
}

/// Scale a dosing rule to an animal's weight and express it in `target_unit`.
///
/// Checks run in order (dose, weight, reference, units) and the first
/// violation is returned. Unit codes are always resolved, so an unknown code
/// fails with [`DosageError::UnknownUnit`] even when source and target match.
pub fn calculate(
    base_dose: Decimal,
    basis: WeightBasis,
    weight: Decimal,
    source_unit: &str,
    target_unit: &str,
) -> CalculationResult<CalculatedDose> {
    if base_dose <= Decimal::ZERO {
        return Err(DosageError::InvalidDose(base_dose));
    }
    if weight <= Decimal::ZERO {
        return Err(DosageError::InvalidWeight(weight));
    }
    if let WeightBasis::PerReference(reference) = basis {
        if reference <= Decimal::ZERO {
            return Err(DosageError::InvalidPerWeightReference(reference));
        }
    }

    let source_family = units::family_of(source_unit)?;
    let target_family = units::family_of(target_unit)?;
    if source_family != target_family {
        return Err(DosageError::IncompatibleUnits {
            source_unit: source_unit.to_string(),
            target_unit: target_unit.to_string(),
        });
    }

    let weight_factor = basis.weight_factor(weight)?;
    let raw_dose = base_dose
        .checked_mul(weight_factor)
        .ok_or_else(|| DosageError::Overflow(format!("{base_dose} * {weight_factor}")))?;

    let calculated_dose = if source_unit == target_unit {
        units::round_dose(raw_dose)?
    } else {
        units::convert(raw_dose, source_unit, target_unit)?
    };

    Ok(CalculatedDose {
        calculated_dose,
        unit: target_unit.to_string(),
    })
}
