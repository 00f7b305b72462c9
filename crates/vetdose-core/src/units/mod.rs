//! Unit classification and exact decimal conversion.
//!
//! All arithmetic is done in [`Decimal`]; results are rounded once, by
//! [`round_dose`], to [`DOSE_DECIMAL_PLACES`] fractional digits half-up.

mod family;

pub use family::*;

use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

/// Fractional digits carried by every converted value and calculated dose.
pub const DOSE_DECIMAL_PLACES: u32 = 5;

/// Conversion errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    #[error("Unknown unit: {0}")]
    UnknownUnit(String),

    #[error("Cannot convert from {from} to {to}")]
    IncompatibleUnits { from: String, to: String },

    #[error("Value {0} exceeds decimal capacity")]
    Overflow(String),
}

pub type ConversionResult<T> = Result<T, ConversionError>;

/// Resolve the family owning `code`.
///
/// Families are scanned in [`UnitFamily::ALL`] order; [`validate_tables`]
/// guarantees at most one can match.
pub fn family_of(code: &str) -> ConversionResult<UnitFamily> {
    UnitFamily::ALL
        .into_iter()
        .find(|family| family.contains(code))
        .ok_or_else(|| ConversionError::UnknownUnit(code.to_string()))
}

/// True iff both codes resolve to the same family. Unknown codes yield false.
pub fn is_compatible(unit_a: &str, unit_b: &str) -> bool {
    matches!(
        (family_of(unit_a), family_of(unit_b)),
        (Ok(a), Ok(b)) if a == b
    )
}

/// Unit codes belonging to `family`.
pub fn units_in(family: UnitFamily) -> Vec<&'static str> {
    family.unit_codes()
}

/// Round to [`DOSE_DECIMAL_PLACES`] using round-half-up (midpoints away from
/// zero). The result always carries exactly that many fractional digits, so
/// `250` becomes `250.00000`.
pub fn round_dose(value: Decimal) -> ConversionResult<Decimal> {
    let mut rounded =
        value.round_dp_with_strategy(DOSE_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(DOSE_DECIMAL_PLACES);
    // rescale silently caps the scale when the mantissa has no room left
    if rounded.scale() != DOSE_DECIMAL_PLACES {
        return Err(ConversionError::Overflow(value.to_string()));
    }
    Ok(rounded)
}

/// Convert `value` expressed in `from_unit` into `to_unit`.
///
/// Both units must belong to the same family; an unknown code is reported as
/// [`ConversionError::IncompatibleUnits`]. The value is scaled to the family's
/// base unit, then into the target unit, then rounded with [`round_dose`].
pub fn convert(value: Decimal, from_unit: &str, to_unit: &str) -> ConversionResult<Decimal> {
    let incompatible = || ConversionError::IncompatibleUnits {
        from: from_unit.to_string(),
        to: to_unit.to_string(),
    };

    let family = match (family_of(from_unit), family_of(to_unit)) {
        (Ok(a), Ok(b)) if a == b => a,
        _ => return Err(incompatible()),
    };
    let from_factor = family.factor_of(from_unit).ok_or_else(incompatible)?;
    let to_factor = family.factor_of(to_unit).ok_or_else(incompatible)?;

    let overflow = || ConversionError::Overflow(value.to_string());
    let base_value = value.checked_mul(from_factor).ok_or_else(overflow)?;
    let result = base_value.checked_div(to_factor).ok_or_else(overflow)?;

    round_dose(result)
}
