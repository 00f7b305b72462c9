//! Unit families and their conversion factor tables.
//!
//! Each family maps unit codes to a factor relative to the family's base
//! unit. Adding a unit means adding one row to a table; adding a family means
//! adding one variant, its table, and an entry in [`UnitFamily::ALL`].

use std::fmt;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Mass factors relative to grams.
const MASS_FACTORS: &[(&str, Decimal)] = &[
    ("ng", dec!(0.000000001)),
    ("µg", dec!(0.000001)),
    ("mg", dec!(0.001)),
    ("g", dec!(1)),
    ("kg", dec!(1000)),
];

/// Volume factors relative to liters.
const VOLUME_FACTORS: &[(&str, Decimal)] = &[
    ("µl", dec!(0.000001)),
    ("ml", dec!(0.001)),
    ("l", dec!(1)),
];

/// Concentration factors relative to µg/ml.
const CONCENTRATION_FACTORS: &[(&str, Decimal)] = &[
    ("ng/ml", dec!(0.001)),
    ("µg/ml", dec!(1)),
    ("mg/ml", dec!(1000)),
    ("g/ml", dec!(1000000)),
];

/// A closed set of units convertible among each other by fixed factors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitFamily {
    Mass,
    Volume,
    Concentration,
}

impl UnitFamily {
    /// Every family, in resolution order.
    pub const ALL: [UnitFamily; 3] = [
        UnitFamily::Mass,
        UnitFamily::Volume,
        UnitFamily::Concentration,
    ];

    /// Lowercase family name (e.g. "mass").
    pub fn name(self) -> &'static str {
        match self {
            UnitFamily::Mass => "mass",
            UnitFamily::Volume => "volume",
            UnitFamily::Concentration => "concentration",
        }
    }

    /// The unit every factor in this family is relative to.
    pub fn base_unit(self) -> &'static str {
        match self {
            UnitFamily::Mass => "g",
            UnitFamily::Volume => "l",
            UnitFamily::Concentration => "µg/ml",
        }
    }

    /// The (code, factor-to-base) table for this family.
    pub fn factors(self) -> &'static [(&'static str, Decimal)] {
        match self {
            UnitFamily::Mass => MASS_FACTORS,
            UnitFamily::Volume => VOLUME_FACTORS,
            UnitFamily::Concentration => CONCENTRATION_FACTORS,
        }
    }

    /// Factor-to-base for `code`, if this family owns it. Case-sensitive.
    pub fn factor_of(self, code: &str) -> Option<Decimal> {
        self.factors()
            .iter()
            .find(|(unit, _)| *unit == code)
            .map(|(_, factor)| *factor)
    }

    /// Whether this family owns `code`.
    pub fn contains(self, code: &str) -> bool {
        self.factor_of(code).is_some()
    }

    /// Unit codes in this family, smallest factor first.
    pub fn unit_codes(self) -> Vec<&'static str> {
        self.factors().iter().map(|(unit, _)| *unit).collect()
    }
}

impl fmt::Display for UnitFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A unit code registered in more than one family.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unit code {code} is defined in both the {first} and {second} tables")]
pub struct DuplicateUnit {
    pub code: String,
    pub first: UnitFamily,
    pub second: UnitFamily,
}

/// A family paired with its (code, factor-to-base) table.
pub type FamilyTable<'a> = (UnitFamily, &'a [(&'a str, Decimal)]);

/// Check that every unit code belongs to exactly one family.
///
/// Resolution is first-match in [`UnitFamily::ALL`] order, so a duplicate
/// would silently shadow the later family. Run once at startup.
pub fn validate_tables() -> Result<(), DuplicateUnit> {
    let tables = UnitFamily::ALL.map(|family| (family, family.factors()));
    check_unique(&tables)
}

/// Report the first code that appears in two of `tables`.
pub fn check_unique(tables: &[FamilyTable<'_>]) -> Result<(), DuplicateUnit> {
    for (i, (first, codes)) in tables.iter().enumerate() {
        for (code, _) in codes.iter() {
            let clash = tables[i + 1..]
                .iter()
                .find(|(_, later)| later.iter().any(|(other, _)| other == code));
            if let Some((second, _)) = clash {
                return Err(DuplicateUnit {
                    code: (*code).to_string(),
                    first: *first,
                    second: *second,
                });
            }
        }
    }
    Ok(())
}
