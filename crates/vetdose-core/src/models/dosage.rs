//! Dosage request and result records.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::DrugKind;

/// A dosage calculation request, already validated for shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DosageRequest {
    pub drug_id: u64,
    #[serde(default = "default_kind")]
    pub drug_kind: DrugKind,
    /// Animal body weight
    pub weight: Decimal,
    pub species: String,
    /// Unit code the dose should be expressed in
    pub target_unit: String,
    /// Who asked, for history attribution
    #[serde(default)]
    pub user: Option<String>,
}

fn default_kind() -> DrugKind {
    DrugKind::Standard
}

impl DosageRequest {
    /// Request a standard drug's dose.
    pub fn new(
        drug_id: u64,
        weight: Decimal,
        species: impl Into<String>,
        target_unit: impl Into<String>,
    ) -> Self {
        Self {
            drug_id,
            drug_kind: DrugKind::Standard,
            weight,
            species: species.into(),
            target_unit: target_unit.into(),
            user: None,
        }
    }

    pub fn with_kind(mut self, kind: DrugKind) -> Self {
        self.drug_kind = kind;
        self
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }
}

/// Outbound dosage result. `calculated_dose` serializes as a string with
/// exactly five fractional digits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DosageResult {
    pub drug_id: u64,
    pub calculated_dose: Decimal,
    pub unit: String,
}
