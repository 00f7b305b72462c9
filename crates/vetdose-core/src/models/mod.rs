//! Domain models for the vetdose system.

mod dosage;
mod drug;

pub use dosage::*;
pub use drug::*;
