//! Golden tests for the dosage engine.
//!
//! Each case is checked against a hand-computed exact value.

use std::str::FromStr;

use rust_decimal::Decimal;
use vetdose_core::dosage::{calculate, DosageError, WeightBasis};

/// Test case with inputs written as decimal strings.
struct GoldenCase {
    id: &'static str,
    base_dose: &'static str,
    per_weight: Option<&'static str>,
    weight: &'static str,
    source_unit: &'static str,
    target_unit: &'static str,
    expected_dose: &'static str,
}

/// Rejected input and the error kind it must produce.
struct RejectCase {
    id: &'static str,
    base_dose: &'static str,
    per_weight: Option<&'static str>,
    weight: &'static str,
    source_unit: &'static str,
    target_unit: &'static str,
    expected_error: &'static str,
}

fn d(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn error_kind(e: &DosageError) -> &'static str {
    match e {
        DosageError::InvalidWeight(_) => "InvalidWeight",
        DosageError::InvalidDose(_) => "InvalidDose",
        DosageError::InvalidPerWeightReference(_) => "InvalidPerWeightReference",
        DosageError::IncompatibleUnits { .. } => "IncompatibleUnits",
        DosageError::UnknownUnit(_) => "UnknownUnit",
        DosageError::Overflow(_) => "Overflow",
    }
}

fn get_golden_cases() -> Vec<GoldenCase> {
    vec![
        GoldenCase {
            id: "per-10kg-same-unit",
            base_dose: "100",
            per_weight: Some("10"),
            weight: "25",
            source_unit: "mg",
            target_unit: "mg",
            expected_dose: "250.00000",
        },
        GoldenCase {
            id: "mg-to-g",
            base_dose: "1000",
            per_weight: Some("10"),
            weight: "20",
            source_unit: "mg",
            target_unit: "g",
            expected_dose: "2.00000",
        },
        GoldenCase {
            id: "smallest-representable",
            base_dose: "0.00001",
            per_weight: Some("1.00"),
            weight: "1.00",
            source_unit: "mg",
            target_unit: "mg",
            expected_dose: "0.00001",
        },
        GoldenCase {
            id: "repeating-thirds",
            base_dose: "100",
            per_weight: Some("3"),
            weight: "10",
            source_unit: "mg",
            target_unit: "mg",
            expected_dose: "333.33333",
        },
        GoldenCase {
            id: "direct-mode-absent-reference",
            base_dose: "0.25",
            per_weight: None,
            weight: "30",
            source_unit: "mg",
            target_unit: "mg",
            expected_dose: "7.50000",
        },
        GoldenCase {
            id: "direct-mode-zero-reference",
            base_dose: "0.25",
            per_weight: Some("0"),
            weight: "30",
            source_unit: "mg",
            target_unit: "mg",
            expected_dose: "7.50000",
        },
        GoldenCase {
            id: "kg-to-g",
            base_dose: "0.5",
            per_weight: Some("100"),
            weight: "40",
            source_unit: "kg",
            target_unit: "g",
            expected_dose: "200.00000",
        },
        GoldenCase {
            id: "microgram-to-mg",
            base_dose: "50",
            per_weight: Some("1"),
            weight: "4.2",
            source_unit: "µg",
            target_unit: "mg",
            expected_dose: "0.21000",
        },
        GoldenCase {
            id: "ml-to-microliter",
            base_dose: "2",
            per_weight: Some("10"),
            weight: "7",
            source_unit: "ml",
            target_unit: "µl",
            expected_dose: "1400.00000",
        },
        GoldenCase {
            id: "concentration-mg-per-ml",
            base_dose: "2",
            per_weight: Some("1"),
            weight: "3",
            source_unit: "mg/ml",
            target_unit: "µg/ml",
            expected_dose: "6000.00000",
        },
        GoldenCase {
            id: "sevenths-through-conversion",
            base_dose: "333",
            per_weight: Some("7"),
            weight: "10",
            source_unit: "ng",
            target_unit: "µg",
            // 3330 / 7 = 475.714285... ng
            expected_dose: "0.47571",
        },
        GoldenCase {
            id: "midpoint-through-conversion",
            base_dose: "1",
            per_weight: Some("2"),
            weight: "0.01",
            source_unit: "mg",
            target_unit: "g",
            // 0.000005 g, exactly halfway
            expected_dose: "0.00001",
        },
    ]
}

fn get_reject_cases() -> Vec<RejectCase> {
    vec![
        RejectCase {
            id: "zero-weight",
            base_dose: "100",
            per_weight: Some("10"),
            weight: "0",
            source_unit: "mg",
            target_unit: "mg",
            expected_error: "InvalidWeight",
        },
        RejectCase {
            id: "negative-dose",
            base_dose: "-100",
            per_weight: Some("10"),
            weight: "25",
            source_unit: "mg",
            target_unit: "mg",
            expected_error: "InvalidDose",
        },
        RejectCase {
            id: "zero-dose",
            base_dose: "0",
            per_weight: None,
            weight: "25",
            source_unit: "mg",
            target_unit: "mg",
            expected_error: "InvalidDose",
        },
        RejectCase {
            id: "negative-reference",
            base_dose: "100",
            per_weight: Some("-10"),
            weight: "25",
            source_unit: "mg",
            target_unit: "mg",
            expected_error: "InvalidPerWeightReference",
        },
        RejectCase {
            id: "mass-to-volume",
            base_dose: "100",
            per_weight: Some("10"),
            weight: "25",
            source_unit: "mg",
            target_unit: "ml",
            expected_error: "IncompatibleUnits",
        },
        RejectCase {
            id: "volume-to-concentration",
            base_dose: "1",
            per_weight: Some("1"),
            weight: "1",
            source_unit: "ml",
            target_unit: "mg/ml",
            expected_error: "IncompatibleUnits",
        },
        RejectCase {
            id: "unknown-target",
            base_dose: "100",
            per_weight: Some("10"),
            weight: "25",
            source_unit: "mg",
            target_unit: "IU",
            expected_error: "UnknownUnit",
        },
        RejectCase {
            id: "unknown-source-same-as-target",
            base_dose: "1",
            per_weight: None,
            weight: "1",
            source_unit: "tablets",
            target_unit: "tablets",
            expected_error: "UnknownUnit",
        },
        RejectCase {
            id: "wrong-case-unit",
            base_dose: "1",
            per_weight: None,
            weight: "1",
            source_unit: "mg",
            target_unit: "G",
            expected_error: "UnknownUnit",
        },
    ]
}

#[test]
fn test_golden_cases() {
    for case in get_golden_cases() {
        let result = calculate(
            d(case.base_dose),
            WeightBasis::from_stored(case.per_weight.map(d)),
            d(case.weight),
            case.source_unit,
            case.target_unit,
        )
        .unwrap_or_else(|e| panic!("Case {}: unexpected error {}", case.id, e));

        assert_eq!(
            result.calculated_dose.to_string(),
            case.expected_dose,
            "Case {}: dose mismatch",
            case.id
        );
        assert_eq!(
            result.unit, case.target_unit,
            "Case {}: unit mismatch", case.id
        );
    }
}

#[test]
fn test_reject_cases() {
    for case in get_reject_cases() {
        let result = calculate(
            d(case.base_dose),
            WeightBasis::from_stored(case.per_weight.map(d)),
            d(case.weight),
            case.source_unit,
            case.target_unit,
        );

        match result {
            Ok(dose) => panic!(
                "Case {}: expected {}, got dose {}",
                case.id, case.expected_error, dose.calculated_dose
            ),
            Err(e) => assert_eq!(
                error_kind(&e),
                case.expected_error,
                "Case {}: wrong error ({})",
                case.id,
                e
            ),
        }
    }
}

#[test]
fn test_results_always_carry_five_decimals() {
    for case in get_golden_cases() {
        let result = calculate(
            d(case.base_dose),
            WeightBasis::from_stored(case.per_weight.map(d)),
            d(case.weight),
            case.source_unit,
            case.target_unit,
        )
        .unwrap();
        assert_eq!(result.calculated_dose.scale(), 5, "Case {}", case.id);
    }
}

#[test]
fn test_rounding_matches_exact_rational() {
    // 100 mg per 3 kg at 10 kg is exactly 1000/3 mg
    let result = calculate(
        d("100"),
        WeightBasis::PerReference(d("3")),
        d("10"),
        "mg",
        "mg",
    )
    .unwrap();

    // Independent computation: floor(1000 * 10^5 / 3) with a half-up check on the remainder
    let scaled = 1000u128 * 100_000;
    let quotient = scaled / 3;
    let remainder = scaled % 3;
    let rounded = if remainder * 2 >= 3 { quotient + 1 } else { quotient };
    let expected = Decimal::from_i128_with_scale(rounded as i128, 5);

    assert_eq!(result.calculated_dose, expected);
    assert_eq!(result.calculated_dose.to_string(), "333.33333");
}
