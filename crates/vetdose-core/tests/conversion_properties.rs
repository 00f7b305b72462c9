//! Property tests for unit conversion and dosage laws.

use proptest::prelude::*;
use rust_decimal::Decimal;
use vetdose_core::dosage::{calculate, WeightBasis};
use vetdose_core::units::{convert, family_of, is_compatible, round_dose, UnitFamily};

fn all_units() -> Vec<&'static str> {
    UnitFamily::ALL
        .iter()
        .flat_map(|family| family.unit_codes())
        .collect()
}

/// Ordered same-family pairs where the source unit is at least as large as
/// the target, so the first conversion never drops below the fifth decimal.
fn widening_pairs() -> Vec<(&'static str, &'static str)> {
    let mut pairs = Vec::new();
    for family in UnitFamily::ALL {
        for (from, from_factor) in family.factors() {
            for (to, to_factor) in family.factors() {
                if from_factor >= to_factor {
                    pairs.push((*from, *to));
                }
            }
        }
    }
    pairs
}

fn same_family_pairs() -> Vec<(&'static str, &'static str)> {
    let mut pairs = Vec::new();
    for family in UnitFamily::ALL {
        for from in family.unit_codes() {
            for to in family.unit_codes() {
                pairs.push((from, to));
            }
        }
    }
    pairs
}

/// Positive decimals up to 1e9 with up to 8 fractional digits.
fn positive_decimal() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000_000, 0u32..=8).prop_map(|(mantissa, scale)| Decimal::new(mantissa, scale))
}

proptest! {
    #[test]
    fn prop_identity_conversion_rounds(
        v in positive_decimal(),
        unit in prop::sample::select(all_units()),
    ) {
        prop_assert_eq!(convert(v, unit, unit).unwrap(), round_dose(v).unwrap());
    }

    #[test]
    fn prop_round_trip_within_one_unit(
        v in positive_decimal(),
        (from, to) in prop::sample::select(widening_pairs()),
    ) {
        let there = convert(v, from, to).unwrap();
        let back = convert(there, to, from).unwrap();
        let expected = round_dose(v).unwrap();
        prop_assert!(
            (back - expected).abs() <= Decimal::new(1, 5),
            "{} {} -> {} {} -> {} {}", v, from, there, to, back, from
        );
    }

    #[test]
    fn prop_compatibility_is_symmetric(
        a in prop::sample::select(all_units()),
        b in prop::sample::select(all_units()),
    ) {
        prop_assert_eq!(is_compatible(a, b), is_compatible(b, a));
        prop_assert_eq!(is_compatible(a, b), family_of(a).unwrap() == family_of(b).unwrap());
    }

    #[test]
    fn prop_dose_has_five_decimals(
        base in (1i64..10_000_000, 0u32..=2).prop_map(|(m, s)| Decimal::new(m, s)),
        reference in (1i64..1_000_000).prop_map(|m| Decimal::new(m, 2)),
        weight in (1i64..100_000).prop_map(|m| Decimal::new(m, 2)),
        (source, target) in prop::sample::select(same_family_pairs()),
    ) {
        let basis = WeightBasis::PerReference(reference);
        let dose = calculate(base, basis, weight, source, target).unwrap();
        prop_assert_eq!(dose.calculated_dose.scale(), 5);
        prop_assert!(dose.calculated_dose >= Decimal::ZERO);
        prop_assert_eq!(dose.unit, target);
    }

    #[test]
    fn prop_cross_family_always_rejected(
        v in positive_decimal(),
        a in prop::sample::select(all_units()),
        b in prop::sample::select(all_units()),
    ) {
        prop_assume!(family_of(a).unwrap() != family_of(b).unwrap());
        prop_assert!(convert(v, a, b).is_err());
    }
}

#[test]
fn test_narrowing_round_trip_loses_resolution() {
    // 1 mg is below the fifth decimal of a kilogram, so the round trip is lossy
    let there = convert(Decimal::ONE, "mg", "kg").unwrap();
    assert_eq!(there, Decimal::ZERO);
    assert_eq!(convert(there, "kg", "mg").unwrap(), Decimal::ZERO);
}
