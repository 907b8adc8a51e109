//! Property-based tests for combine-core.
//!
//! Run with: cargo test -p combine-core --test `property_tests`

use combine_core::{Amount, Directive, Open, Posting, SourceLocation};
use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

// ============================================================================
// Arbitrary generators
// ============================================================================

fn arb_decimal() -> impl Strategy<Value = Decimal> {
    (-1_000_000i64..1_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

fn arb_currency() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("USD".to_string()),
        Just("EUR".to_string()),
        Just("GBP".to_string()),
    ]
}

fn arb_amount() -> impl Strategy<Value = Amount> {
    (arb_decimal(), arb_currency()).prop_map(|(n, c)| Amount::new(n, c))
}

fn arb_location() -> impl Strategy<Value = SourceLocation> {
    ("[a-z]{1,8}\\.bean", 1u32..100_000).prop_map(|(f, l)| SourceLocation::new(f, l))
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_negation_is_involutive(amount in arb_amount()) {
        prop_assert_eq!(-(-&amount), amount);
    }

    #[test]
    fn prop_negation_sums_to_zero(amount in arb_amount()) {
        let neg = -&amount;
        prop_assert_eq!(neg.currency.as_str(), amount.currency.as_str());
        prop_assert!((amount.number + neg.number).is_zero());
    }

    #[test]
    fn prop_sign_is_exclusive(amount in arb_amount()) {
        let signs = [amount.is_positive(), amount.is_negative(), amount.is_zero()];
        prop_assert_eq!(signs.iter().filter(|s| **s).count(), 1);
    }

    #[test]
    fn prop_source_survives_metadata(location in arb_location()) {
        let posting = Posting::auto("Assets:Bank").with_source(&location);
        prop_assert_eq!(posting.source(), Some(location.clone()));

        let open = Directive::Open(Open::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            "Assets:Bank",
        ))
        .with_source(&location);
        prop_assert_eq!(open.filename(), Some(location.filename.as_str()));
    }
}
