//! Property-based tests for the `combine_entities` rewrite.
//!
//! Run with: cargo test -p combine-plugin --test `property_tests`

use combine_core::{Amount, Directive, NaiveDate, Posting, SourceLocation, Transaction};
use combine_plugin::{combine_entities, PluginInput, PluginOptions};
use proptest::prelude::*;
use rust_decimal::Decimal;

const CONFIG: &str = r#"{
    'filter_account': 'Liabilities:Principal',
    'our_tag': 'oi-master',
    'filter_amount': 'dt',
    'our_account': 'Assets:Agent',
    'super_meta': 'sub',
    'sm_sales': 'Expenses:Agency;sub:sales expenses',
    'sm_cash*': 'Liabilities:Intra-group;sub:*',
}"#;

// ============================================================================
// Arbitrary generators
// ============================================================================

fn arb_decimal() -> impl Strategy<Value = Decimal> {
    (-1_000_000i64..1_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

fn arb_positive_decimal() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

fn arb_currency() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("EUR".to_string()),
        Just("USD".to_string()),
        Just("GBP".to_string()),
    ]
}

fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (2020u32..2025u32, 1u32..13u32, 1u32..29u32)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y as i32, m, d).unwrap())
}

fn arb_sub() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("sales".to_string()),
        "cash[a-z]{0,4}",
    ]
}

fn arb_ours() -> impl Strategy<Value = Transaction> {
    (arb_date(), arb_decimal(), arb_currency(), 0u32..1000).prop_map(|(date, n, c, line)| {
        Transaction::new(date, "principal")
            .with_tag("oi-master")
            .with_source(&SourceLocation::new("principal.bean", line))
            .with_posting(Posting::new("Assets:Agent", Amount::new(n, c.clone())))
            .with_posting(Posting::new("Income:Sales", Amount::new(-n, c)))
    })
}

/// Agent transaction with exactly one selectable posting.
fn arb_agent() -> impl Strategy<Value = Transaction> {
    (
        arb_date(),
        arb_positive_decimal(),
        arb_currency(),
        arb_sub(),
        0u32..1000,
    )
        .prop_map(|(date, n, c, sub, line)| {
            Transaction::new(date, "agent")
                .with_source(&SourceLocation::new("agent.bean", line))
                .with_posting(
                    Posting::new("Liabilities:Principal", Amount::new(n, c.clone()))
                        .with_meta("sub", sub),
                )
                .with_posting(Posting::new("Assets:Bank", Amount::new(-n, c)))
        })
}

fn arb_entries() -> impl Strategy<Value = Vec<(bool, Transaction)>> {
    prop::collection::vec(
        prop_oneof![
            arb_ours().prop_map(|t| (true, t)),
            arb_agent().prop_map(|t| (false, t)),
        ],
        0..20,
    )
}

fn run(directives: Vec<Directive>) -> Vec<Directive> {
    combine_entities(PluginInput {
        directives,
        options: PluginOptions::default(),
        config: Some(CONFIG.to_string()),
    })
    .unwrap()
    .directives
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_ours_unchanged_in_order(entries in arb_entries()) {
        let ours: Vec<Transaction> = entries
            .iter()
            .filter(|(is_ours, _)| *is_ours)
            .map(|(_, t)| t.clone())
            .collect();
        let output = run(entries.into_iter().map(|(_, t)| t.into()).collect());

        let kept: Vec<Transaction> = output
            .iter()
            .filter_map(Directive::as_transaction)
            .filter(|t| t.has_tag("oi-master"))
            .cloned()
            .collect();
        prop_assert_eq!(kept, ours);
    }

    #[test]
    fn prop_rewritten_pair_sums_to_zero(txn in arb_agent()) {
        let output = run(vec![txn.into()]);
        prop_assert_eq!(output.len(), 1);

        let rewritten = output[0].as_transaction().unwrap();
        prop_assert_eq!(rewritten.postings.len(), 2);
        let moved = rewritten.postings[0].amount().unwrap();
        let balancing = rewritten.postings[1].amount().unwrap();
        prop_assert_eq!(&moved.currency, &balancing.currency);
        prop_assert_eq!(moved.number + balancing.number, Decimal::ZERO);
        prop_assert_eq!(&rewritten.postings[0].account, "Assets:Agent");
    }

    #[test]
    fn prop_no_double_rewrite(entries in prop::collection::vec(arb_agent(), 0..20)) {
        let once = run(entries.into_iter().map(Into::into).collect());
        let twice = run(once);
        prop_assert!(twice.is_empty());
    }
}
