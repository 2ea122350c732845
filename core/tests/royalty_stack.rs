//! Royalty stack: tier splitting on sales, LIFO unwinding on returns.

use royalty_core::{Fragment, Frame, RoyaltyError, RoyaltyStack, TierTable};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn standard_table() -> TierTable {
    TierTable::from_string("7-5000,8-10000,9-0").unwrap()
}

fn frag(tier: usize, rate: Decimal, copies: i64) -> Fragment {
    Fragment { tier, rate, copies }
}

#[test]
fn sales_fill_tiers_bottom_up() {
    let table = standard_table();
    let mut stack = RoyaltyStack::new();

    assert_eq!(stack.apply(&table, 4999).unwrap(), vec![frag(0, dec!(7), 4999)]);
    assert_eq!(
        stack.apply(&table, 5002).unwrap(),
        vec![frag(0, dec!(7), 1), frag(1, dec!(8), 5000), frag(2, dec!(9), 1)]
    );
    assert_eq!(stack.apply(&table, 7000).unwrap(), vec![frag(2, dec!(9), 7000)]);
    assert_eq!(stack.total_filled(), 17001);
}

#[test]
fn returns_drain_the_highest_tier_first() {
    let table = standard_table();
    let mut stack = RoyaltyStack::new();
    stack.apply(&table, 12500).unwrap();

    assert_eq!(
        stack.apply(&table, -6000).unwrap(),
        vec![frag(2, dec!(9), -2500), frag(1, dec!(8), -3500)]
    );
    assert_eq!(
        stack.frames(),
        &[
            Frame { tier: 0, units_filled: 5000 },
            Frame { tier: 1, units_filled: 1500 },
        ]
    );
}

#[test]
fn sale_straddling_a_boundary_yields_two_fragments() {
    let table = TierTable::from_string("7-5000,8-0").unwrap();
    let mut stack = RoyaltyStack::new();

    let fragments = stack.apply(&table, 5100).unwrap();

    assert_eq!(fragments, vec![frag(0, dec!(7), 5000), frag(1, dec!(8), 100)]);
}

#[test]
fn return_after_straddling_sale_reopens_lower_tier_only() {
    let table = TierTable::from_string("7-5000,8-0").unwrap();
    let mut stack = RoyaltyStack::new();
    stack.apply(&table, 5100).unwrap();

    let fragments = stack.apply(&table, -100).unwrap();

    assert_eq!(fragments, vec![frag(1, dec!(8), -100)]);
    assert_eq!(stack.frames(), &[Frame { tier: 0, units_filled: 5000 }]);
    assert_eq!(stack.total_filled(), 5000);
}

#[test]
fn return_on_empty_stack_is_rejected() {
    let table = standard_table();
    let mut stack = RoyaltyStack::new();

    let err = stack.apply(&table, -10).unwrap_err();

    assert!(matches!(err, RoyaltyError::InvalidReturn { requested: 10, available: 0 }));
    assert_eq!(stack.total_filled(), 0);
    assert!(stack.is_empty());
}

#[test]
fn oversized_return_leaves_stack_untouched() {
    let table = standard_table();
    let mut stack = RoyaltyStack::new();
    stack.apply(&table, 5300).unwrap();
    let before = stack.clone();

    let err = stack.apply(&table, -5301).unwrap_err();

    assert!(matches!(err, RoyaltyError::InvalidReturn { requested: 5301, available: 5300 }));
    assert_eq!(stack, before);
}

#[test]
fn returning_everything_empties_the_stack() {
    let table = standard_table();
    let mut stack = RoyaltyStack::new();
    stack.apply(&table, 10001).unwrap();

    let fragments = stack.apply(&table, -10001).unwrap();

    assert_eq!(
        fragments,
        vec![frag(2, dec!(9), -1), frag(1, dec!(8), -5000), frag(0, dec!(7), -5000)]
    );
    assert!(stack.is_empty());
    assert_eq!(stack.top_tier(), None);
}

#[test]
fn filling_a_tier_exactly_opens_the_next_on_the_following_sale() {
    let table = standard_table();
    let mut stack = RoyaltyStack::new();

    assert_eq!(stack.apply(&table, 5000).unwrap(), vec![frag(0, dec!(7), 5000)]);
    assert_eq!(stack.top_tier(), Some(0));
    assert_eq!(stack.apply(&table, 1).unwrap(), vec![frag(1, dec!(8), 1)]);
    assert_eq!(stack.top_tier(), Some(1));
}

#[test]
fn zero_delta_is_a_no_op() {
    let table = standard_table();
    let mut stack = RoyaltyStack::new();
    stack.apply(&table, 42).unwrap();

    assert!(stack.apply(&table, 0).unwrap().is_empty());
    assert_eq!(stack.total_filled(), 42);
}

#[test]
fn reset_discards_history() {
    let table = standard_table();
    let mut stack = RoyaltyStack::new();
    stack.apply(&table, 500).unwrap();

    stack.reset();

    assert_eq!(stack.apply(&table, 5000).unwrap(), vec![frag(0, dec!(7), 5000)]);
}

#[test]
fn sales_past_the_copies_range_fail_atomically() {
    let table = TierTable::from_string("7-0").unwrap();
    let mut stack = RoyaltyStack::new();
    stack.apply(&table, i64::MAX).unwrap();
    let before = stack.clone();

    for delta in [1, i64::MAX] {
        let err = stack.apply(&table, delta).unwrap_err();
        assert!(matches!(err, RoyaltyError::Overflow { .. }), "{delta}");
        assert_eq!(stack, before);
    }
    assert_eq!(stack.total_filled(), i64::MAX as u64);

    // Returns still work from the capped total.
    assert_eq!(stack.apply(&table, -1).unwrap(), vec![frag(0, dec!(7), -1)]);
}

#[test]
fn frames_open_at_the_tier_holding_the_next_unit() {
    let table = standard_table();
    let mut stack = RoyaltyStack::new();

    for delta in [1, 4999, 1, 4999, 1, 3000] {
        stack.apply(&table, delta).unwrap();
        let last_unit = stack.total_filled() - 1;
        assert_eq!(stack.top_tier(), Some(table.tier_at(last_unit)), "after {delta}");
    }
    assert_eq!(
        stack.frames(),
        &[
            Frame { tier: 0, units_filled: 5000 },
            Frame { tier: 1, units_filled: 5000 },
            Frame { tier: 2, units_filled: 3001 },
        ]
    );
}

#[test]
fn table_without_the_stacked_tiers_is_rejected() {
    let table = standard_table();
    let mut stack = RoyaltyStack::new();
    stack.apply(&table, 12500).unwrap();
    let before = stack.clone();
    let flat = TierTable::from_string("7-0").unwrap();

    let err = stack.apply(&flat, -100).unwrap_err();
    assert!(matches!(err, RoyaltyError::CapacityExhausted { tier: 2 }));
    assert_eq!(stack, before);

    let err = stack.apply(&flat, 100).unwrap_err();
    assert!(matches!(err, RoyaltyError::CapacityExhausted { tier: 2 }));
    assert_eq!(stack, before);
}
