//! SQLite persistence of runs, statements and report items.

use royalty_core::{
    config::AgreementConfig,
    store::RoyaltyStore,
    types::new_run_id,
};
use rust_decimal_macros::dec;

fn store() -> RoyaltyStore {
    let store = RoyaltyStore::in_memory().expect("in-memory store");
    store.migrate().expect("migration");
    store
}

#[test]
fn migration_is_repeatable() {
    let store = store();
    store.migrate().expect("second migration");
    assert_eq!(store.run_count().unwrap(), 0);
}

#[test]
fn run_is_recorded_with_exact_advance() {
    let store = store();
    let run_id = new_run_id();

    store.insert_run(&run_id, Some("test"), dec!(1500.50), "0.1.0-test").unwrap();

    assert_eq!(store.run_count().unwrap(), 1);
    assert_eq!(store.run_ids().unwrap(), vec![run_id.clone()]);
    assert_eq!(store.run_advance(&run_id).unwrap(), Some(dec!(1500.50)));
    assert_eq!(store.run_advance("missing").unwrap(), None);
}

#[test]
fn statements_and_report_items_round_trip() {
    let store = store();
    let mut agreement = AgreementConfig::default_test().build().unwrap();
    let items = agreement.report().unwrap();

    let run_id = new_run_id();
    store.insert_run(&run_id, None, agreement.advance(), "0.1.0-test").unwrap();
    store.save_statements(&run_id, agreement.statements()).unwrap();
    store.save_report_items(&run_id, &items).unwrap();

    assert_eq!(store.statements_for_run(&run_id).unwrap(), agreement.statements());
    assert_eq!(store.report_items_for_run(&run_id).unwrap(), items);
    assert_eq!(store.report_item_count(&run_id).unwrap(), items.len() as i64);
}

#[test]
fn runs_are_isolated_from_each_other() {
    let store = store();
    let mut agreement = AgreementConfig::default_test().build().unwrap();
    let items = agreement.report().unwrap();

    let first = new_run_id();
    let second = new_run_id();
    assert_ne!(first, second);
    for run_id in [&first, &second] {
        store.insert_run(run_id, None, agreement.advance(), "0.1.0-test").unwrap();
    }
    store.append_report_item(&first, 0, &items[0]).unwrap();

    assert_eq!(store.report_item_count(&first).unwrap(), 1);
    assert_eq!(store.report_item_count(&second).unwrap(), 0);
}

#[test]
fn report_item_requires_a_known_run() {
    let store = store();
    let mut agreement = AgreementConfig::default_test().build().unwrap();
    let items = agreement.report().unwrap();

    assert!(store.append_report_item("no-such-run", 0, &items[0]).is_err());
}

#[test]
fn batch_save_for_unknown_run_stores_nothing() {
    let store = store();
    let mut agreement = AgreementConfig::default_test().build().unwrap();
    let items = agreement.report().unwrap();

    assert!(store.save_report_items("no-such-run", &items).is_err());
    assert_eq!(store.report_item_count("no-such-run").unwrap(), 0);
}

#[test]
fn batch_save_follows_single_appends() {
    let store = store();
    let mut agreement = AgreementConfig::default_test().build().unwrap();
    let items = agreement.report().unwrap();
    let run_id = new_run_id();
    store.insert_run(&run_id, None, agreement.advance(), "0.1.0-test").unwrap();

    store.append_report_item(&run_id, 0, &items[0]).unwrap();
    store.save_report_items(&run_id, &items[1..]).unwrap();

    assert_eq!(store.report_item_count(&run_id).unwrap(), items.len() as i64);
}
