//! JSON storage behavior: snapshot round-trips, backups with retention,
//! and roster persistence.

mod common;

use common::{date, manager, month, temp_storage};
use tuition_core::core::services::{NewReceipt, PeriodService, ReceiptService};
use tuition_core::domain::{Student, StudentRoster};
use tuition_core::ledger::Ledger;
use tuition_core::storage::StorageBackend;

fn populated_ledger() -> (Ledger, StudentRoster) {
    let mut ledger = Ledger::new("Riverside");
    let mut roster = StudentRoster::new();
    let actor = manager();
    let student = roster.add(Student::new("Ali").with_fee(1000.0));
    let jan =
        PeriodService::create_single(&mut ledger, &roster, &actor, student, month(1, 2024))
            .unwrap();
    ReceiptService::record(
        &mut ledger,
        &actor,
        jan,
        NewReceipt::new(600.0, date(2024, 1, 10)),
    )
    .unwrap();
    PeriodService::create_single(&mut ledger, &roster, &actor, student, month(2, 2024)).unwrap();
    (ledger, roster)
}

#[test]
fn populated_ledger_round_trips_exactly() {
    let storage = temp_storage();
    let (ledger, _) = populated_ledger();
    storage.save_ledger(&ledger, "riverside").unwrap();

    let loaded = storage.load_ledger("riverside").unwrap();
    assert_eq!(loaded.id, ledger.id);
    assert_eq!(loaded.fee_periods.len(), 2);
    assert_eq!(loaded.receipts.len(), 1);
    let january = &loaded.fee_periods[0];
    assert_eq!(january.remaining_balance(), 400.0);
    let february = &loaded.fee_periods[1];
    assert_eq!(february.balance_carried_over, 400.0);
    // The lock survives the round trip too.
    assert!(loaded.is_settlement_locked(january));
}

#[test]
fn backups_are_pruned_to_the_configured_retention() {
    let storage = temp_storage();
    let (ledger, _) = populated_ledger();
    storage.save_ledger(&ledger, "riverside").unwrap();

    for note in ["one", "two", "three", "four", "five"] {
        storage
            .backup_ledger(&ledger, "riverside", Some(note))
            .unwrap();
    }
    let backups = storage.list_backups("riverside").unwrap();
    assert_eq!(backups.len(), 3);
}

#[test]
fn restore_returns_the_backed_up_snapshot() {
    let storage = temp_storage();
    let (mut ledger, _) = populated_ledger();
    storage.save_ledger(&ledger, "riverside").unwrap();
    storage.backup_ledger(&ledger, "riverside", None).unwrap();
    let backup_name = storage.list_backups("riverside").unwrap()[0].clone();

    // Mutate and save, then restore the earlier state.
    ledger.fee_periods.clear();
    storage.save_ledger(&ledger, "riverside").unwrap();
    assert!(storage
        .load_ledger("riverside")
        .unwrap()
        .fee_periods
        .is_empty());

    let restored = storage.restore_backup("riverside", &backup_name).unwrap();
    assert_eq!(restored.fee_periods.len(), 2);
}

#[test]
fn roster_persists_between_sessions() {
    let storage = temp_storage();
    let (_, roster) = populated_ledger();
    storage.save_roster(&roster).unwrap();

    let loaded = storage.load_roster().unwrap();
    assert_eq!(loaded.students.len(), 1);
    assert_eq!(loaded.students[0].monthly_fee, Some(1000.0));
}

#[test]
fn newer_schema_versions_are_refused() {
    let storage = temp_storage();
    let mut ledger = Ledger::new("Future");
    ledger.schema_version = 99;
    storage.save_ledger(&ledger, "future").unwrap();

    let err = storage.load_ledger("future").expect_err("must refuse");
    assert!(err.to_string().contains("schema version"));
}

#[test]
fn missing_ledger_reports_a_readable_error() {
    let storage = temp_storage();
    let err = storage.load_ledger("ghost").expect_err("must fail");
    assert!(err.to_string().contains("ghost"));
}
