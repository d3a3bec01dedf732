#![allow(dead_code)]

use std::sync::Mutex;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use tempfile::TempDir;
use uuid::Uuid;

use tuition_core::core::access::ActorContext;
use tuition_core::domain::{BillingMonth, Student, StudentRoster};
use tuition_core::ledger::Ledger;
use tuition_core::storage::JsonStorage;

/// Holds TempDir guards so temporary folders live for the duration of the
/// test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Creates isolated JSON storage backed by a unique directory.
pub fn temp_storage() -> JsonStorage {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    JsonStorage::new(Some(base), Some(3)).expect("create json storage backend")
}

pub fn month(m: u32, y: i32) -> BillingMonth {
    BillingMonth::new(m, y).expect("valid billing month")
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub fn manager() -> ActorContext {
    ActorContext::manager(Uuid::new_v4())
}

pub fn empty_ledger() -> Ledger {
    Ledger::new("Test School")
}

/// Builds a roster of billable siblings sharing one parent. Student ids are
/// fixed so the allocation order (stable sort by id) matches the listed
/// order.
pub fn sibling_roster(children: &[(&str, f64)]) -> (StudentRoster, Uuid, Vec<Uuid>) {
    let parent = Uuid::new_v4();
    let mut roster = StudentRoster::new();
    let mut ids = Vec::new();
    for (index, (name, fee)) in children.iter().enumerate() {
        let mut student = Student::new(*name).with_fee(*fee).with_parent(parent);
        student.id = Uuid::from_u128(index as u128 + 1);
        ids.push(student.id);
        roster.add(student);
    }
    (roster, parent, ids)
}
