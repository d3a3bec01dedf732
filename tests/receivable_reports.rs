//! Receivable projections driven through the full service stack with a
//! pinned clock.

mod common;

use common::{date, empty_ledger, manager, month};
use tuition_core::core::services::{
    AllocationService, NewReceipt, PayByParentRequest, PeriodService, ReceiptService,
    ReceivableFilter, ReceivableService,
};
use tuition_core::core::time::FixedClock;
use tuition_core::domain::{PaymentStatus, Student, StudentRoster};

/// Three students: Ali partially paid for January, Omar unpaid for
/// February, Zayd fully settled for January.
fn reporting_fixture() -> (
    tuition_core::ledger::Ledger,
    StudentRoster,
    [uuid::Uuid; 3],
) {
    let mut ledger = empty_ledger();
    let mut roster = StudentRoster::new();
    let actor = manager();

    let ali = roster.add(Student::new("Ali").with_fee(1000.0));
    let omar = roster.add(Student::new("Omar").with_fee(600.0));
    let zayd = roster.add(Student::new("Zayd").with_fee(800.0));

    let ali_jan =
        PeriodService::create_single(&mut ledger, &roster, &actor, ali, month(1, 2024)).unwrap();
    ReceiptService::record(
        &mut ledger,
        &actor,
        ali_jan,
        NewReceipt::new(400.0, date(2024, 1, 10)),
    )
    .unwrap();

    PeriodService::create_single(&mut ledger, &roster, &actor, omar, month(2, 2024)).unwrap();

    let zayd_jan =
        PeriodService::create_single(&mut ledger, &roster, &actor, zayd, month(1, 2024)).unwrap();
    ReceiptService::record(
        &mut ledger,
        &actor,
        zayd_jan,
        NewReceipt::new(800.0, date(2024, 1, 12)),
    )
    .unwrap();

    (ledger, roster, [ali, omar, zayd])
}

#[test]
fn list_restricts_to_open_balances_before_any_other_filter() {
    let (ledger, roster, _) = reporting_fixture();
    let clock = FixedClock(date(2024, 3, 1));

    let page =
        ReceivableService::list(&ledger, &roster, &clock, &ReceivableFilter::default()).unwrap();
    // Zayd is settled and never appears.
    assert_eq!(page.total, 2);
    assert!(page
        .items
        .iter()
        .all(|item| item.remaining_balance > 0.0));
}

#[test]
fn list_status_filter_narrows_the_total() {
    let (ledger, roster, _) = reporting_fixture();
    let clock = FixedClock(date(2024, 3, 1));

    let filter = ReceivableFilter {
        status: Some(PaymentStatus::Unpaid),
        ..ReceivableFilter::default()
    };
    let page = ReceivableService::list(&ledger, &roster, &clock, &filter).unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].status, PaymentStatus::Unpaid);

    let filter = ReceivableFilter {
        status: Some(PaymentStatus::Partial),
        ..ReceivableFilter::default()
    };
    let page = ReceivableService::list(&ledger, &roster, &clock, &filter).unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].remaining_balance, 600.0);
}

#[test]
fn list_search_and_month_filters_compose() {
    let (ledger, roster, students) = reporting_fixture();
    let clock = FixedClock(date(2024, 3, 1));

    let filter = ReceivableFilter {
        search: Some("omar".into()),
        ..ReceivableFilter::default()
    };
    let page = ReceivableService::list(&ledger, &roster, &clock, &filter).unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].student_id, students[1]);

    let filter = ReceivableFilter {
        month: Some(1),
        year: Some(2024),
        ..ReceivableFilter::default()
    };
    let page = ReceivableService::list(&ledger, &roster, &clock, &filter).unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].student_id, students[0]);
}

#[test]
fn by_student_reports_history_with_receipts() {
    let (ledger, roster, students) = reporting_fixture();
    let clock = FixedClock(date(2024, 3, 1));

    let view = ReceivableService::by_student(&ledger, &roster, &clock, students[0]).unwrap();
    assert_eq!(view.total_outstanding, 600.0);
    assert_eq!(view.outstanding.len(), 1);
    assert_eq!(view.history.len(), 1);
    assert_eq!(view.history[0].receipts.len(), 1);
    assert_eq!(view.history[0].receipts[0].amount, 400.0);

    // Zayd owes nothing but keeps a full history.
    let view = ReceivableService::by_student(&ledger, &roster, &clock, students[2]).unwrap();
    assert_eq!(view.total_outstanding, 0.0);
    assert!(view.outstanding.is_empty());
    assert_eq!(view.history.len(), 1);
}

#[test]
fn dashboard_overdue_and_aging_reconcile() {
    let (ledger, _, _) = reporting_fixture();

    // Mid-March: January (due Jan 31) is 44 days overdue, February (due
    // Feb 29) is 15 days overdue.
    let clock = FixedClock(date(2024, 3, 15));
    let dashboard = ReceivableService::dashboard(&ledger, &clock);

    assert_eq!(dashboard.total_outstanding_balance, 1200.0);
    assert_eq!(dashboard.students_with_balance, 2);
    assert_eq!(dashboard.total_overdue_amount, 1200.0);
    assert_eq!(dashboard.aging.days_0_30, 600.0);
    assert_eq!(dashboard.aging.days_31_60, 600.0);
    assert_eq!(dashboard.aging.days_61_plus, 0.0);
    assert_eq!(dashboard.aging.total(), dashboard.total_overdue_amount);
    assert!(dashboard.total_overdue_amount <= dashboard.total_outstanding_balance);

    // Before either due date, nothing is overdue.
    let clock = FixedClock(date(2024, 1, 20));
    let dashboard = ReceivableService::dashboard(&ledger, &clock);
    assert_eq!(dashboard.total_overdue_amount, 0.0);
    assert_eq!(dashboard.total_outstanding_balance, 1200.0);
}

#[test]
fn dashboard_reflects_settlement_through_the_allocators() {
    let (mut ledger, mut roster, students) = reporting_fixture();
    let actor = manager();

    // Omar's parent pays his February in full.
    let parent = uuid::Uuid::new_v4();
    roster.student_mut(students[1]).unwrap().parent_id = Some(parent);
    AllocationService::pay_by_parent(
        &mut ledger,
        &roster,
        &actor,
        PayByParentRequest {
            parent_id: parent,
            month: month(2, 2024),
            total_amount: 600.0,
            discount: 0.0,
            date: date(2024, 3, 1),
            receipt_number: None,
            notes: None,
        },
    )
    .unwrap();

    let clock = FixedClock(date(2024, 3, 15));
    let dashboard = ReceivableService::dashboard(&ledger, &clock);
    assert_eq!(dashboard.total_outstanding_balance, 600.0);
    assert_eq!(dashboard.students_with_balance, 1);

    let trend_feb = dashboard
        .monthly_trend
        .iter()
        .find(|entry| entry.month == month(2, 2024))
        .unwrap();
    assert_eq!(trend_feb.outstanding, 0.0);
    let trend_jan = dashboard
        .monthly_trend
        .iter()
        .find(|entry| entry.month == month(1, 2024))
        .unwrap();
    assert_eq!(trend_jan.outstanding, 600.0);
}

#[test]
fn due_date_override_drives_overdue_classification() {
    let (mut ledger, _, students) = reporting_fixture();
    let actor = manager();
    let period = ledger.period_for(students[0], month(1, 2024)).unwrap().id;

    // Push Ali's due date into April: no longer overdue in March.
    PeriodService::set_due_date(&mut ledger, &actor, period, Some(date(2024, 4, 30))).unwrap();
    let clock = FixedClock(date(2024, 3, 15));
    let summary = ReceivableService::summary(&ledger, &clock, period).unwrap();
    assert!(!summary.is_overdue);
    assert_eq!(summary.due_date, date(2024, 4, 30));
}
