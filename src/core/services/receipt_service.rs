//! Receipt recorder: applies a single payment to one fee period.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::core::access::ActorContext;
use crate::core::services::{ServiceError, ServiceResult};
use crate::domain::money::{round_cents, to_cents};
use crate::domain::Receipt;
use crate::ledger::Ledger;

/// Input for recording one payment.
#[derive(Debug, Clone)]
pub struct NewReceipt {
    pub amount: f64,
    pub date: NaiveDate,
    pub receipt_number: Option<String>,
    pub notes: Option<String>,
}

impl NewReceipt {
    pub fn new(amount: f64, date: NaiveDate) -> Self {
        Self {
            amount,
            date,
            receipt_number: None,
            notes: None,
        }
    }
}

pub struct ReceiptService;

impl ReceiptService {
    /// Inserts the receipt and increments the period's paid amount, both or
    /// neither. Fails on missing periods, settlement-locked periods, and
    /// overpayment (reporting the accepted maximum).
    pub fn record(
        ledger: &mut Ledger,
        actor: &ActorContext,
        period_id: Uuid,
        input: NewReceipt,
    ) -> ServiceResult<Uuid> {
        actor.ensure_can_manage()?;
        if to_cents(input.amount) <= 0 {
            return Err(ServiceError::Validation(
                "receipt amount must be positive".into(),
            ));
        }
        let period = ledger
            .fee_period(period_id)
            .ok_or(ServiceError::PeriodNotFound(period_id))?;
        if ledger.is_settlement_locked(period) {
            return Err(ServiceError::SettlementLocked(period_id));
        }
        let remaining = period.remaining_balance();
        if to_cents(period.amount_paid + input.amount) > to_cents(period.amount_due()) {
            return Err(ServiceError::Overpayment {
                attempted: input.amount,
                remaining,
            });
        }

        let mut receipt = Receipt::new(period_id, input.amount, input.date);
        receipt.receipt_number = input.receipt_number;
        receipt.notes = input.notes;

        let period = ledger
            .fee_period_mut(period_id)
            .ok_or(ServiceError::PeriodNotFound(period_id))?;
        period.amount_paid = round_cents(period.amount_paid + receipt.amount);
        let id = ledger.add_receipt(receipt);
        tracing::info!(receipt = %id, period = %period_id, amount = input.amount, "receipt recorded");
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::services::PeriodService;
    use crate::domain::{BillingMonth, PaymentStatus, Student, StudentRoster};

    fn month(m: u32) -> BillingMonth {
        BillingMonth::new(m, 2024).unwrap()
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn ledger_with_period(fee: f64) -> (Ledger, StudentRoster, ActorContext, Uuid, Uuid) {
        let mut ledger = Ledger::new("Test");
        let mut roster = StudentRoster::new();
        let actor = ActorContext::manager(Uuid::new_v4());
        let student = roster.add(Student::new("Ali").with_fee(fee));
        let period =
            PeriodService::create_single(&mut ledger, &roster, &actor, student, month(1)).unwrap();
        (ledger, roster, actor, student, period)
    }

    #[test]
    fn partial_payment_updates_status_and_balance() {
        let (mut ledger, _, actor, _, period) = ledger_with_period(1000.0);

        ReceiptService::record(&mut ledger, &actor, period, NewReceipt::new(600.0, date(5)))
            .unwrap();
        let period = ledger.fee_period(period).unwrap();
        assert_eq!(period.amount_paid, 600.0);
        assert_eq!(period.remaining_balance(), 400.0);
        assert_eq!(period.status(), PaymentStatus::Partial);
    }

    #[test]
    fn receipts_accumulate_to_full_settlement() {
        let (mut ledger, _, actor, _, period) = ledger_with_period(1000.0);

        ReceiptService::record(&mut ledger, &actor, period, NewReceipt::new(600.0, date(5)))
            .unwrap();
        ReceiptService::record(&mut ledger, &actor, period, NewReceipt::new(400.0, date(20)))
            .unwrap();
        let fetched = ledger.fee_period(period).unwrap();
        assert_eq!(fetched.status(), PaymentStatus::Paid);
        assert_eq!(ledger.receipts_for_period(period).len(), 2);
    }

    #[test]
    fn overpayment_reports_the_remaining_balance() {
        let (mut ledger, _, actor, _, period) = ledger_with_period(1000.0);
        ReceiptService::record(&mut ledger, &actor, period, NewReceipt::new(600.0, date(5)))
            .unwrap();

        let err =
            ReceiptService::record(&mut ledger, &actor, period, NewReceipt::new(500.0, date(6)))
                .expect_err("overpayment must fail");
        match err {
            ServiceError::Overpayment { remaining, .. } => assert_eq!(remaining, 400.0),
            other => panic!("unexpected error: {other:?}"),
        }
        // Nothing was written.
        assert_eq!(ledger.fee_period(period).unwrap().amount_paid, 600.0);
        assert_eq!(ledger.receipts_for_period(period).len(), 1);
    }

    #[test]
    fn locked_period_rejects_direct_receipts() {
        let (mut ledger, roster, actor, student, jan) = ledger_with_period(1000.0);
        ReceiptService::record(&mut ledger, &actor, jan, NewReceipt::new(600.0, date(5))).unwrap();

        // February picks up January's 400 and locks it.
        PeriodService::create_single(&mut ledger, &roster, &actor, student, month(2)).unwrap();

        let err = ReceiptService::record(&mut ledger, &actor, jan, NewReceipt::new(400.0, date(6)))
            .expect_err("locked period must refuse receipts");
        assert!(matches!(err, ServiceError::SettlementLocked(id) if id == jan));
    }

    #[test]
    fn zero_and_negative_amounts_are_invalid() {
        let (mut ledger, _, actor, _, period) = ledger_with_period(1000.0);
        for amount in [0.0, -25.0] {
            let err = ReceiptService::record(
                &mut ledger,
                &actor,
                period,
                NewReceipt::new(amount, date(5)),
            )
            .expect_err("must be rejected");
            assert!(matches!(err, ServiceError::Validation(_)));
        }
    }

    #[test]
    fn missing_period_is_not_found() {
        let (mut ledger, _, actor, _, _) = ledger_with_period(1000.0);
        let missing = Uuid::new_v4();
        let err =
            ReceiptService::record(&mut ledger, &actor, missing, NewReceipt::new(100.0, date(5)))
                .expect_err("must be not found");
        assert!(matches!(err, ServiceError::PeriodNotFound(id) if id == missing));
    }
}
