//! Batch allocator: splits one payment across several fee periods.
//!
//! Both entry points stage their writes on a clone of the ledger and swap
//! it in only when every validation passed, so a failure leaves zero new
//! periods or receipts behind.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::core::access::ActorContext;
use crate::core::services::{PeriodService, ServiceError, ServiceResult};
use crate::domain::money::{amounts_equal, round_cents, to_cents};
use crate::domain::{BillingMonth, Receipt, ReceiptBatch, StudentDirectory};
use crate::ledger::Ledger;

/// One lump sum settling a contiguous month range for one student.
#[derive(Debug, Clone)]
pub struct PayForwardRequest {
    pub student_id: Uuid,
    pub from: BillingMonth,
    pub to: BillingMonth,
    pub total_amount: f64,
    pub date: NaiveDate,
    pub receipt_number: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PayForwardOutcome {
    pub batch_id: Uuid,
    pub created: usize,
    /// Months settled by this payment, oldest first.
    pub months: Vec<BillingMonth>,
    /// Months in the range that needed no receipt (already settled, or
    /// balance already carried forward).
    pub skipped: Vec<BillingMonth>,
}

/// One lump sum (plus optional discount) covering one month for all of a
/// parent's billable children.
#[derive(Debug, Clone)]
pub struct PayByParentRequest {
    pub parent_id: Uuid,
    pub month: BillingMonth,
    pub total_amount: f64,
    pub discount: f64,
    pub date: NaiveDate,
    pub receipt_number: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ChildAllocation {
    pub student_id: Uuid,
    pub fee_period_id: Uuid,
    pub amount: f64,
    pub discount: f64,
}

#[derive(Debug, Clone)]
pub struct PayByParentOutcome {
    pub created: usize,
    pub total_amount: f64,
    pub allocations: Vec<ChildAllocation>,
}

pub struct AllocationService;

impl AllocationService {
    /// Walks the month range chronologically, ensuring each period exists
    /// and settling it in full before the next month is ensured, so
    /// lazily-created periods see the true ledger state. The lump sum must
    /// match the collected total exactly (one cent of slack).
    pub fn pay_forward(
        ledger: &mut Ledger,
        directory: &dyn StudentDirectory,
        actor: &ActorContext,
        request: PayForwardRequest,
    ) -> ServiceResult<PayForwardOutcome> {
        actor.ensure_can_manage()?;
        let student = directory
            .student(request.student_id)
            .ok_or(ServiceError::StudentNotFound(request.student_id))?;
        actor.ensure_student_in_scope(&student)?;
        if to_cents(request.total_amount) <= 0 {
            return Err(ServiceError::Validation(
                "payment amount must be positive".into(),
            ));
        }
        if request.from > request.to {
            return Err(ServiceError::Validation(
                "month range start must not be after its end".into(),
            ));
        }

        let mut staged = ledger.clone();
        let mut batch = ReceiptBatch::new(student.id, request.from, request.to, request.date);
        batch.receipt_number = request.receipt_number.clone();
        batch.notes = request.notes.clone();

        let mut settled = Vec::new();
        let mut skipped = Vec::new();
        let mut expected_total = 0.0;
        for month in BillingMonth::range_inclusive(request.from, request.to) {
            let period_id =
                PeriodService::ensure_period(&mut staged, directory, student.id, month)?;
            let (remaining, locked) = {
                let period = staged
                    .fee_period(period_id)
                    .ok_or(ServiceError::PeriodNotFound(period_id))?;
                (period.remaining_balance(), staged.is_settlement_locked(period))
            };
            if to_cents(remaining) <= 0 || locked {
                skipped.push(month);
                continue;
            }

            expected_total = round_cents(expected_total + remaining);
            let mut receipt = Receipt::new(period_id, remaining, request.date);
            receipt.receipt_number = request.receipt_number.clone();
            receipt.notes = request.notes.clone();
            receipt.batch_id = Some(batch.id);
            let period = staged
                .fee_period_mut(period_id)
                .ok_or(ServiceError::PeriodNotFound(period_id))?;
            period.amount_paid = round_cents(period.amount_paid + remaining);
            staged.add_receipt(receipt);
            settled.push(month);
        }

        if !amounts_equal(request.total_amount, expected_total) {
            return Err(ServiceError::AmountMismatch {
                expected: expected_total,
                provided: request.total_amount,
            });
        }

        batch.total_amount = expected_total;
        let batch_id = staged.add_receipt_batch(batch);
        *ledger = staged;
        tracing::info!(
            batch = %batch_id,
            student = %student.id,
            months = settled.len(),
            total = expected_total,
            "pay-forward allocation committed"
        );
        Ok(PayForwardOutcome {
            batch_id,
            created: settled.len(),
            months: settled,
            skipped,
        })
    }

    /// Splits one payment across the parent's billable children for one
    /// month, proportionally to each child's remaining balance, with the
    /// last child absorbing the rounding remainder.
    pub fn pay_by_parent(
        ledger: &mut Ledger,
        directory: &dyn StudentDirectory,
        actor: &ActorContext,
        request: PayByParentRequest,
    ) -> ServiceResult<PayByParentOutcome> {
        actor.ensure_can_manage()?;
        if to_cents(request.total_amount) <= 0 {
            return Err(ServiceError::Validation(
                "payment amount must be positive".into(),
            ));
        }
        if request.discount < 0.0 {
            return Err(ServiceError::Validation(
                "discount must not be negative".into(),
            ));
        }

        // Allocation order decides who absorbs the rounding remainder, so
        // the child list is stably ordered by student id.
        let mut children: Vec<_> = directory
            .children_of(request.parent_id)
            .into_iter()
            .filter(|child| actor.sees_student(child))
            .filter(|child| child.is_billable())
            .collect();
        children.sort_by_key(|child| child.id);

        let mut staged = ledger.clone();
        let mut targets: Vec<(Uuid, Uuid, f64)> = Vec::new();
        for child in &children {
            let period_id =
                PeriodService::ensure_period(&mut staged, directory, child.id, request.month)?;
            let period = staged
                .fee_period(period_id)
                .ok_or(ServiceError::PeriodNotFound(period_id))?;
            if !period.has_outstanding_balance() || staged.is_settlement_locked(period) {
                continue;
            }
            targets.push((child.id, period_id, period.remaining_balance()));
        }
        if targets.is_empty() {
            return Err(ServiceError::NoPayableChildren(request.parent_id));
        }

        let balances: Vec<f64> = targets.iter().map(|(_, _, balance)| *balance).collect();
        let expected_total = round_cents(balances.iter().sum());
        let amount_after_discount = round_cents((expected_total - request.discount).max(0.0));
        if to_cents(request.total_amount) > to_cents(amount_after_discount) + 1 {
            return Err(ServiceError::Overpayment {
                attempted: request.total_amount,
                remaining: amount_after_discount,
            });
        }

        let full_payment = to_cents(request.total_amount) + 1 >= to_cents(amount_after_discount);
        let cash = allocate_proportional(request.total_amount, &balances);
        let discounts = if full_payment && to_cents(request.discount) > 0 {
            // The discount fills whatever the cash left open, so per child
            // cash + discount never exceeds its balance.
            let open: Vec<f64> = balances
                .iter()
                .zip(&cash)
                .map(|(balance, paid)| round_cents(balance - paid))
                .collect();
            allocate_proportional(request.discount, &open)
        } else {
            vec![0.0; targets.len()]
        };

        let mut allocations = Vec::with_capacity(targets.len());
        let mut created = 0;
        for (index, (student_id, period_id, _)) in targets.iter().enumerate() {
            let period = staged
                .fee_period_mut(*period_id)
                .ok_or(ServiceError::PeriodNotFound(*period_id))?;
            if to_cents(discounts[index]) > 0 {
                period.discount = round_cents(period.discount + discounts[index]);
            }
            if to_cents(cash[index]) > 0 {
                period.amount_paid = round_cents(period.amount_paid + cash[index]);
                let mut receipt = Receipt::new(*period_id, cash[index], request.date);
                receipt.receipt_number = request.receipt_number.clone();
                receipt.notes = request.notes.clone();
                staged.add_receipt(receipt);
                created += 1;
            }
            allocations.push(ChildAllocation {
                student_id: *student_id,
                fee_period_id: *period_id,
                amount: cash[index],
                discount: discounts[index],
            });
        }

        let total_allocated = round_cents(cash.iter().sum());
        *ledger = staged;
        tracing::info!(
            parent = %request.parent_id,
            month = %request.month,
            children = allocations.len(),
            total = total_allocated,
            discount = request.discount,
            "pay-by-parent allocation committed"
        );
        Ok(PayByParentOutcome {
            created,
            total_amount: total_allocated,
            allocations,
        })
    }
}

/// Splits `total` across `balances` proportionally, in order. Every target
/// but the last receives its rounded share capped at its own balance and at
/// the amount still unallocated; the last target absorbs the rounding
/// remainder under the same caps. The allocations sum to `total` to the
/// cent (unless the caps themselves forbid it) and never exceed any
/// individual balance.
pub fn allocate_proportional(total: f64, balances: &[f64]) -> Vec<f64> {
    let mut allocations = vec![0.0; balances.len()];
    let total_balance: f64 = balances.iter().sum();
    if balances.is_empty() || to_cents(total_balance) <= 0 || to_cents(total) <= 0 {
        return allocations;
    }
    let mut remaining = round_cents(total);
    let last = balances.len() - 1;
    for (index, &balance) in balances.iter().enumerate() {
        let share = if index == last {
            remaining
        } else {
            round_cents(total * balance / total_balance)
        };
        let amount = round_cents(share.min(balance).min(remaining).max(0.0));
        allocations[index] = amount;
        remaining = round_cents(remaining - amount);
    }
    allocations
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_matches_proportional_shares() {
        // 300/700 balances paying 500: 150 + 350, remainder to the last.
        let allocations = allocate_proportional(500.0, &[300.0, 700.0]);
        assert_eq!(allocations, vec![150.0, 350.0]);
    }

    #[test]
    fn rounding_remainder_lands_on_the_last_target() {
        let allocations = allocate_proportional(100.0, &[100.0, 100.0, 100.0]);
        assert_eq!(allocations, vec![33.33, 33.33, 33.34]);
        let sum: f64 = allocations.iter().sum();
        assert_eq!(round_cents(sum), 100.0);
    }

    #[test]
    fn full_total_hands_every_target_its_balance() {
        let allocations = allocate_proportional(1000.0, &[300.0, 700.0]);
        assert_eq!(allocations, vec![300.0, 700.0]);
    }

    #[test]
    fn no_allocation_exceeds_its_balance() {
        let balances = [0.01, 999.99, 0.5];
        let allocations = allocate_proportional(500.0, &balances);
        for (allocation, balance) in allocations.iter().zip(balances.iter()) {
            assert!(allocation <= balance, "{allocation} > {balance}");
        }
        let sum: f64 = allocations.iter().sum();
        assert_eq!(round_cents(sum), 500.0);
    }

    #[test]
    fn empty_targets_allocate_nothing() {
        assert!(allocate_proportional(100.0, &[]).is_empty());
        assert_eq!(allocate_proportional(0.0, &[100.0]), vec![0.0]);
    }
}
