//! Fee period ledger: monthly assessments and the carry-over chain.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::core::access::ActorContext;
use crate::core::services::{ServiceError, ServiceResult};
use crate::domain::{BillingMonth, FeePeriod, Student, StudentDirectory};
use crate::ledger::Ledger;

/// Result of a best-effort bulk creation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BulkCreateOutcome {
    pub created: usize,
    pub skipped: usize,
}

/// Provides validated mutations for monthly fee periods.
pub struct PeriodService;

impl PeriodService {
    /// Creates the period for one student and month, folding the previous
    /// month's remaining balance into the new total due.
    pub fn create_single(
        ledger: &mut Ledger,
        directory: &dyn StudentDirectory,
        actor: &ActorContext,
        student_id: Uuid,
        month: BillingMonth,
    ) -> ServiceResult<Uuid> {
        actor.ensure_can_manage()?;
        let student = directory
            .student(student_id)
            .ok_or(ServiceError::StudentNotFound(student_id))?;
        actor.ensure_student_in_scope(&student)?;
        Self::create_for_student(ledger, &student, month)
    }

    /// Creates a period for every billable student lacking one this month.
    /// Best-effort: one failure does not abort the batch. Teacher-scoped
    /// actors only reach their own students.
    pub fn create_bulk(
        ledger: &mut Ledger,
        directory: &dyn StudentDirectory,
        actor: &ActorContext,
        month: BillingMonth,
    ) -> ServiceResult<BulkCreateOutcome> {
        actor.ensure_can_manage()?;
        let mut created = 0;
        let mut skipped = 0;
        for student in directory.students() {
            if !actor.sees_student(&student) {
                continue;
            }
            if !student.is_billable() || ledger.period_for(student.id, month).is_some() {
                skipped += 1;
                continue;
            }
            match Self::create_for_student(ledger, &student, month) {
                Ok(_) => created += 1,
                Err(err) => {
                    tracing::warn!(student = %student.id, %err, "skipping student in bulk period creation");
                    skipped += 1;
                }
            }
        }
        tracing::info!(%month, created, skipped, "bulk period creation finished");
        Ok(BulkCreateOutcome { created, skipped })
    }

    /// Idempotent get-or-create used by the allocators. Never recomputes
    /// carry-over for a pre-existing period.
    pub fn ensure_period(
        ledger: &mut Ledger,
        directory: &dyn StudentDirectory,
        student_id: Uuid,
        month: BillingMonth,
    ) -> ServiceResult<Uuid> {
        if let Some(period) = ledger.period_for(student_id, month) {
            return Ok(period.id);
        }
        let student = directory
            .student(student_id)
            .ok_or(ServiceError::StudentNotFound(student_id))?;
        Self::create_for_student(ledger, &student, month)
    }

    /// Pure metadata update of the period's balance due date.
    pub fn set_due_date(
        ledger: &mut Ledger,
        actor: &ActorContext,
        period_id: Uuid,
        date: Option<NaiveDate>,
    ) -> ServiceResult<()> {
        actor.ensure_can_manage()?;
        let period = ledger
            .fee_period_mut(period_id)
            .ok_or(ServiceError::PeriodNotFound(period_id))?;
        period.balance_due_date = date;
        ledger.touch();
        Ok(())
    }

    fn create_for_student(
        ledger: &mut Ledger,
        student: &Student,
        month: BillingMonth,
    ) -> ServiceResult<Uuid> {
        let fee = student
            .monthly_fee
            .ok_or(ServiceError::NotBillable(student.id))?;
        if fee < 0.0 {
            return Err(ServiceError::Validation(format!(
                "monthly fee for student {} must not be negative",
                student.id
            )));
        }
        if ledger.period_for(student.id, month).is_some() {
            return Err(ServiceError::DuplicatePeriod {
                student_id: student.id,
                month,
            });
        }
        // Carry-over is fixed here, at creation time, and never revisited.
        let carried_over = ledger
            .period_for(student.id, month.previous())
            .map(|previous| previous.remaining_balance())
            .unwrap_or(0.0);
        let period = FeePeriod::new(student.id, month, fee, carried_over);
        let id = ledger.add_fee_period(period);
        tracing::info!(period = %id, student = %student.id, %month, carried_over, "fee period created");
        Ok(id)
    }
}
