//! Receivable projector: read-only views over the fee period ledger.
//!
//! Figures are recomputed by scanning the aggregate on every call, never
//! materialized. "Today" always comes from the injected clock.

use std::collections::HashSet;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::core::services::{ServiceError, ServiceResult};
use crate::core::time::Clock;
use crate::domain::money::{round_cents, to_cents};
use crate::domain::{BillingMonth, FeePeriod, PaymentStatus, Receipt, StudentDirectory};
use crate::ledger::Ledger;

/// Outstanding-balance view of one fee period.
#[derive(Debug, Clone)]
pub struct ReceivableSummary {
    pub fee_period_id: Uuid,
    pub student_id: Uuid,
    pub month: BillingMonth,
    pub amount_due: f64,
    pub amount_paid: f64,
    pub remaining_balance: f64,
    pub status: PaymentStatus,
    pub due_date: NaiveDate,
    pub is_overdue: bool,
    pub days_overdue: i64,
}

/// Filter and paging for the receivable list. Pages are 1-based.
#[derive(Debug, Clone)]
pub struct ReceivableFilter {
    pub student_id: Option<Uuid>,
    pub month: Option<u32>,
    pub year: Option<i32>,
    pub status: Option<PaymentStatus>,
    pub search: Option<String>,
    pub page: usize,
    pub per_page: usize,
}

impl Default for ReceivableFilter {
    fn default() -> Self {
        Self {
            student_id: None,
            month: None,
            year: None,
            status: None,
            search: None,
            page: 1,
            per_page: 25,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReceivablePage {
    pub items: Vec<ReceivableSummary>,
    pub total: usize,
    pub page: usize,
    pub per_page: usize,
}

/// One period with its recorded receipts, for the per-student history.
#[derive(Debug, Clone)]
pub struct PeriodHistory {
    pub period: FeePeriod,
    pub receipts: Vec<Receipt>,
}

#[derive(Debug, Clone)]
pub struct StudentReceivables {
    pub student_id: Uuid,
    pub outstanding: Vec<ReceivableSummary>,
    pub history: Vec<PeriodHistory>,
    pub total_outstanding: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyOutstanding {
    pub month: BillingMonth,
    pub outstanding: f64,
}

/// Outstanding amounts bucketed by how long they are overdue.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgingBuckets {
    pub days_0_30: f64,
    pub days_31_60: f64,
    pub days_61_plus: f64,
}

impl AgingBuckets {
    pub fn total(&self) -> f64 {
        round_cents(self.days_0_30 + self.days_31_60 + self.days_61_plus)
    }
}

#[derive(Debug, Clone)]
pub struct ReceivableDashboard {
    pub total_outstanding_balance: f64,
    pub total_overdue_amount: f64,
    pub students_with_balance: usize,
    /// Last twelve months including the current one, oldest first.
    pub monthly_trend: Vec<MonthlyOutstanding>,
    pub aging: AgingBuckets,
}

pub struct ReceivableService;

impl ReceivableService {
    pub fn summary(
        ledger: &Ledger,
        clock: &dyn Clock,
        period_id: Uuid,
    ) -> ServiceResult<ReceivableSummary> {
        let period = ledger
            .fee_period(period_id)
            .ok_or(ServiceError::PeriodNotFound(period_id))?;
        Ok(Self::summarize(period, clock.today()))
    }

    /// Lists open receivables: periods with a remaining balance, narrowed by
    /// the optional filters, then status-filtered, then paginated. The total
    /// count is taken after filtering so page counts stay consistent.
    pub fn list(
        ledger: &Ledger,
        directory: &dyn StudentDirectory,
        clock: &dyn Clock,
        filter: &ReceivableFilter,
    ) -> ServiceResult<ReceivablePage> {
        if filter.page == 0 {
            return Err(ServiceError::Validation("page numbers start at 1".into()));
        }
        if filter.per_page == 0 {
            return Err(ServiceError::Validation(
                "page size must be positive".into(),
            ));
        }
        if let Some(month) = filter.month {
            if !(1..=12).contains(&month) {
                return Err(ServiceError::Validation(format!(
                    "month {month} is out of range"
                )));
            }
        }

        let needle = filter
            .search
            .as_ref()
            .map(|term| term.trim().to_lowercase())
            .filter(|term| !term.is_empty());
        let mut rows: Vec<&FeePeriod> = ledger
            .fee_periods
            .iter()
            .filter(|period| period.has_outstanding_balance())
            .filter(|period| {
                filter
                    .student_id
                    .map(|id| period.student_id == id)
                    .unwrap_or(true)
            })
            .filter(|period| filter.month.map(|m| period.month.month == m).unwrap_or(true))
            .filter(|period| filter.year.map(|y| period.month.year == y).unwrap_or(true))
            .filter(|period| match &needle {
                Some(needle) => directory
                    .student(period.student_id)
                    .map(|student| student.name.to_lowercase().contains(needle))
                    .unwrap_or(false),
                None => true,
            })
            .collect();
        rows.sort_by_key(|period| (period.month, period.student_id));

        let today = clock.today();
        let filtered: Vec<ReceivableSummary> = rows
            .into_iter()
            .map(|period| Self::summarize(period, today))
            .filter(|summary| {
                filter
                    .status
                    .map(|status| summary.status == status)
                    .unwrap_or(true)
            })
            .collect();

        let total = filtered.len();
        let items = filtered
            .into_iter()
            .skip((filter.page - 1) * filter.per_page)
            .take(filter.per_page)
            .collect();
        Ok(ReceivablePage {
            items,
            total,
            page: filter.page,
            per_page: filter.per_page,
        })
    }

    /// Open balances plus the full payment history for one student.
    pub fn by_student(
        ledger: &Ledger,
        directory: &dyn StudentDirectory,
        clock: &dyn Clock,
        student_id: Uuid,
    ) -> ServiceResult<StudentReceivables> {
        directory
            .student(student_id)
            .ok_or(ServiceError::StudentNotFound(student_id))?;
        let today = clock.today();
        let periods = ledger.periods_for_student(student_id);

        let outstanding: Vec<ReceivableSummary> = periods
            .iter()
            .filter(|period| period.has_outstanding_balance())
            .map(|period| Self::summarize(period, today))
            .collect();
        let total_outstanding = round_cents(
            outstanding
                .iter()
                .map(|summary| summary.remaining_balance)
                .sum(),
        );
        let history = periods
            .iter()
            .map(|period| PeriodHistory {
                period: (*period).clone(),
                receipts: ledger
                    .receipts_for_period(period.id)
                    .into_iter()
                    .cloned()
                    .collect(),
            })
            .collect();

        Ok(StudentReceivables {
            student_id,
            outstanding,
            history,
            total_outstanding,
        })
    }

    /// School-wide receivable snapshot: totals, overdue aging, distinct
    /// debtors, and the twelve-month outstanding trend.
    pub fn dashboard(ledger: &Ledger, clock: &dyn Clock) -> ReceivableDashboard {
        let today = clock.today();
        let open: Vec<&FeePeriod> = ledger
            .fee_periods
            .iter()
            .filter(|period| period.has_outstanding_balance())
            .collect();

        let total_outstanding_balance =
            round_cents(open.iter().map(|period| period.remaining_balance()).sum());
        let students_with_balance = open
            .iter()
            .map(|period| period.student_id)
            .collect::<HashSet<_>>()
            .len();

        let mut aging = AgingBuckets::default();
        for period in &open {
            let summary = Self::summarize(period, today);
            if !summary.is_overdue {
                continue;
            }
            let bucket = match summary.days_overdue {
                0..=30 => &mut aging.days_0_30,
                31..=60 => &mut aging.days_31_60,
                _ => &mut aging.days_61_plus,
            };
            *bucket = round_cents(*bucket + summary.remaining_balance);
        }
        let total_overdue_amount = aging.total();

        let mut trend_months = Vec::with_capacity(12);
        let mut cursor = BillingMonth::of(today);
        for _ in 0..12 {
            trend_months.push(cursor);
            cursor = cursor.previous();
        }
        trend_months.reverse();
        let monthly_trend = trend_months
            .into_iter()
            .map(|month| MonthlyOutstanding {
                month,
                outstanding: round_cents(
                    open.iter()
                        .filter(|period| period.month == month)
                        .map(|period| period.remaining_balance())
                        .sum(),
                ),
            })
            .collect();

        ReceivableDashboard {
            total_outstanding_balance,
            total_overdue_amount,
            students_with_balance,
            monthly_trend,
            aging,
        }
    }

    fn summarize(period: &FeePeriod, today: NaiveDate) -> ReceivableSummary {
        let due_date = period.effective_due_date();
        let remaining = period.remaining_balance();
        let is_overdue = due_date < today && to_cents(remaining) > 0;
        let days_overdue = if is_overdue {
            (today - due_date).num_days()
        } else {
            0
        };
        ReceivableSummary {
            fee_period_id: period.id,
            student_id: period.student_id,
            month: period.month,
            amount_due: period.amount_due(),
            amount_paid: period.amount_paid,
            remaining_balance: remaining,
            status: period.status(),
            due_date,
            is_overdue,
            days_overdue,
        }
    }
}
