use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::money::{round_cents, to_cents};
use super::month::BillingMonth;

/// One student's tuition obligation for one calendar month.
///
/// `total_due` is fixed at creation as `fee_amount + balance_carried_over`;
/// only `discount`, `amount_paid`, and `balance_due_date` mutate afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeePeriod {
    pub id: Uuid,
    pub student_id: Uuid,
    pub month: BillingMonth,
    pub fee_amount: f64,
    pub balance_carried_over: f64,
    pub total_due: f64,
    pub discount: f64,
    pub amount_paid: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance_due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl FeePeriod {
    pub fn new(
        student_id: Uuid,
        month: BillingMonth,
        fee_amount: f64,
        balance_carried_over: f64,
    ) -> Self {
        let fee_amount = round_cents(fee_amount);
        let balance_carried_over = round_cents(balance_carried_over.max(0.0));
        Self {
            id: Uuid::new_v4(),
            student_id,
            month,
            fee_amount,
            balance_carried_over,
            total_due: round_cents(fee_amount + balance_carried_over),
            discount: 0.0,
            amount_paid: 0.0,
            balance_due_date: None,
            created_at: Utc::now(),
        }
    }

    pub fn amount_due(&self) -> f64 {
        round_cents(self.total_due - self.discount)
    }

    pub fn remaining_balance(&self) -> f64 {
        round_cents((self.amount_due() - self.amount_paid).max(0.0))
    }

    pub fn has_outstanding_balance(&self) -> bool {
        to_cents(self.remaining_balance()) > 0
    }

    pub fn status(&self) -> PaymentStatus {
        if !self.has_outstanding_balance() {
            PaymentStatus::Paid
        } else if to_cents(self.amount_paid) > 0 {
            PaymentStatus::Partial
        } else {
            PaymentStatus::Unpaid
        }
    }

    /// Due date used for overdue classification: the explicit
    /// `balance_due_date` when set, otherwise the last calendar day of the
    /// period's month.
    pub fn effective_due_date(&self) -> NaiveDate {
        self.balance_due_date.unwrap_or_else(|| self.month.last_day())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Unpaid,
    Partial,
    Paid,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PaymentStatus::Unpaid => "Unpaid",
            PaymentStatus::Partial => "Partial",
            PaymentStatus::Paid => "Paid",
        };
        f.write_str(label)
    }
}
