use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::money::round_cents;
use super::month::BillingMonth;

/// One recorded payment applied to a single fee period.
///
/// Receipts are immutable once created; corrections happen by recording the
/// correct state going forward, never by editing history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Receipt {
    pub id: Uuid,
    pub fee_period_id: Uuid,
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt_number: Option<String>,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Receipt {
    pub fn new(fee_period_id: Uuid, amount: f64, date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            fee_period_id,
            amount: round_cents(amount),
            receipt_number: None,
            date,
            notes: None,
            batch_id: None,
            created_at: Utc::now(),
        }
    }
}

/// Audit header linking the receipts created by one pay-forward call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiptBatch {
    pub id: Uuid,
    pub student_id: Uuid,
    pub total_amount: f64,
    pub from_month: BillingMonth,
    pub to_month: BillingMonth,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt_number: Option<String>,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ReceiptBatch {
    pub fn new(
        student_id: Uuid,
        from_month: BillingMonth,
        to_month: BillingMonth,
        date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            student_id,
            total_amount: 0.0,
            from_month,
            to_month,
            receipt_number: None,
            date,
            notes: None,
            created_at: Utc::now(),
        }
    }
}
