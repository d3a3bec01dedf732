use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::money::to_cents;
use crate::domain::{BillingMonth, FeePeriod, Receipt, ReceiptBatch};

pub const CURRENT_SCHEMA_VERSION: u8 = 1;

/// The tuition ledger aggregate: every fee period, receipt, and receipt
/// batch for one school, serialized together as a snapshot.
///
/// Periods are unique per (student, month); the services check the key
/// while holding the exclusive borrow, so a losing concurrent creation
/// surfaces as a duplicate-period error for the caller to retry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ledger {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub fee_periods: Vec<FeePeriod>,
    #[serde(default)]
    pub receipts: Vec<Receipt>,
    #[serde(default)]
    pub receipt_batches: Vec<ReceiptBatch>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default = "Ledger::schema_version_default")]
    pub schema_version: u8,
}

impl Ledger {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            fee_periods: Vec::new(),
            receipts: Vec::new(),
            receipt_batches: Vec::new(),
            created_at: now,
            updated_at: now,
            schema_version: CURRENT_SCHEMA_VERSION,
        }
    }

    pub fn add_fee_period(&mut self, period: FeePeriod) -> Uuid {
        let id = period.id;
        self.fee_periods.push(period);
        self.touch();
        id
    }

    pub fn add_receipt(&mut self, receipt: Receipt) -> Uuid {
        let id = receipt.id;
        self.receipts.push(receipt);
        self.touch();
        id
    }

    pub fn add_receipt_batch(&mut self, batch: ReceiptBatch) -> Uuid {
        let id = batch.id;
        self.receipt_batches.push(batch);
        self.touch();
        id
    }

    pub fn fee_period(&self, id: Uuid) -> Option<&FeePeriod> {
        self.fee_periods.iter().find(|period| period.id == id)
    }

    pub fn fee_period_mut(&mut self, id: Uuid) -> Option<&mut FeePeriod> {
        self.fee_periods.iter_mut().find(|period| period.id == id)
    }

    pub fn period_for(&self, student_id: Uuid, month: BillingMonth) -> Option<&FeePeriod> {
        self.fee_periods
            .iter()
            .find(|period| period.student_id == student_id && period.month == month)
    }

    /// All periods for one student, oldest month first.
    pub fn periods_for_student(&self, student_id: Uuid) -> Vec<&FeePeriod> {
        let mut periods: Vec<&FeePeriod> = self
            .fee_periods
            .iter()
            .filter(|period| period.student_id == student_id)
            .collect();
        periods.sort_by_key(|period| period.month);
        periods
    }

    pub fn receipts_for_period(&self, period_id: Uuid) -> Vec<&Receipt> {
        self.receipts
            .iter()
            .filter(|receipt| receipt.fee_period_id == period_id)
            .collect()
    }

    /// A period is settlement-locked once its unpaid balance has migrated
    /// into the following period's carry-over: it still shows a remaining
    /// balance, but can no longer accept direct receipts.
    pub fn is_settlement_locked(&self, period: &FeePeriod) -> bool {
        period.has_outstanding_balance()
            && self
                .period_for(period.student_id, period.month.next())
                .map(|next| to_cents(next.balance_carried_over) > 0)
                .unwrap_or(false)
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn schema_version_default() -> u8 {
        CURRENT_SCHEMA_VERSION
    }
}
