pub mod allocation_service;
pub mod period_service;
pub mod receipt_service;
pub mod receivable_service;

pub use allocation_service::{
    AllocationService, ChildAllocation, PayByParentOutcome, PayByParentRequest,
    PayForwardOutcome, PayForwardRequest,
};
pub use period_service::{BulkCreateOutcome, PeriodService};
pub use receipt_service::{NewReceipt, ReceiptService};
pub use receivable_service::{
    AgingBuckets, MonthlyOutstanding, PeriodHistory, ReceivableDashboard, ReceivableFilter,
    ReceivablePage, ReceivableService, ReceivableSummary, StudentReceivables,
};

use thiserror::Error;
use uuid::Uuid;

use crate::domain::BillingMonth;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Operation failure taxonomy. Messages carry the precise expected value
/// (required total, current remaining balance) so callers can correct
/// their input without guessing.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Student not found: {0}")]
    StudentNotFound(Uuid),
    #[error("Fee period not found: {0}")]
    PeriodNotFound(Uuid),
    #[error("Student {0} has no monthly fee configured")]
    NotBillable(Uuid),
    #[error("Fee period already exists for student {student_id} in {month}")]
    DuplicatePeriod {
        student_id: Uuid,
        month: BillingMonth,
    },
    #[error("Fee period {0} is settlement-locked; its balance was carried forward")]
    SettlementLocked(Uuid),
    #[error("Payment of {attempted:.2} exceeds the accepted maximum of {remaining:.2}")]
    Overpayment { attempted: f64, remaining: f64 },
    #[error("Payment total {provided:.2} does not match the expected total {expected:.2}")]
    AmountMismatch { expected: f64, provided: f64 },
    #[error("Parent {0} has no payable children for this month")]
    NoPayableChildren(Uuid),
    #[error("Operation not permitted: {0}")]
    Forbidden(String),
    #[error("Invalid input: {0}")]
    Validation(String),
}
