pub mod fee_period;
pub mod money;
pub mod month;
pub mod receipt;
pub mod student;

pub use fee_period::{FeePeriod, PaymentStatus};
pub use month::BillingMonth;
pub use receipt::{Receipt, ReceiptBatch};
pub use student::{Student, StudentDirectory, StudentRoster};
