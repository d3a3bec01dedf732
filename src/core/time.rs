use chrono::{DateTime, NaiveDate, Utc};

/// Clock abstracts access to the current date so the receivable
/// projections stay deterministic in tests.
pub trait Clock: Send + Sync {
    /// Returns the current UTC timestamp.
    fn now(&self) -> DateTime<Utc>;

    /// Returns the current UTC date. Defaults to `now().date_naive()`.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Real-time clock backed by the system UTC time source.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to a single date, for reproducible reporting.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        let noon = self.0.and_hms_opt(12, 0, 0).unwrap();
        DateTime::from_naive_utc_and_offset(noon, Utc)
    }

    fn today(&self) -> NaiveDate {
        self.0
    }
}
