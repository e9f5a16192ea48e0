//! Time source abstraction.
//!
//! Rules that depend on "now" (overdue internships, month-end hour checks,
//! elapsed specialization time) receive the instant as a parameter. Only
//! the [`ComplianceEngine`](crate::service::ComplianceEngine) façade reads
//! a [`Clock`], so tests can pin it with [`FixedClock`].

use chrono::{NaiveDateTime, Utc};

/// Source of the current instant.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> NaiveDateTime;
}

/// Clock backed by the system time in UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Utc::now().naive_utc()
    }
}

/// Clock that always returns the same instant.
///
/// # Example
///
/// ```
/// use residency_engine::clock::{Clock, FixedClock};
/// use chrono::NaiveDate;
///
/// let instant = NaiveDate::from_ymd_opt(2025, 3, 28)
///     .unwrap()
///     .and_hms_opt(12, 0, 0)
///     .unwrap();
/// let clock = FixedClock::new(instant);
/// assert_eq!(clock.now(), instant);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock {
    instant: NaiveDateTime,
}

impl FixedClock {
    /// Creates a clock frozen at `instant`.
    pub fn new(instant: NaiveDateTime) -> Self {
        Self { instant }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.instant
    }
}
