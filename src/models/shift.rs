//! Duty shift model and related types.
//!
//! This module defines the [`Shift`] struct, its [`ShiftDuration`], and the
//! closed [`TimeWindow`] used for overlap detection.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Length of a duty shift as recorded by the trainee.
///
/// Minutes are not normalized: `{ hours: 10, minutes: 90 }` is a valid
/// 11.5 hour shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ShiftDuration {
    /// Whole hours.
    pub hours: u32,
    /// Minutes on top of the hours; may exceed 59.
    #[serde(default)]
    pub minutes: u32,
}

impl ShiftDuration {
    /// Creates a duration from hours and minutes.
    pub fn new(hours: u32, minutes: u32) -> Self {
        Self { hours, minutes }
    }

    /// Returns the total length in minutes.
    pub fn total_minutes(&self) -> i64 {
        i64::from(self.hours) * 60 + i64::from(self.minutes)
    }

    /// Returns the total length in hours.
    ///
    /// # Examples
    ///
    /// ```
    /// use residency_engine::models::ShiftDuration;
    /// use rust_decimal::Decimal;
    ///
    /// let duration = ShiftDuration::new(10, 90);
    /// assert_eq!(duration.total_hours(), Decimal::new(115, 1)); // 11.5
    /// ```
    pub fn total_hours(&self) -> Decimal {
        Decimal::from(self.total_minutes()) / Decimal::from(60)
    }

    /// Returns the duration as a chrono delta.
    pub fn as_delta(&self) -> TimeDelta {
        TimeDelta::minutes(self.total_minutes())
    }
}

/// A closed time interval `[start, end]`.
///
/// Two windows overlap when they share at least one instant, so windows
/// that only touch at a boundary are treated as overlapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// First instant of the window.
    pub start: NaiveDateTime,
    /// Last instant of the window.
    pub end: NaiveDateTime,
}

impl TimeWindow {
    /// Creates a window starting at `start` and lasting `duration`.
    ///
    /// An end past the last representable instant saturates to
    /// [`NaiveDateTime::MAX`].
    pub fn from_duration(start: NaiveDateTime, duration: ShiftDuration) -> Self {
        let end = start
            .checked_add_signed(duration.as_delta())
            .unwrap_or(NaiveDateTime::MAX);
        Self { start, end }
    }

    /// Returns true if the two windows share at least one instant.
    ///
    /// # Examples
    ///
    /// ```
    /// use residency_engine::models::TimeWindow;
    /// use chrono::NaiveDate;
    ///
    /// let at = |h| NaiveDate::from_ymd_opt(2025, 3, 3).unwrap().and_hms_opt(h, 0, 0).unwrap();
    /// let morning = TimeWindow { start: at(1), end: at(10) };
    /// let midday = TimeWindow { start: at(10), end: at(15) };
    /// assert!(morning.overlaps(&midday));
    /// assert!(midday.overlaps(&morning));
    /// ```
    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

/// A duty shift worked by a trainee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shift {
    /// Unique identifier for the shift.
    pub id: String,
    /// The instant the shift starts.
    pub start: NaiveDateTime,
    /// How long the shift lasts.
    pub duration: ShiftDuration,
    /// The internship the shift was worked under.
    pub internship_id: String,
    /// The module the shift counts towards.
    #[serde(default)]
    pub module_id: Option<String>,
    /// Whether a supervisor approved the shift.
    #[serde(default)]
    pub is_approved: bool,
}

impl Shift {
    /// Returns the calendar date the shift starts on.
    pub fn date(&self) -> NaiveDate {
        self.start.date()
    }

    /// Returns the shift length in hours.
    pub fn hours(&self) -> Decimal {
        self.duration.total_hours()
    }

    /// Returns the time window the shift occupies.
    pub fn window(&self) -> TimeWindow {
        TimeWindow::from_duration(self.start, self.duration)
    }
}
