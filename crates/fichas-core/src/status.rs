//! Staleness classification — a pure function over dates.
//!
//! No I/O, no clocks: the threshold and "today" are explicit inputs,
//! threaded through by the resolver, so the same record classifies
//! identically under test and in production.

use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// The default staleness threshold, in whole days.
pub const DEFAULT_THRESHOLD_DAYS: u32 = 90;

/// Whether a record's maintenance is current.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
  OnTime,
  Overdue,
}

impl Status {
  pub fn is_overdue(&self) -> bool { matches!(self, Self::Overdue) }
}

/// Classify a record from its effective last-maintenance date.
///
/// An absent date is `Overdue` — an unknown maintenance state is never
/// treated as compliant. Otherwise the record is `Overdue` iff the whole
/// days elapsed since the date reach `threshold_days`; exactly at the
/// threshold counts as overdue. A future-dated entry (negative elapsed)
/// classifies as `OnTime` rather than erroring, tolerating operator
/// clock skew.
///
/// `threshold_days` below 1 is clamped to 1.
pub fn classify(
  effective: Option<NaiveDate>,
  threshold_days: u32,
  today: NaiveDate,
) -> Status {
  let Some(date) = effective else {
    return Status::Overdue;
  };
  let threshold = i64::from(threshold_days.max(1));
  if days_since(date, today) >= threshold {
    Status::Overdue
  } else {
    Status::OnTime
  }
}

/// Whole days elapsed between `date` and `today`; negative when `date`
/// lies in the future.
pub fn days_since(date: NaiveDate, today: NaiveDate) -> i64 {
  (today - date).num_days()
}

/// The suggested next maintenance date: one month and fifteen days after
/// the last one. `None` only at the edges of the representable calendar.
pub fn next_due(last_maintenance: NaiveDate) -> Option<NaiveDate> {
  last_maintenance
    .checked_add_months(Months::new(1))?
    .checked_add_days(Days::new(15))
}
