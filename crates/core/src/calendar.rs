//! Calendar arithmetic for timeline offsets.
//!
//! Offsets in the knowledge tables are expressed in calendar months and days ("2 to 4 years plus
//! up to 11 months plus up to 27 days"), so additions go through chrono's month-aware helpers.
//! Every operation is checked; an out-of-range result is a generation error rather than a panic.

use crate::{SynthError, SynthResult};
use chrono::{DateTime, Datelike, Days, Months, NaiveDate, NaiveTime, TimeZone, Utc};

/// A calendar offset applied as months first, then days, then minutes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Offset {
    pub months: u32,
    pub days: i64,
    pub minutes: i64,
}

impl Offset {
    pub fn days(days: i64) -> Self {
        Self {
            days,
            ..Self::default()
        }
    }

    pub fn minutes(minutes: i64) -> Self {
        Self {
            minutes,
            ..Self::default()
        }
    }

    /// `from + self`.
    pub fn after(self, from: DateTime<Utc>) -> SynthResult<DateTime<Utc>> {
        let shifted = from
            .checked_add_months(Months::new(self.months))
            .ok_or_else(|| out_of_range(from, self))?;
        shift(shifted, self.days, self.minutes).ok_or_else(|| out_of_range(from, self))
    }

    /// `from - self`.
    pub fn before(self, from: DateTime<Utc>) -> SynthResult<DateTime<Utc>> {
        let shifted = from
            .checked_sub_months(Months::new(self.months))
            .ok_or_else(|| out_of_range(from, self))?;
        shift(shifted, -self.days, -self.minutes).ok_or_else(|| out_of_range(from, self))
    }
}

fn shift(from: DateTime<Utc>, days: i64, minutes: i64) -> Option<DateTime<Utc>> {
    from.checked_add_signed(chrono::Duration::try_days(days)?)?
        .checked_add_signed(chrono::Duration::try_minutes(minutes)?)
}

fn out_of_range(from: DateTime<Utc>, offset: Offset) -> SynthError {
    SynthError::DateOutOfRange(format!("{from} shifted by {offset:?}"))
}

/// Midnight UTC at the start of `date`.
pub fn midnight(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

/// `date - days`, checked.
pub fn days_before(date: NaiveDate, days: u64) -> SynthResult<NaiveDate> {
    date.checked_sub_days(Days::new(days))
        .ok_or_else(|| SynthError::DateOutOfRange(format!("{date} minus {days} days")))
}

/// Number of whole calendar months from `start` to `end` (zero if `end` precedes `start`).
pub fn full_months_between(start: DateTime<Utc>, end: DateTime<Utc>) -> u32 {
    if end <= start {
        return 0;
    }
    let (start_date, end_date) = (start.date_naive(), end.date_naive());
    let month_delta = (end_date.year() - start_date.year()) * 12 + end_date.month() as i32
        - start_date.month() as i32;
    let mut months = month_delta.max(0) as u32;
    while months > 0 {
        match start.checked_add_months(Months::new(months)) {
            Some(candidate) if candidate <= end => break,
            _ => months -= 1,
        }
    }
    months
}

/// Number of whole calendar years from `start` to `end`.
pub fn full_years_between(start: DateTime<Utc>, end: DateTime<Utc>) -> u32 {
    full_months_between(start, end) / 12
}
