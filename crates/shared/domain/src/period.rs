//! Budget period windows.
//!
//! Pure calendar arithmetic: given a budget's period, its optional start and
//! end dates and the day being evaluated, produce the half-open date range
//! `[start, end)` whose transactions count against the budget.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::budget::BudgetPeriod;
use crate::constants::{DAYS_PER_WEEK, MONTHS_PER_QUARTER};
use crate::error::{DomainError, DomainResult};

/// Half-open range of calendar days `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Check if a date falls within this range
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date < self.end
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// Compute the window a budget measures on `as_of`.
///
/// Returns `Ok(None)` when `as_of` lies outside the budget's lifetime
/// (before `start_date` or after `end_date`).
///
/// # Errors
/// Returns a validation error if `end_date` is before `start_date`.
pub fn window(
    period: BudgetPeriod,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    as_of: NaiveDate,
) -> DomainResult<Option<DateRange>> {
    if let (Some(start), Some(end)) = (start_date, end_date) {
        if end < start {
            return Err(DomainError::validation(format!(
                "end date {} is before start date {}",
                end, start
            )));
        }
    }

    if start_date.is_some_and(|start| as_of < start) || end_date.is_some_and(|end| as_of > end) {
        return Ok(None);
    }

    let mut range = match period {
        BudgetPeriod::Weekly => week_containing(as_of, start_date),
        BudgetPeriod::Monthly => months_containing(as_of, 1)?,
        BudgetPeriod::Quarterly => months_containing(as_of, MONTHS_PER_QUARTER)?,
        BudgetPeriod::Yearly => months_containing(as_of, 12)?,
    };

    if let Some(start) = start_date {
        range.start = range.start.max(start);
    }
    if let Some(last_day) = end_date {
        if let Some(cap) = last_day.checked_add_signed(Duration::days(1)) {
            range.end = range.end.min(cap);
        }
    }

    Ok(Some(range))
}

/// Seven-day window anchored on `start_date`, or on ISO-week Mondays when the
/// budget has no start date.
fn week_containing(as_of: NaiveDate, anchor: Option<NaiveDate>) -> DateRange {
    let start = match anchor {
        Some(anchor) => {
            let elapsed = (as_of - anchor).num_days();
            anchor + Duration::days(elapsed.div_euclid(DAYS_PER_WEEK) * DAYS_PER_WEEK)
        }
        None => as_of - Duration::days(i64::from(as_of.weekday().num_days_from_monday())),
    };
    DateRange::new(start, start + Duration::days(DAYS_PER_WEEK))
}

/// Calendar block of `span` months containing `as_of`, aligned to January.
fn months_containing(as_of: NaiveDate, span: u32) -> DomainResult<DateRange> {
    let month0 = as_of.month0() / span * span;
    let start = first_of_month(as_of.year(), month0)?;
    let end = first_of_month(as_of.year(), month0 + span)?;
    Ok(DateRange::new(start, end))
}

/// First day of the month `month0` months after January of `year` (may roll into later years).
fn first_of_month(year: i32, month0: u32) -> DomainResult<NaiveDate> {
    let year = year + (month0 / 12) as i32;
    let month = month0 % 12 + 1;
    NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| DomainError::internal(format!("date out of range: {}-{:02}", year, month)))
}
