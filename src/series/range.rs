//! The user-editable date window and its edit rules.
//!
//! Both ends are inclusive and always satisfy
//! `earliest_allowed() <= start <= end <= today`. Edits that would break
//! this are dropped without an error; the setters report whether the edit
//! was applied.

use crate::core::{DashError, Result};
use chrono::{Months, NaiveDate};
use std::fmt;

/// First day any range may start on.
pub fn earliest_allowed() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).expect("Valid earliest date")
}

/// Which end of the range an edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeBound {
    /// First day
    Start,
    /// Last day
    End,
}

impl RangeBound {
    /// The other bound.
    pub fn toggle(self) -> Self {
        match self {
            RangeBound::Start => RangeBound::End,
            RangeBound::End => RangeBound::Start,
        }
    }
}

/// Inclusive calendar date window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Build a range, checking every invariant against `today`.
    pub fn new(start: NaiveDate, end: NaiveDate, today: NaiveDate) -> Result<Self> {
        if start < earliest_allowed() || start > end || end > today {
            return Err(DashError::config(format!(
                "Invalid date range {} .. {} (allowed {} .. {})",
                start,
                end,
                earliest_allowed(),
                today
            )));
        }
        Ok(Self { start, end })
    }

    /// `default_start ..= today`, falling back to the earliest allowed start
    /// if `default_start` lies after today.
    pub fn default_for(default_start: NaiveDate, today: NaiveDate) -> Self {
        let start = default_start.max(earliest_allowed());
        let start = if start > today { earliest_allowed().min(today) } else { start };
        Self { start, end: today }
    }

    /// First day.
    #[inline]
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last day.
    #[inline]
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Read one bound.
    pub fn bound(&self, bound: RangeBound) -> NaiveDate {
        match bound {
            RangeBound::Start => self.start,
            RangeBound::End => self.end,
        }
    }

    /// Try to move the start. Returns false (and changes nothing) when the
    /// new start is after the current end, after today, or before 2020.
    pub fn set_start(&mut self, start: NaiveDate, today: NaiveDate) -> bool {
        if start > self.end || start > today || start < earliest_allowed() {
            tracing::debug!("Rejected start edit {} for range {}", start, self);
            return false;
        }
        self.start = start;
        true
    }

    /// Try to move the end. Returns false (and changes nothing) when the
    /// new end is before the current start or after today.
    pub fn set_end(&mut self, end: NaiveDate, today: NaiveDate) -> bool {
        if end < self.start || end > today {
            tracing::debug!("Rejected end edit {} for range {}", end, self);
            return false;
        }
        self.end = end;
        true
    }

    /// Try to set one bound.
    pub fn set(&mut self, bound: RangeBound, date: NaiveDate, today: NaiveDate) -> bool {
        match bound {
            RangeBound::Start => self.set_start(date, today),
            RangeBound::End => self.set_end(date, today),
        }
    }

    /// Shift one bound by a number of days; rejected like any other edit.
    pub fn shift_days(&mut self, bound: RangeBound, days: i64, today: NaiveDate) -> bool {
        match self.bound(bound).checked_add_signed(chrono::Duration::days(days)) {
            Some(date) => self.set(bound, date, today),
            None => false,
        }
    }

    /// Shift one bound by whole months (day clamped to month length).
    pub fn shift_months(&mut self, bound: RangeBound, months: i32, today: NaiveDate) -> bool {
        let current = self.bound(bound);
        let moved = if months >= 0 {
            current.checked_add_months(Months::new(months.unsigned_abs()))
        } else {
            current.checked_sub_months(Months::new(months.unsigned_abs()))
        };
        match moved {
            Some(date) => self.set(bound, date, today),
            None => false,
        }
    }
}

impl fmt::Display for DateRange {
    /// `DD-MM-YYYY - DD-MM-YYYY`, the header's range label.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.start.format("%d-%m-%Y"), self.end.format("%d-%m-%Y"))
    }
}

/// Parse a `YYYY-MM-DD` command-line or config date.
pub fn parse_iso_date(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|_| DashError::InvalidDate {
        input: input.to_string(),
    })
}
