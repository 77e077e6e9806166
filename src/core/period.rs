//! Report identity scheme.
//!
//! A report is addressed by calendar month, not by a surrogate id. The key for
//! (year, month) is the first day of that month, which doubles as the natural
//! ordering key. Uniqueness is enforced on the period alone: a month can carry
//! exactly one monthly report across all schools.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::{AppError, Result};

/// Earliest year a period may fall in
pub const MIN_YEAR: i32 = 1000;
/// Latest year a period may fall in
pub const MAX_YEAR: i32 = 9999;

/// Canonical period key: the first calendar day of a (year, month) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "NaiveDate", into = "NaiveDate")]
pub struct ReportPeriod(NaiveDate);

impl ReportPeriod {
    /// Build the period key for a (year, month) pair. Years are limited to
    /// 1000..=9999, the range a SQL `DATE` column holds.
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(AppError::invalid_argument(format!(
                "year must be between {} and {}, got {}",
                MIN_YEAR, MAX_YEAR, year
            )));
        }
        if !(1..=12).contains(&month) {
            return Err(AppError::invalid_argument(format!(
                "month must be between 1 and 12, got {}",
                month
            )));
        }

        NaiveDate::from_ymd_opt(year, month, 1)
            .map(Self)
            .ok_or_else(|| AppError::invalid_argument(format!("year {} is out of range", year)))
    }

    /// Reinterpret a stored key; anything but the first of a month is rejected
    pub fn from_date(date: NaiveDate) -> Result<Self> {
        if date.day() != 1 {
            return Err(AppError::invalid_argument(format!(
                "period key must be the first day of a month, got {}",
                date
            )));
        }
        Ok(Self(date))
    }

    pub fn as_date(&self) -> NaiveDate {
        self.0
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// Number of calendar days in this month
    pub fn days_in_month(&self) -> u32 {
        let (next_year, next_month) = if self.month() == 12 {
            (self.year() + 1, 1)
        } else {
            (self.year(), self.month() + 1)
        };

        NaiveDate::from_ymd_opt(next_year, next_month, 1)
            .and_then(|next| next.pred_opt())
            .map(|last| last.day())
            .unwrap_or(31)
    }

    /// Whether `day` exists in this month. Entries themselves only enforce 1..=31;
    /// callers that care about month length check here.
    pub fn contains_day(&self, day: u32) -> bool {
        day >= 1 && day <= self.days_in_month()
    }
}

impl fmt::Display for ReportPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m"))
    }
}

impl TryFrom<NaiveDate> for ReportPeriod {
    type Error = AppError;

    fn try_from(date: NaiveDate) -> Result<Self> {
        Self::from_date(date)
    }
}

impl From<ReportPeriod> for NaiveDate {
    fn from(period: ReportPeriod) -> Self {
        period.0
    }
}

/// Addressable coordinate of a monthly report: the school it belongs to and its period.
/// Only `period` participates in uniqueness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportCoordinate {
    pub school_id: i64,
    pub period: ReportPeriod,
}

impl ReportCoordinate {
    pub fn new(school_id: i64, year: i32, month: u32) -> Result<Self> {
        Ok(Self {
            school_id,
            period: ReportPeriod::new(year, month)?,
        })
    }
}
