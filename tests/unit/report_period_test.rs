//! Unit tests for the report identity scheme
//!
//! The period key of (year, month) is the first day of that month; ordering of
//! keys follows the calendar.

use chrono::{Datelike, NaiveDate};
use proptest::prelude::*;

use schoolreports::core::{AppError, ReportCoordinate, ReportPeriod, MAX_YEAR, MIN_YEAR};

#[test]
fn test_leap_february_has_29_days() {
    let period = ReportPeriod::new(2024, 2).unwrap();
    assert_eq!(period.days_in_month(), 29);
    assert!(period.contains_day(29));
    assert!(!period.contains_day(30));
}

#[test]
fn test_common_february_has_28_days() {
    let period = ReportPeriod::new(2023, 2).unwrap();
    assert_eq!(period.days_in_month(), 28);
    assert!(!period.contains_day(29));
}

#[test]
fn test_december_rolls_over_year() {
    let period = ReportPeriod::new(2024, 12).unwrap();
    assert_eq!(period.days_in_month(), 31);
    assert_eq!(period.to_string(), "2024-12");
}

#[test]
fn test_from_date_requires_first_of_month() {
    let mid_month = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
    assert!(matches!(
        ReportPeriod::from_date(mid_month),
        Err(AppError::InvalidArgument(_))
    ));

    let first = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    assert_eq!(ReportPeriod::from_date(first).unwrap(), ReportPeriod::new(2024, 3).unwrap());
}

#[test]
fn test_serializes_as_date() {
    let period = ReportPeriod::new(2024, 3).unwrap();
    assert_eq!(serde_json::to_value(period).unwrap(), "2024-03-01");

    let parsed: ReportPeriod = serde_json::from_str("\"2024-03-01\"").unwrap();
    assert_eq!(parsed, period);

    assert!(serde_json::from_str::<ReportPeriod>("\"2024-03-02\"").is_err());
}

#[test]
fn test_coordinate_school_does_not_change_period() {
    let a = ReportCoordinate::new(5, 2024, 3).unwrap();
    let b = ReportCoordinate::new(7, 2024, 3).unwrap();
    assert_eq!(a.period, b.period);
    assert_ne!(a, b);
}

#[test]
fn test_coordinate_rejects_bad_month() {
    assert!(matches!(
        ReportCoordinate::new(5, 2024, 13),
        Err(AppError::InvalidArgument(_))
    ));
}

proptest! {
    #[test]
    fn prop_period_is_first_day(year in 1900i32..=2200, month in 1u32..=12) {
        let period = ReportPeriod::new(year, month).unwrap();
        prop_assert_eq!(period.as_date().day(), 1);
        prop_assert_eq!(period.year(), year);
        prop_assert_eq!(period.month(), month);
    }

    #[test]
    fn prop_ordering_follows_calendar(
        y1 in 1900i32..=2200, m1 in 1u32..=12,
        y2 in 1900i32..=2200, m2 in 1u32..=12,
    ) {
        let p1 = ReportPeriod::new(y1, m1).unwrap();
        let p2 = ReportPeriod::new(y2, m2).unwrap();
        prop_assert_eq!(p1.cmp(&p2), (y1, m1).cmp(&(y2, m2)));
    }

    #[test]
    fn prop_month_outside_range_rejected(year in 1900i32..=2200, month in 13u32..1000) {
        prop_assert!(ReportPeriod::new(year, month).is_err());
    }

    #[test]
    fn prop_days_in_month_between_28_and_31(year in 1900i32..=2200, month in 1u32..=12) {
        let days = ReportPeriod::new(year, month).unwrap().days_in_month();
        prop_assert!((28..=31).contains(&days));
    }

    #[test]
    fn prop_year_outside_date_range_rejected(
        year in prop_oneof![i32::MIN..MIN_YEAR, (MAX_YEAR + 1)..=i32::MAX],
        month in 1u32..=12,
    ) {
        prop_assert!(matches!(
            ReportPeriod::new(year, month),
            Err(AppError::InvalidArgument(_))
        ));
    }

    #[test]
    fn prop_year_inside_date_range_accepted(year in MIN_YEAR..=MAX_YEAR, month in 1u32..=12) {
        prop_assert!(ReportPeriod::new(year, month).is_ok());
    }
}
