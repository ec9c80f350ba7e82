//! Business-day (network days) counting.
//!
//! A business day is any Monday–Friday calendar date; holidays are not
//! considered. All inputs are office wall-clock values, so no timezone is
//! applied here.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Weekday};

pub fn is_business_day(date: NaiveDate) -> bool {
  !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Count the business days from `start`'s date to `end`'s date, inclusive.
///
/// Returns 0 when either bound is missing or when `start` is later than
/// `end`. The bounds are compared as full timestamps, but once ordered only
/// their calendar dates matter.
pub fn count_business_days(
  start: Option<NaiveDateTime>,
  end: Option<NaiveDateTime>,
) -> u32 {
  let (Some(start), Some(end)) = (start, end) else {
    return 0;
  };
  if start > end {
    return 0;
  }
  let last = end.date();
  start
    .date()
    .iter_days()
    .take_while(|d| *d <= last)
    .filter(|d| is_business_day(*d))
    .count() as u32
}

/// Day-of-month numbers of `month` (1-based) in `year` that are business
/// days. Empty for an invalid month.
pub fn business_days_in_month(year: i32, month: u32) -> Vec<u32> {
  let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
    return Vec::new();
  };
  first
    .iter_days()
    .take_while(|d| d.month() == month)
    .filter(|d| is_business_day(*d))
    .map(|d| d.day())
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn day(y: i32, m: u32, d: u32, h: u32, min: u32) -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(y, m, d).and_then(|d| d.and_hms_opt(h, min, 0))
  }

  #[test]
  fn monday_through_friday_is_five() {
    assert_eq!(
      count_business_days(day(2025, 6, 2, 9, 0), day(2025, 6, 6, 17, 0)),
      5
    );
  }

  #[test]
  fn friday_to_monday_skips_weekend() {
    assert_eq!(
      count_business_days(day(2025, 6, 6, 9, 0), day(2025, 6, 9, 9, 0)),
      2
    );
  }

  #[test]
  fn same_instant_counts_one_on_weekday_zero_on_weekend() {
    let tuesday = day(2025, 6, 3, 10, 0);
    let saturday = day(2025, 6, 7, 10, 0);
    assert_eq!(count_business_days(tuesday, tuesday), 1);
    assert_eq!(count_business_days(saturday, saturday), 0);
  }

  #[test]
  fn time_of_day_is_ignored_within_the_same_date() {
    assert_eq!(
      count_business_days(day(2025, 6, 3, 0, 1), day(2025, 6, 3, 23, 59)),
      1
    );
  }

  #[test]
  fn reversed_or_missing_bounds_count_zero() {
    let mon = day(2025, 6, 2, 9, 0);
    let fri = day(2025, 6, 6, 9, 0);
    assert_eq!(count_business_days(fri, mon), 0);
    assert_eq!(count_business_days(None, fri), 0);
    assert_eq!(count_business_days(mon, None), 0);
    // Later time on the same date is still "after".
    assert_eq!(
      count_business_days(day(2025, 6, 3, 15, 0), day(2025, 6, 3, 10, 0)),
      0
    );
  }

  #[test]
  fn spans_months_and_years() {
    // Wed 2024-12-25 .. Fri 2025-01-03: 25,26,27,30,31,1,2,3
    assert_eq!(
      count_business_days(day(2024, 12, 25, 8, 0), day(2025, 1, 3, 8, 0)),
      8
    );
  }

  #[test]
  fn weekend_only_span_is_zero() {
    assert_eq!(
      count_business_days(day(2025, 6, 7, 8, 0), day(2025, 6, 8, 20, 0)),
      0
    );
  }

  #[test]
  fn business_days_of_june_2025() {
    let days = business_days_in_month(2025, 6);
    assert_eq!(days.len(), 21);
    assert_eq!(days.first(), Some(&2));
    assert_eq!(days.last(), Some(&30));
    assert!(!days.contains(&7));
  }

  #[test]
  fn invalid_month_has_no_business_days() {
    assert!(business_days_in_month(2025, 13).is_empty());
  }
}
