//! Temporal-string codec.
//!
//! Three representations of a point in time flow through the logbook:
//!
//! | Representation | Example | Used for |
//! |----------------|---------|----------|
//! | ISO 8601 / RFC 3339 | `2025-06-02T00:30:00Z` | timezone-aware instants from clients |
//! | storage string | `2025-06-02 08:30:00` | `sent_at` column, office wall clock |
//! | display string | `June 2, 2025 at 8:30 AM` | `released_at` column and operator input |
//!
//! Inside the core every timestamp is a [`NaiveDateTime`] on the office wall
//! clock. [`OfficeZone`] is the one place a timezone is applied, so the
//! dashboard and the processing-days view always agree on which calendar day
//! a timestamp falls on.

use std::{ops::RangeInclusive, str::FromStr};

use chrono::{DateTime, Month, NaiveDate, NaiveDateTime, SubsecRound, Utc};
use chrono_tz::Tz;

use crate::error::ParseError;

/// `chrono` format of the storage string.
pub const STORAGE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// `chrono` format of the display string. `%-I` renders both midnight and
/// noon as `12`.
pub const DISPLAY_FORMAT: &str = "%B %-d, %Y at %-I:%M %p";

// ─── Calendar helpers ────────────────────────────────────────────────────────

pub fn is_leap_year(year: i32) -> bool {
  (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in `month` of `year`, leap-year aware.
pub fn days_in_month(month: Month, year: i32) -> u32 {
  match month {
    Month::February if is_leap_year(year) => 29,
    Month::February => 28,
    Month::April | Month::June | Month::September | Month::November => 30,
    _ => 31,
  }
}

// ─── Display string ──────────────────────────────────────────────────────────

/// Parse `"<Month> <D>, <YYYY> at <H>:<MM> <AM|PM>"`.
///
/// Month names may be full or three-letter abbreviations in any case; runs of
/// whitespace are treated as a single space. The day is checked against the
/// month (leap-year aware) and the hour against the 12-hour clock, each with
/// its own message.
pub fn parse_display(input: &str) -> Result<NaiveDateTime, ParseError> {
  let tokens: Vec<&str> = input.split_whitespace().collect();
  if tokens.is_empty() {
    return Err(ParseError::Empty);
  }
  let &[month, day, year, at, clock, meridiem] = tokens.as_slice() else {
    return Err(ParseError::Shape);
  };

  let month = Month::from_str(month).map_err(|_| ParseError::Shape)?;
  let day = digits(day.strip_suffix(',').ok_or(ParseError::Shape)?, 1..=2)?;
  let year = digits(year, 4..=4)? as i32;
  if !at.eq_ignore_ascii_case("at") {
    return Err(ParseError::Shape);
  }
  let (hour, minute) = clock.split_once(':').ok_or(ParseError::Shape)?;
  let hour = digits(hour, 1..=2)?;
  let minute = digits(minute, 2..=2)?;
  let pm = match meridiem.to_ascii_uppercase().as_str() {
    "AM" => false,
    "PM" => true,
    _ => return Err(ParseError::Shape),
  };

  let max = days_in_month(month, year);
  if day == 0 || day > max {
    return Err(match month {
      Month::February => ParseError::FebruaryDays { max, year },
      other => ParseError::MonthDays { month: other.name(), max },
    });
  }
  if !(1..=12).contains(&hour) {
    return Err(ParseError::Hour(hour));
  }
  if minute > 59 {
    return Err(ParseError::Minute(minute));
  }

  let hour = match (hour, pm) {
    (12, false) => 0,
    (12, true) => 12,
    (h, false) => h,
    (h, true) => h + 12,
  };

  NaiveDate::from_ymd_opt(year, month.number_from_month(), day)
    .and_then(|d| d.and_hms_opt(hour, minute, 0))
    .ok_or(ParseError::Shape)
}

/// Render a wall-clock timestamp as a display string. Seconds are dropped.
pub fn format_display(at: NaiveDateTime) -> String {
  at.format(DISPLAY_FORMAT).to_string()
}

/// Canonical spelling of a display string: full month name, unpadded day and
/// hour, upper-case meridiem.
pub fn normalize_display(input: &str) -> Result<String, ParseError> {
  parse_display(input).map(format_display)
}

/// An all-digit token whose length falls within `width`.
fn digits(s: &str, width: RangeInclusive<usize>) -> Result<u32, ParseError> {
  if !width.contains(&s.len()) || !s.bytes().all(|b| b.is_ascii_digit()) {
    return Err(ParseError::Shape);
  }
  s.parse().map_err(|_| ParseError::Shape)
}

// ─── Storage string ──────────────────────────────────────────────────────────

/// Read `"YYYY-MM-DD HH:MM:SS"` as office wall clock. No timezone conversion.
pub fn parse_storage(input: &str) -> Result<NaiveDateTime, ParseError> {
  let bytes = input.as_bytes();
  let shaped = bytes.len() == 19
    && bytes.iter().enumerate().all(|(i, b)| match i {
      4 | 7 => *b == b'-',
      10 => *b == b' ',
      13 | 16 => *b == b':',
      _ => b.is_ascii_digit(),
    });
  if !shaped {
    return Err(ParseError::Storage(input.to_owned()));
  }
  NaiveDateTime::parse_from_str(input, STORAGE_FORMAT)
    .map_err(|_| ParseError::Storage(input.to_owned()))
}

pub fn format_storage(at: NaiveDateTime) -> String {
  at.format(STORAGE_FORMAT).to_string()
}

// ─── Office timezone ─────────────────────────────────────────────────────────

/// The single timezone every timezone-aware instant is converted into before
/// it reaches the business-day counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OfficeZone(Tz);

impl Default for OfficeZone {
  fn default() -> Self { Self(chrono_tz::Asia::Manila) }
}

impl OfficeZone {
  pub fn new(tz: Tz) -> Self { Self(tz) }

  /// Look up an IANA zone name such as `"Asia/Manila"`.
  pub fn from_name(name: &str) -> Result<Self, ParseError> {
    name
      .parse::<Tz>()
      .map(Self)
      .map_err(|_| ParseError::UnknownTimeZone(name.to_owned()))
  }

  pub fn tz(&self) -> Tz { self.0 }

  /// The office wall-clock reading of a UTC instant.
  pub fn localize(&self, instant: DateTime<Utc>) -> NaiveDateTime {
    instant.with_timezone(&self.0).naive_local()
  }

  /// The current office wall-clock time, to the second.
  pub fn now(&self) -> NaiveDateTime {
    self.localize(Utc::now()).trunc_subsecs(0)
  }

  pub fn today(&self) -> NaiveDate { self.now().date() }

  /// Parse an ISO 8601 timestamp. Strings carrying an offset are converted
  /// into the office zone; strings without one are taken as office-local.
  pub fn parse_iso(&self, input: &str) -> Result<NaiveDateTime, ParseError> {
    if let Ok(aware) = DateTime::parse_from_rfc3339(input) {
      return Ok(aware.with_timezone(&self.0).naive_local());
    }
    NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S%.f")
      .map_err(|_| ParseError::Unrecognised(input.to_owned()))
  }

  /// Parse any of the three representations, dispatching on shape.
  pub fn parse_timestamp(
    &self,
    input: &str,
  ) -> Result<NaiveDateTime, ParseError> {
    let input = input.trim();
    match input.chars().next() {
      None => Err(ParseError::Empty),
      Some(c) if c.is_ascii_alphabetic() => parse_display(input),
      Some(_) if input.contains('T') => self.parse_iso(input),
      Some(_) => parse_storage(input),
    }
  }
}
