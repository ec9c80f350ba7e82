//! Processing-day resolver and the deduction workflow.
//!
//! A document's processing days are the business days between `sent_at` and
//! `released_at`, minus an operator-entered deduction. Once an operator
//! confirms a value through [`apply_deduction`] it is stored as
//! [`NetworkDays::Confirmed`] and returned as-is until [`clear_deduction`]
//! puts the document back on the derived path.

use serde::{Deserialize, Serialize};

use crate::{
  business_days::count_business_days,
  document::{Document, NetworkDays},
  error::ValidationError,
};

/// Upper bound of the on-target window, in business days.
pub const TARGET_PROCESSING_DAYS: u32 = 5;

// ─── Resolution ──────────────────────────────────────────────────────────────

/// The processing-day value of a document as presented to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "days", rename_all = "snake_case")]
pub enum ProcessingDays {
  /// Stored by the deduction workflow; authoritative.
  Confirmed(u32),
  /// Computed from the document's timestamps on this read.
  Derived(u32),
  /// Not released yet (or the release date is unreadable).
  Unset,
}

impl ProcessingDays {
  pub fn value(&self) -> Option<u32> {
    match self {
      Self::Confirmed(n) | Self::Derived(n) => Some(*n),
      Self::Unset => None,
    }
  }

  /// `"<N> days"`, or `"-"` when unset so that "not released" never reads as
  /// zero.
  pub fn display(&self) -> String {
    match self.value() {
      Some(n) => format!("{n} days"),
      None => "-".to_owned(),
    }
  }

  pub fn target(&self) -> Option<TargetStatus> {
    self.value().map(TargetStatus::classify)
  }
}

/// Whether a processing-day value is within the office target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetStatus {
  OnTarget,
  OutOfTarget,
}

impl TargetStatus {
  /// `1..=TARGET_PROCESSING_DAYS` is on target; zero or anything above is
  /// not.
  pub fn classify(days: u32) -> Self {
    if (1..=TARGET_PROCESSING_DAYS).contains(&days) {
      Self::OnTarget
    } else {
      Self::OutOfTarget
    }
  }
}

/// Business days between the document's sent and release timestamps, with no
/// deduction applied. Zero when unreleased.
pub fn raw_business_days(doc: &Document) -> u32 {
  count_business_days(Some(doc.sent_at), doc.released())
}

pub fn resolve_processing_days(doc: &Document) -> ProcessingDays {
  if let NetworkDays::Confirmed(n) = doc.network_days {
    return ProcessingDays::Confirmed(n);
  }
  match doc.released() {
    Some(_) => ProcessingDays::Derived(
      raw_business_days(doc).saturating_sub(doc.deducted_days),
    ),
    None => ProcessingDays::Unset,
  }
}

// ─── Lifecycle facet ─────────────────────────────────────────────────────────

/// Where a document sits in the processing-day state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingState {
  Unreleased,
  ReleasedRaw,
  ReleasedConfirmed,
}

impl ProcessingState {
  pub fn of(doc: &Document) -> Self {
    match (&doc.released_at, doc.network_days) {
      (_, NetworkDays::Confirmed(_)) => Self::ReleasedConfirmed,
      (Some(_), NetworkDays::Derived) => Self::ReleasedRaw,
      (None, NetworkDays::Derived) => Self::Unreleased,
    }
  }
}

// ─── Deduction workflow ──────────────────────────────────────────────────────

/// Read the operator's "deducted days" field.
pub fn parse_deducted_days(input: &str) -> Result<u32, ValidationError> {
  let input = input.trim();
  if input.is_empty() {
    return Err(ValidationError::DeductedDaysRequired);
  }
  let value: i64 = input
    .parse()
    .map_err(|_| ValidationError::NotANumber(input.to_owned()))?;
  if value < 0 {
    return Err(ValidationError::NegativeDeduction);
  }
  u32::try_from(value).map_err(|_| ValidationError::NotANumber(input.to_owned()))
}

/// Confirm a processing-day value of `raw - deducted_days`.
///
/// Rejects a result that is negative or exactly zero; on success the
/// deduction, the confirmed value, and the remarks are set together.
pub fn apply_deduction(
  doc: &Document,
  deducted_days: u32,
  remarks: &str,
) -> Result<Document, ValidationError> {
  let remarks = remarks.trim();
  if remarks.is_empty() {
    return Err(ValidationError::RemarksRequired);
  }
  if doc.released().is_none() {
    return Err(ValidationError::NotReleased);
  }

  let raw = raw_business_days(doc);
  let days = match raw.checked_sub(deducted_days) {
    None => return Err(ValidationError::NegativeProcessingDays),
    Some(0) => return Err(ValidationError::ZeroProcessingDays),
    Some(n) => n,
  };

  Ok(Document {
    deducted_days,
    network_days: NetworkDays::Confirmed(days),
    network_days_remarks: remarks.to_owned(),
    ..doc.clone()
  })
}

/// Drop any confirmed value and deduction, returning the document to the
/// derived path.
pub fn clear_deduction(doc: &Document) -> Document {
  Document {
    deducted_days: 0,
    network_days: NetworkDays::Derived,
    network_days_remarks: String::new(),
    ..doc.clone()
  }
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;
  use uuid::Uuid;

  use super::*;
  use crate::document::{ArchiveStatus, Direction};

  fn released_doc() -> Document {
    Document {
      document_id:          Uuid::new_v4(),
      direction:            Direction::Outgoing,
      dts_number:           "DTS1".into(),
      document_type:        "Memo".into(),
      route:                "ORD".into(),
      remarks:              None,
      sent_at:              NaiveDate::from_ymd_opt(2025, 6, 2)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap(),
      released_at:          Some("June 6, 2025 at 10:00 AM".into()),
      time:                 None,
      deducted_days:        0,
      network_days:         NetworkDays::Derived,
      network_days_remarks: String::new(),
      archive:              ArchiveStatus::Active,
    }
  }

  #[test]
  fn derived_value_subtracts_deduction() {
    let doc = Document { deducted_days: 1, ..released_doc() };
    assert_eq!(resolve_processing_days(&doc), ProcessingDays::Derived(4));
  }

  #[test]
  fn derived_value_clamps_at_zero() {
    let doc = Document { deducted_days: 9, ..released_doc() };
    assert_eq!(resolve_processing_days(&doc), ProcessingDays::Derived(0));
  }

  #[test]
  fn confirmed_value_shadows_timestamps() {
    let doc = Document {
      network_days: NetworkDays::Confirmed(2),
      released_at: Some("June 20, 2025 at 10:00 AM".into()),
      ..released_doc()
    };
    assert_eq!(resolve_processing_days(&doc), ProcessingDays::Confirmed(2));
  }

  #[test]
  fn unreleased_is_unset_and_renders_dash() {
    let doc = Document { released_at: None, ..released_doc() };
    let days = resolve_processing_days(&doc);
    assert_eq!(days, ProcessingDays::Unset);
    assert_eq!(days.display(), "-");
    assert_eq!(days.target(), None);
  }

  #[test]
  fn unreadable_release_is_unset() {
    let doc = Document {
      released_at: Some("sometime next week".into()),
      ..released_doc()
    };
    assert_eq!(resolve_processing_days(&doc), ProcessingDays::Unset);
  }

  #[test]
  fn display_and_target_classification() {
    assert_eq!(ProcessingDays::Derived(4).display(), "4 days");
    assert_eq!(TargetStatus::classify(0), TargetStatus::OutOfTarget);
    assert_eq!(TargetStatus::classify(1), TargetStatus::OnTarget);
    assert_eq!(
      TargetStatus::classify(TARGET_PROCESSING_DAYS),
      TargetStatus::OnTarget
    );
    assert_eq!(
      TargetStatus::classify(TARGET_PROCESSING_DAYS + 1),
      TargetStatus::OutOfTarget
    );
  }

  #[test]
  fn apply_deduction_confirms_value() {
    let doc = apply_deduction(&released_doc(), 1, " courier delay ").unwrap();
    assert_eq!(doc.network_days, NetworkDays::Confirmed(4));
    assert_eq!(doc.deducted_days, 1);
    assert_eq!(doc.network_days_remarks, "courier delay");
    assert_eq!(resolve_processing_days(&doc), ProcessingDays::Confirmed(4));
    assert_eq!(ProcessingState::of(&doc), ProcessingState::ReleasedConfirmed);
  }

  #[test]
  fn deduction_to_zero_is_rejected() {
    let err = apply_deduction(&released_doc(), 5, "x").unwrap_err();
    assert_eq!(err, ValidationError::ZeroProcessingDays);
    assert!(err.to_string().contains("cannot be zero"));
  }

  #[test]
  fn deduction_below_zero_is_rejected() {
    let err = apply_deduction(&released_doc(), 6, "x").unwrap_err();
    assert_eq!(err, ValidationError::NegativeProcessingDays);
    assert!(err.to_string().contains("cannot be negative"));
  }

  #[test]
  fn deduction_uses_raw_count_not_previous_confirmation() {
    let confirmed = apply_deduction(&released_doc(), 3, "first").unwrap();
    assert_eq!(confirmed.network_days, NetworkDays::Confirmed(2));
    let again = apply_deduction(&confirmed, 1, "second").unwrap();
    assert_eq!(again.network_days, NetworkDays::Confirmed(4));
  }

  #[test]
  fn deduction_requires_remarks_and_release() {
    assert_eq!(
      apply_deduction(&released_doc(), 1, "   "),
      Err(ValidationError::RemarksRequired)
    );
    let unreleased = Document { released_at: None, ..released_doc() };
    assert_eq!(
      apply_deduction(&unreleased, 0, "x"),
      Err(ValidationError::NotReleased)
    );
  }

  #[test]
  fn clear_returns_to_released_raw() {
    let confirmed = apply_deduction(&released_doc(), 1, "x").unwrap();
    let cleared = clear_deduction(&confirmed);
    assert_eq!(cleared.deducted_days, 0);
    assert_eq!(cleared.network_days, NetworkDays::Derived);
    assert_eq!(cleared.network_days_remarks, "");
    assert_eq!(ProcessingState::of(&cleared), ProcessingState::ReleasedRaw);
    assert_eq!(resolve_processing_days(&cleared), ProcessingDays::Derived(5));
  }

  #[test]
  fn state_machine_starts_unreleased() {
    let doc = Document { released_at: None, ..released_doc() };
    assert_eq!(ProcessingState::of(&doc), ProcessingState::Unreleased);
  }

  #[test]
  fn parse_deducted_days_messages() {
    assert_eq!(parse_deducted_days(" 3 "), Ok(3));
    assert_eq!(
      parse_deducted_days(""),
      Err(ValidationError::DeductedDaysRequired)
    );
    assert_eq!(
      parse_deducted_days("two"),
      Err(ValidationError::NotANumber("two".into()))
    );
    assert_eq!(
      parse_deducted_days("-1"),
      Err(ValidationError::NegativeDeduction)
    );
    assert_eq!(
      parse_deducted_days("-1").unwrap_err().to_string(),
      "Cannot be negative"
    );
  }
}
