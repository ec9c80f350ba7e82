//! Document types: the aggregate the processing-time engine operates on.

use chrono::{DateTime, Datelike, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{error::ValidationError, temporal};

// ─── Direction ───────────────────────────────────────────────────────────────

/// Whether a document entered or left the office. Fixed at creation.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
  strum::AsRefStr,
  strum::IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Direction {
  Incoming,
  Outgoing,
}

// ─── Processing-day facet ────────────────────────────────────────────────────

/// The stored processing-day value. `Confirmed` shadows the derived
/// calculation until it is explicitly cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "days", rename_all = "snake_case")]
pub enum NetworkDays {
  /// Recompute from `sent_at`/`released_at` on every read.
  #[default]
  Derived,
  /// Operator-confirmed value written by the deduction workflow.
  Confirmed(u32),
}

impl NetworkDays {
  pub fn confirmed(&self) -> Option<u32> {
    match self {
      Self::Derived => None,
      Self::Confirmed(n) => Some(*n),
    }
  }
}

// ─── Archive state ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ArchiveStatus {
  #[default]
  Active,
  Archived {
    at: DateTime<Utc>,
    by: String,
  },
}

impl ArchiveStatus {
  pub fn is_archived(&self) -> bool { matches!(self, Self::Archived { .. }) }
}

// ─── Document ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
  pub document_id:          Uuid,
  pub direction:            Direction,
  /// Upper-case alphanumeric tracking slip number. Not guaranteed unique.
  pub dts_number:           String,
  pub document_type:        String,
  /// Destination unit; empty for incoming documents.
  pub route:                String,
  pub remarks:              Option<String>,
  /// Office wall-clock time the document entered the workflow.
  pub sent_at:              NaiveDateTime,
  /// Normalised display string, e.g. `"June 6, 2025 at 10:00 AM"`.
  pub released_at:          Option<String>,
  /// Free-text time-of-day note from the quick edit.
  pub time:                 Option<String>,
  pub deducted_days:        u32,
  pub network_days:         NetworkDays,
  pub network_days_remarks: String,
  pub archive:              ArchiveStatus,
}

impl Document {
  /// The parsed release timestamp, if one is present and readable.
  pub fn released(&self) -> Option<NaiveDateTime> {
    self
      .released_at
      .as_deref()
      .and_then(|s| temporal::parse_display(s).ok())
  }

  pub fn is_archived(&self) -> bool { self.archive.is_archived() }
}

// ─── Input normalisation ─────────────────────────────────────────────────────

/// Strip everything but ASCII letters and digits and upper-case the rest.
pub fn normalize_dts_number(raw: &str) -> String {
  raw
    .chars()
    .filter(char::is_ascii_alphanumeric)
    .map(|c| c.to_ascii_uppercase())
    .collect()
}

fn required(
  field: &'static str,
  value: &str,
) -> Result<String, ValidationError> {
  let trimmed = value.trim();
  if trimmed.is_empty() {
    Err(ValidationError::MissingField(field))
  } else {
    Ok(trimmed.to_owned())
  }
}

fn required_dts(raw: &str) -> Result<String, ValidationError> {
  let dts = normalize_dts_number(raw);
  if dts.is_empty() {
    Err(ValidationError::MissingField("DTS number"))
  } else {
    Ok(dts)
  }
}

fn optional(value: Option<String>) -> Option<String> {
  value
    .map(|v| v.trim().to_owned())
    .filter(|v| !v.is_empty())
}

fn release_string(raw: &str) -> Result<String, ValidationError> {
  if raw.trim().is_empty() {
    return Err(ValidationError::MissingField("date released"));
  }
  temporal::normalize_display(raw).map_err(ValidationError::ReleaseDate)
}

/// Years the four-digit storage string can represent.
fn storable_sent_at(sent_at: NaiveDateTime) -> Result<NaiveDateTime, ValidationError> {
  match sent_at.year() {
    0..=9999 => Ok(sent_at),
    year => Err(ValidationError::SentYearOutOfRange(year)),
  }
}

/// `""` and `"-"` clear the quick-edit time note.
pub fn normalize_time_note(raw: Option<&str>) -> Option<String> {
  match raw.map(str::trim) {
    None | Some("") | Some("-") => None,
    Some(t) => Some(t.to_owned()),
  }
}

// ─── NewDocument ─────────────────────────────────────────────────────────────

/// Input for an outgoing document. Every field but `remarks` is required.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOutgoing {
  pub dts_number:    String,
  pub document_type: String,
  pub route:         String,
  pub remarks:       Option<String>,
  pub sent_at:       NaiveDateTime,
  /// Display string; normalised before it is stored.
  pub released_at:   String,
}

/// Input for an incoming document. `sent_at` defaults to "now".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewIncoming {
  pub dts_number:    String,
  pub document_type: String,
  pub sent_at:       Option<NaiveDateTime>,
}

/// Input to [`crate::store::DocumentStore::create_document`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "direction", rename_all = "lowercase")]
pub enum NewDocument {
  Outgoing(NewOutgoing),
  Incoming(NewIncoming),
}

impl NewDocument {
  /// Validate and normalise the input into a fresh [`Document`].
  ///
  /// `now` is the office wall-clock time used to stamp incoming documents
  /// that arrive without a `sent_at`.
  pub fn into_document(
    self,
    document_id: Uuid,
    now: NaiveDateTime,
  ) -> Result<Document, ValidationError> {
    let (direction, dts_number, document_type, route, remarks, sent_at, released_at) =
      match self {
        Self::Outgoing(o) => (
          Direction::Outgoing,
          required_dts(&o.dts_number)?,
          required("document type", &o.document_type)?,
          required("route", &o.route)?,
          optional(o.remarks),
          storable_sent_at(o.sent_at)?,
          Some(release_string(&o.released_at)?),
        ),
        Self::Incoming(i) => (
          Direction::Incoming,
          required_dts(&i.dts_number)?,
          required("document type", &i.document_type)?,
          String::new(),
          None,
          storable_sent_at(i.sent_at.unwrap_or(now))?,
          None,
        ),
      };

    Ok(Document {
      document_id,
      direction,
      dts_number,
      document_type,
      route,
      remarks,
      sent_at,
      released_at,
      time: None,
      deducted_days: 0,
      network_days: NetworkDays::Derived,
      network_days_remarks: String::new(),
      archive: ArchiveStatus::Active,
    })
  }
}

// ─── Edits ───────────────────────────────────────────────────────────────────

/// Full routing edit of an outgoing document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingEdit {
  pub dts_number:    String,
  pub document_type: String,
  pub route:         String,
  pub remarks:       Option<String>,
  pub time:          Option<String>,
  /// `Some` sets or replaces the release date; `None` keeps it. A release
  /// date is never cleared once set.
  pub released_at:   Option<String>,
}

/// Edit of an incoming document's identifying fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomingEdit {
  pub dts_number:    String,
  pub document_type: String,
}

/// A mutation of a document's non-processing fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DocumentEdit {
  Routing(RoutingEdit),
  Incoming(IncomingEdit),
  /// Quick edit of the time-of-day note alone.
  Time { time: Option<String> },
}

impl DocumentEdit {
  /// Apply the edit to `doc`, returning the updated document. `direction`,
  /// the processing-day facet, and the archive state are never touched.
  ///
  /// Routing edits only apply to outgoing documents and incoming edits only
  /// to incoming ones; the time note applies to both.
  pub fn apply(self, doc: &Document) -> Result<Document, ValidationError> {
    match (&self, doc.direction) {
      (Self::Routing(_), Direction::Incoming)
      | (Self::Incoming(_), Direction::Outgoing) => {
        return Err(ValidationError::WrongDirection(doc.direction));
      }
      _ => {}
    }

    let mut next = doc.clone();
    match self {
      Self::Routing(e) => {
        next.dts_number = required_dts(&e.dts_number)?;
        next.document_type = required("document type", &e.document_type)?;
        next.route = required("route", &e.route)?;
        next.remarks = optional(e.remarks);
        next.time = normalize_time_note(e.time.as_deref());
        if let Some(raw) = e.released_at {
          next.released_at = Some(release_string(&raw)?);
        }
      }
      Self::Incoming(e) => {
        next.dts_number = required_dts(&e.dts_number)?;
        next.document_type = required("document type", &e.document_type)?;
      }
      Self::Time { time } => {
        next.time = normalize_time_note(time.as_deref());
      }
    }
    Ok(next)
  }
}
