//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! `sent_at` uses the storage codec from `logbook_core::temporal`;
//! `archived_at` is an RFC 3339 UTC instant. UUIDs are stored as hyphenated
//! lowercase strings.

use chrono::{DateTime, Utc};
use logbook_core::{
  document::{ArchiveStatus, Direction, Document, NetworkDays},
  temporal::parse_storage,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Decode(format!("archived_at {s:?}: {e}")))
}

// ─── Direction ───────────────────────────────────────────────────────────────

pub fn encode_direction(d: Direction) -> &'static str { d.into() }

pub fn decode_direction(s: &str) -> Result<Direction> {
  s.parse()
    .map_err(|_| Error::Decode(format!("unknown direction: {s:?}")))
}

// ─── Search ──────────────────────────────────────────────────────────────────

/// Wrap `text` as a substring `LIKE` pattern. `%`, `_` and the escape
/// character itself match literally under `ESCAPE '\'`.
pub fn like_pattern(text: &str) -> String {
  let mut pattern = String::with_capacity(text.len() + 2);
  pattern.push('%');
  for c in text.chars() {
    if matches!(c, '\\' | '%' | '_') {
      pattern.push('\\');
    }
    pattern.push(c);
  }
  pattern.push('%');
  pattern
}

// ─── Counters ────────────────────────────────────────────────────────────────

pub fn decode_days(column: &str, n: i64) -> Result<u32> {
  u32::try_from(n).map_err(|_| Error::Decode(format!("{column} out of range: {n}")))
}

// ─── Row type ────────────────────────────────────────────────────────────────

/// Column list matching the field order of [`RawDocument::from_row`].
pub const DOCUMENT_COLUMNS: &str = "document_id, direction, dts_number, \
  document_type, route, remarks, sent_at, released_at, time, deducted_days, \
  computed_network_days, network_days_remarks, archived_at, archived_by";

/// Raw values read directly from a `documents` row.
pub struct RawDocument {
  pub document_id:           String,
  pub direction:             String,
  pub dts_number:            String,
  pub document_type:         String,
  pub route:                 String,
  pub remarks:               Option<String>,
  pub sent_at:               String,
  pub released_at:           Option<String>,
  pub time:                  Option<String>,
  pub deducted_days:         i64,
  pub computed_network_days: Option<i64>,
  pub network_days_remarks:  String,
  pub archived_at:           Option<String>,
  pub archived_by:           Option<String>,
}

impl RawDocument {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      document_id:           row.get(0)?,
      direction:             row.get(1)?,
      dts_number:            row.get(2)?,
      document_type:         row.get(3)?,
      route:                 row.get(4)?,
      remarks:               row.get(5)?,
      sent_at:               row.get(6)?,
      released_at:           row.get(7)?,
      time:                  row.get(8)?,
      deducted_days:         row.get(9)?,
      computed_network_days: row.get(10)?,
      network_days_remarks:  row.get(11)?,
      archived_at:           row.get(12)?,
      archived_by:           row.get(13)?,
    })
  }

  pub fn into_document(self) -> Result<Document> {
    let network_days = match self.computed_network_days {
      None => NetworkDays::Derived,
      Some(n) => NetworkDays::Confirmed(decode_days("computed_network_days", n)?),
    };

    let archive = match (self.archived_at, self.archived_by) {
      (Some(at), Some(by)) => ArchiveStatus::Archived { at: decode_dt(&at)?, by },
      (None, None) => ArchiveStatus::Active,
      _ => {
        return Err(Error::Decode(format!(
          "document {} has a half-written archive state",
          self.document_id
        )));
      }
    };

    Ok(Document {
      document_id: decode_uuid(&self.document_id)?,
      direction: decode_direction(&self.direction)?,
      dts_number: self.dts_number,
      document_type: self.document_type,
      route: self.route,
      remarks: self.remarks,
      sent_at: parse_storage(&self.sent_at)?,
      released_at: self.released_at,
      time: self.time,
      deducted_days: decode_days("deducted_days", self.deducted_days)?,
      network_days,
      network_days_remarks: self.network_days_remarks,
      archive,
    })
  }
}
