//! Dashboard statistics and the processing-days listing.
//!
//! Everything here is computed on read from a slice of documents; nothing is
//! stored. Archived documents are always excluded, and a document only counts
//! toward a month when its relevant date falls on a business day.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  business_days::{business_days_in_month, is_business_day},
  document::{Direction, Document},
  processing::{ProcessingDays, TargetStatus, resolve_processing_days},
};

/// Routes whose outgoing documents feed the processing-time metrics.
pub const PRIORITY_ROUTES: [&str; 2] = ["ORD", "Accounting_Unit"];

pub fn is_priority_route(route: &str) -> bool {
  PRIORITY_ROUTES.contains(&route)
}

// ─── Period ──────────────────────────────────────────────────────────────────

/// A calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
  pub year:  i32,
  /// 1-based.
  pub month: u32,
}

impl Period {
  pub fn new(year: i32, month: u32) -> Option<Self> {
    (1..=12).contains(&month).then_some(Self { year, month })
  }

  pub fn containing(date: NaiveDate) -> Self {
    Self { year: date.year(), month: date.month() }
  }

  pub fn contains(&self, date: NaiveDate) -> bool {
    date.year() == self.year && date.month() == self.month
  }
}

// ─── Dashboard ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetBreakdown {
  pub on_target:     usize,
  pub out_of_target: usize,
}

/// Releases per document type on each business day of a month.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseChart {
  /// Day-of-month numbers of the business days, in order.
  pub days:   Vec<u32>,
  /// Counts per document type, aligned with `days`.
  pub series: BTreeMap<String, Vec<usize>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
  pub period:                  Period,
  /// Outgoing priority-route documents released today.
  pub today_outgoing:          usize,
  pub monthly_outgoing:        usize,
  /// Incoming documents not addressed to a priority route.
  pub monthly_incoming:        usize,
  /// Mean processing days of outgoing priority-route releases; `None` when
  /// nothing qualifies.
  pub average_processing_days: Option<f64>,
  pub targets:                 TargetBreakdown,
  pub release_chart:           ReleaseChart,
}

/// The release date of `doc`, when it has one that falls on a business day.
fn business_release_date(doc: &Document) -> Option<NaiveDate> {
  doc
    .released()
    .map(|t| t.date())
    .filter(|d| is_business_day(*d))
}

fn live_outgoing(doc: &Document) -> bool {
  !doc.is_archived() && doc.direction == Direction::Outgoing
}

pub fn dashboard(docs: &[Document], period: Period, today: NaiveDate) -> Dashboard {
  let today_outgoing = docs
    .iter()
    .filter(|d| live_outgoing(d) && is_priority_route(&d.route))
    .filter(|d| business_release_date(d) == Some(today))
    .count();

  let monthly_outgoing = docs
    .iter()
    .filter(|d| live_outgoing(d))
    .filter(|d| business_release_date(d).is_some_and(|r| period.contains(r)))
    .count();

  let monthly_incoming = docs
    .iter()
    .filter(|d| !d.is_archived() && d.direction == Direction::Incoming)
    .filter(|d| !is_priority_route(&d.route))
    .map(|d| d.sent_at.date())
    .filter(|s| is_business_day(*s) && period.contains(*s))
    .count();

  let processing: Vec<u32> = docs
    .iter()
    .filter(|d| live_outgoing(d) && is_priority_route(&d.route))
    .filter(|d| business_release_date(d).is_some_and(|r| period.contains(r)))
    .filter_map(|d| resolve_processing_days(d).value())
    .collect();

  let average_processing_days = (!processing.is_empty()).then(|| {
    processing.iter().map(|n| f64::from(*n)).sum::<f64>() / processing.len() as f64
  });

  let mut targets = TargetBreakdown::default();
  for days in &processing {
    match TargetStatus::classify(*days) {
      TargetStatus::OnTarget => targets.on_target += 1,
      TargetStatus::OutOfTarget => targets.out_of_target += 1,
    }
  }

  Dashboard {
    period,
    today_outgoing,
    monthly_outgoing,
    monthly_incoming,
    average_processing_days,
    targets,
    release_chart: release_chart(docs, period),
  }
}

pub fn release_chart(docs: &[Document], period: Period) -> ReleaseChart {
  let days = business_days_in_month(period.year, period.month);
  let mut series: BTreeMap<String, Vec<usize>> = BTreeMap::new();

  for doc in docs.iter().filter(|d| !d.is_archived()) {
    let Some(released) = business_release_date(doc) else { continue };
    if !period.contains(released) {
      continue;
    }
    let Some(slot) = days.iter().position(|d| *d == released.day()) else {
      continue;
    };
    series
      .entry(doc.document_type.clone())
      .or_insert_with(|| vec![0; days.len()])[slot] += 1;
  }

  ReleaseChart { days, series }
}

// ─── Processing-days listing ─────────────────────────────────────────────────

/// Filter for [`processing_rows`]. `None` means "all" for month and year.
#[derive(Debug, Clone, Default)]
pub struct ProcessingFilter {
  pub month:  Option<u32>,
  pub year:   Option<i32>,
  /// Case-insensitive match against DTS number and document type.
  pub search: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingRow {
  pub document_id:     Uuid,
  pub dts_number:      String,
  pub document_type:   String,
  pub route:           String,
  pub sent_at:         NaiveDateTime,
  /// Display string, or `"-"`.
  pub released_at:     String,
  pub deducted_days:   u32,
  pub processing_days: ProcessingDays,
  pub target:          Option<TargetStatus>,
  /// Deduction remarks, or `"-"`.
  pub remarks:         String,
}

impl ProcessingRow {
  fn of(doc: &Document) -> Self {
    let processing_days = resolve_processing_days(doc);
    Self {
      document_id: doc.document_id,
      dts_number: doc.dts_number.clone(),
      document_type: doc.document_type.clone(),
      route: doc.route.clone(),
      sent_at: doc.sent_at,
      released_at: doc.released_at.clone().unwrap_or_else(|| "-".to_owned()),
      deducted_days: doc.deducted_days,
      processing_days,
      target: processing_days.target(),
      remarks: if doc.network_days_remarks.is_empty() {
        "-".to_owned()
      } else {
        doc.network_days_remarks.clone()
      },
    }
  }
}

impl ProcessingFilter {
  fn matches(&self, doc: &Document) -> bool {
    if self.month.is_some() || self.year.is_some() {
      let Some(released) = doc.released() else { return false };
      if self.month.is_some_and(|m| released.month() != m)
        || self.year.is_some_and(|y| released.year() != y)
      {
        return false;
      }
    }
    match self.search.as_deref().map(str::trim) {
      None | Some("") => true,
      Some(term) => {
        let term = term.to_lowercase();
        doc.dts_number.to_lowercase().contains(&term)
          || doc.document_type.to_lowercase().contains(&term)
          || Direction::Outgoing.as_ref().contains(term.as_str())
      }
    }
  }
}

/// Outgoing, non-archived documents matching `filter`, newest `sent_at`
/// first.
pub fn processing_rows(
  docs: &[Document],
  filter: &ProcessingFilter,
) -> Vec<ProcessingRow> {
  let mut matching: Vec<&Document> = docs
    .iter()
    .filter(|d| live_outgoing(d) && filter.matches(d))
    .collect();
  matching.sort_by(|a, b| b.sent_at.cmp(&a.sent_at));
  matching.into_iter().map(ProcessingRow::of).collect()
}
