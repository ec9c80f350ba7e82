//! Text and JSON rendering of command results.

use logbook_core::{
  document::{ArchiveStatus, Direction, Document},
  events::DocumentEvent,
  processing::{ProcessingDays, ProcessingState, TargetStatus, resolve_processing_days},
  stats::{Dashboard, ProcessingRow},
  temporal::format_display,
};
use serde::Serialize;

/// Print `value` as pretty JSON, or as the text `render` produces.
pub fn emit<T: Serialize>(
  json: bool,
  value: &T,
  render: impl FnOnce(&T) -> String,
) -> anyhow::Result<()> {
  if json {
    println!("{}", serde_json::to_string_pretty(value)?);
  } else {
    println!("{}", render(value));
  }
  Ok(())
}

// ─── Documents ───────────────────────────────────────────────────────────────

/// A document together with its resolved processing days.
#[derive(Serialize)]
pub struct DocumentView<'a> {
  #[serde(flatten)]
  pub document:         &'a Document,
  pub processing_days:  ProcessingDays,
  pub processing_state: ProcessingState,
  pub target:           Option<TargetStatus>,
}

impl<'a> DocumentView<'a> {
  pub fn of(document: &'a Document) -> Self {
    let processing_days = resolve_processing_days(document);
    Self {
      document,
      processing_days,
      processing_state: ProcessingState::of(document),
      target: processing_days.target(),
    }
  }
}

fn target_label(target: Option<TargetStatus>) -> &'static str {
  match target {
    Some(TargetStatus::OnTarget) => "on target",
    Some(TargetStatus::OutOfTarget) => "out of target",
    None => "-",
  }
}

pub fn document_line(doc: &Document) -> String {
  let released = doc.released_at.as_deref().unwrap_or("-");
  let days = match doc.direction {
    Direction::Outgoing => resolve_processing_days(doc).display(),
    Direction::Incoming => "-".to_owned(),
  };
  let archived = if doc.is_archived() { "  [archived]" } else { "" };
  format!(
    "{}  {:<8}  {:<14}  {:<22}  {:<28}  {:<28}  {days}{archived}",
    doc.document_id,
    doc.direction,
    doc.dts_number,
    doc.document_type,
    format_display(doc.sent_at),
    released,
  )
}

pub fn document_list(docs: &[Document]) -> String {
  if docs.is_empty() {
    return "no documents".to_owned();
  }
  docs.iter().map(document_line).collect::<Vec<_>>().join("\n")
}

pub fn document_detail(view: &DocumentView<'_>) -> String {
  let doc = view.document;
  let or_dash = |v: Option<&str>| v.unwrap_or("-").to_owned();
  let mut lines = vec![
    format!("id              {}", doc.document_id),
    format!("direction       {}", doc.direction),
    format!("dts number      {}", doc.dts_number),
    format!("document type   {}", doc.document_type),
    format!("route           {}", if doc.route.is_empty() { "-" } else { doc.route.as_str() }),
    format!("remarks         {}", or_dash(doc.remarks.as_deref())),
    format!("sent            {}", format_display(doc.sent_at)),
    format!("released        {}", or_dash(doc.released_at.as_deref())),
    format!("time            {}", or_dash(doc.time.as_deref())),
  ];
  if doc.direction == Direction::Outgoing {
    lines.push(format!(
      "processing days {} ({})",
      view.processing_days.display(),
      target_label(view.target)
    ));
    if doc.deducted_days > 0 || !doc.network_days_remarks.is_empty() {
      lines.push(format!(
        "deducted        {} ({})",
        doc.deducted_days, doc.network_days_remarks
      ));
    }
  }
  if let ArchiveStatus::Archived { at, by } = &doc.archive {
    lines.push(format!("archived        {} by {by}", at.to_rfc3339()));
  }
  lines.join("\n")
}

// ─── Views ───────────────────────────────────────────────────────────────────

pub fn dashboard(d: &Dashboard) -> String {
  let average = d
    .average_processing_days
    .map_or_else(|| "-".to_owned(), |a| format!("{a:.1} days"));
  let mut lines = vec![
    format!("period                  {}-{:02}", d.period.year, d.period.month),
    format!("released today          {}", d.today_outgoing),
    format!("outgoing this month     {}", d.monthly_outgoing),
    format!("incoming this month     {}", d.monthly_incoming),
    format!("average processing      {average}"),
    format!(
      "on / out of target      {} / {}",
      d.targets.on_target, d.targets.out_of_target
    ),
  ];

  let chart = &d.release_chart;
  if !chart.series.is_empty() {
    lines.push(String::new());
    let header: String = chart.days.iter().map(|day| format!("{day:>3}")).collect();
    lines.push(format!("{:<22}{header}", "releases by day"));
    for (document_type, counts) in &chart.series {
      let row: String = counts.iter().map(|n| format!("{n:>3}")).collect();
      lines.push(format!("{document_type:<22}{row}"));
    }
  }
  lines.join("\n")
}

pub fn processing_table(rows: &[ProcessingRow]) -> String {
  if rows.is_empty() {
    return "no documents".to_owned();
  }
  rows
    .iter()
    .map(|r| {
      format!(
        "{:<14}  {:<22}  {:<16}  {:<28}  {:>8}  {:<13}  {}",
        r.dts_number,
        r.document_type,
        r.route,
        r.released_at,
        r.processing_days.display(),
        target_label(r.target),
        r.remarks,
      )
    })
    .collect::<Vec<_>>()
    .join("\n")
}

pub fn event_line(event: &DocumentEvent) -> String {
  let kind = serde_json::to_value(event.kind)
    .ok()
    .and_then(|v| v.as_str().map(str::to_owned))
    .unwrap_or_default();
  format!("{kind} {}", event.document_id)
}
