//! Subcommands and their handlers.

use anyhow::{Context as _, bail};
use clap::{Args, Subcommand};
use logbook_core::{
  business_days::count_business_days,
  document::{
    Direction, Document, DocumentEdit, IncomingEdit, NewDocument, NewIncoming,
    NewOutgoing, RoutingEdit,
  },
  lifecycle::Actor,
  processing::parse_deducted_days,
  stats::{self, Period, ProcessingFilter},
  store::{DocumentQuery, DocumentStore},
  temporal::OfficeZone,
};
use logbook_store_sqlite::SqliteStore;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt as _, BufReader};
use uuid::Uuid;

use crate::output::{self, DocumentView, emit};

// ─── Arguments ───────────────────────────────────────────────────────────────

#[derive(Subcommand, Debug)]
pub enum Command {
  /// Log an outgoing document.
  Outgoing(OutgoingArgs),
  /// Log an incoming document.
  Incoming(IncomingArgs),
  /// List documents, newest first.
  List(ListArgs),
  /// Show one document by id or DTS number.
  Show { target: String },
  /// Edit a document's routing or identifying fields.
  Edit(EditArgs),
  /// Set or clear (with "" or "-") the time-of-day note.
  Time { target: String, time: Option<String> },
  /// Confirm processing days by deducting days from the business-day count.
  Deduct {
    target:        String,
    #[arg(allow_hyphen_values = true)]
    deducted_days: String,
    #[arg(short, long)]
    remarks:       String,
  },
  /// Drop a confirmed processing-day value.
  ClearDeduction { target: String },
  /// Move a document to the archive.
  Archive {
    target: String,
    /// Actor recorded on the archive; defaults to the configured operator.
    #[arg(long)]
    by:     Option<String>,
  },
  /// Bring an archived document back.
  Restore { target: String },
  /// Permanently delete an archived document.
  Delete { target: String },
  /// Monthly statistics.
  Dashboard {
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
    month: Option<u32>,
    #[arg(long)]
    year:  Option<i32>,
  },
  /// Processing days of outgoing documents.
  Processing {
    /// Release month; all months when omitted.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
    month:  Option<u32>,
    #[arg(long)]
    year:   Option<i32>,
    #[arg(short, long)]
    search: Option<String>,
  },
  /// Count business days between two timestamps, inclusive.
  BusinessDays { from: String, to: String },
  /// Apply JSON-lines operations from stdin, printing each change event.
  Batch,
}

#[derive(Args, Debug)]
pub struct OutgoingArgs {
  pub dts_number:    String,
  #[arg(short = 't', long = "type")]
  pub document_type: String,
  #[arg(short, long)]
  pub route:         String,
  /// Display string, e.g. "June 6, 2025 at 10:00 AM".
  #[arg(long)]
  pub released:      String,
  /// Any timestamp form; defaults to now.
  #[arg(long)]
  pub sent:          Option<String>,
  #[arg(long)]
  pub remarks:       Option<String>,
}

#[derive(Args, Debug)]
pub struct IncomingArgs {
  pub dts_number:    String,
  #[arg(short = 't', long = "type")]
  pub document_type: String,
  /// Any timestamp form; defaults to now.
  #[arg(long)]
  pub sent:          Option<String>,
}

#[derive(Args, Debug)]
pub struct ListArgs {
  #[arg(short, long)]
  pub direction: Option<Direction>,
  /// Show the archive instead of live documents.
  #[arg(long, conflicts_with = "all")]
  pub archived:  bool,
  /// Show live and archived documents.
  #[arg(long)]
  pub all:       bool,
  #[arg(short, long)]
  pub search:    Option<String>,
}

#[derive(Args, Debug)]
pub struct EditArgs {
  pub target:        String,
  #[arg(long)]
  pub dts_number:    Option<String>,
  #[arg(short = 't', long = "type")]
  pub document_type: Option<String>,
  #[arg(short, long)]
  pub route:         Option<String>,
  #[arg(long)]
  pub remarks:       Option<String>,
  #[arg(long)]
  pub time:          Option<String>,
  #[arg(long)]
  pub released:      Option<String>,
}

// ─── Context ─────────────────────────────────────────────────────────────────

pub struct Context {
  pub store:    SqliteStore,
  pub zone:     OfficeZone,
  pub operator: Actor,
  pub json:     bool,
}

impl Context {
  /// Find a document by UUID, or by DTS number when that is unambiguous.
  async fn resolve(&self, target: &str) -> anyhow::Result<Document> {
    if let Ok(id) = Uuid::parse_str(target) {
      return self
        .store
        .get_document(id)
        .await?
        .with_context(|| format!("no document with id {id}"));
    }
    let mut found = self.store.find_by_dts_number(target).await?;
    match found.len() {
      0 => bail!("no document with DTS number {target:?}"),
      1 => Ok(found.remove(0)),
      n => bail!("{n} documents share DTS number {target:?}; use the document id"),
    }
  }

  fn timestamp(&self, raw: Option<&str>) -> anyhow::Result<chrono::NaiveDateTime> {
    match raw {
      None => Ok(self.zone.now()),
      Some(raw) => self
        .zone
        .parse_timestamp(raw)
        .with_context(|| format!("invalid timestamp {raw:?}")),
    }
  }

  async fn create(&self, input: NewDocument) -> anyhow::Result<Document> {
    let dts_number = match &input {
      NewDocument::Outgoing(o) => &o.dts_number,
      NewDocument::Incoming(i) => &i.dts_number,
    };
    let existing = self.store.find_by_dts_number(dts_number).await?;
    if !existing.is_empty() {
      tracing::warn!(
        dts_number = %dts_number,
        count = existing.len(),
        "DTS number is already in the logbook"
      );
    }
    Ok(self.store.create_document(input).await?)
  }

  fn show(&self, doc: &Document) -> anyhow::Result<()> {
    emit(self.json, &DocumentView::of(doc), output::document_detail)
  }
}

// ─── Dispatch ────────────────────────────────────────────────────────────────

pub async fn run(command: Command, ctx: &Context) -> anyhow::Result<()> {
  match command {
    Command::Outgoing(args) => {
      let input = NewDocument::Outgoing(NewOutgoing {
        dts_number:    args.dts_number,
        document_type: args.document_type,
        route:         args.route,
        remarks:       args.remarks,
        sent_at:       ctx.timestamp(args.sent.as_deref())?,
        released_at:   args.released,
      });
      let doc = ctx.create(input).await?;
      ctx.show(&doc)
    }

    Command::Incoming(args) => {
      let sent_at = args
        .sent
        .as_deref()
        .map(|raw| ctx.timestamp(Some(raw)))
        .transpose()?;
      let input = NewDocument::Incoming(NewIncoming {
        dts_number: args.dts_number,
        document_type: args.document_type,
        sent_at,
      });
      let doc = ctx.create(input).await?;
      ctx.show(&doc)
    }

    Command::List(args) => {
      let query = DocumentQuery {
        direction: args.direction,
        archived:  match (args.archived, args.all) {
          (true, _) => Some(true),
          (false, true) => None,
          (false, false) => Some(false),
        },
        text:      args.search,
      };
      let docs = ctx.store.list_documents(&query).await?;
      if ctx.json {
        let views: Vec<DocumentView<'_>> = docs.iter().map(DocumentView::of).collect();
        emit(true, &views, |_| String::new())
      } else {
        println!("{}", output::document_list(&docs));
        Ok(())
      }
    }

    Command::Show { target } => {
      let doc = ctx.resolve(&target).await?;
      ctx.show(&doc)
    }

    Command::Edit(args) => {
      let doc = ctx.resolve(&args.target).await?;
      let edit = edit_for(&doc, args)?;
      let doc = ctx.store.edit_document(doc.document_id, edit).await?;
      ctx.show(&doc)
    }

    Command::Time { target, time } => {
      let doc = ctx.resolve(&target).await?;
      let doc = ctx
        .store
        .edit_document(doc.document_id, DocumentEdit::Time { time })
        .await?;
      ctx.show(&doc)
    }

    Command::Deduct { target, deducted_days, remarks } => {
      let deducted_days = parse_deducted_days(&deducted_days)?;
      let doc = ctx.resolve(&target).await?;
      let doc = ctx
        .store
        .apply_deduction(doc.document_id, deducted_days, remarks)
        .await?;
      tracing::info!(
        document_id = %doc.document_id,
        deducted_days,
        "processing days confirmed"
      );
      ctx.show(&doc)
    }

    Command::ClearDeduction { target } => {
      let doc = ctx.resolve(&target).await?;
      let doc = ctx.store.clear_deduction(doc.document_id).await?;
      ctx.show(&doc)
    }

    Command::Archive { target, by } => {
      let doc = ctx.resolve(&target).await?;
      let actor = by.map(Actor::new).unwrap_or_else(|| ctx.operator.clone());
      let doc = ctx.store.archive_document(doc.document_id, actor).await?;
      tracing::info!(document_id = %doc.document_id, "archived");
      ctx.show(&doc)
    }

    Command::Restore { target } => {
      let doc = ctx.resolve(&target).await?;
      let doc = ctx.store.restore_document(doc.document_id).await?;
      ctx.show(&doc)
    }

    Command::Delete { target } => {
      let doc = ctx.resolve(&target).await?;
      ctx.store.delete_document(doc.document_id).await?;
      tracing::info!(document_id = %doc.document_id, "permanently deleted");
      emit(ctx.json, &doc.document_id, |id| format!("deleted {id}"))
    }

    Command::Dashboard { month, year } => {
      let today = ctx.zone.today();
      let current = Period::containing(today);
      let period = Period::new(
        year.unwrap_or(current.year),
        month.unwrap_or(current.month),
      )
      .context("month must be between 1 and 12")?;
      let docs = ctx
        .store
        .list_documents(&DocumentQuery { archived: Some(false), ..DocumentQuery::default() })
        .await?;
      emit(ctx.json, &stats::dashboard(&docs, period, today), output::dashboard)
    }

    Command::Processing { month, year, search } => {
      let docs = ctx
        .store
        .list_documents(&DocumentQuery::live(Direction::Outgoing))
        .await?;
      let filter = ProcessingFilter { month, year, search };
      let rows = stats::processing_rows(&docs, &filter);
      emit(ctx.json, &rows, |rows| output::processing_table(rows))
    }

    Command::BusinessDays { from, to } => {
      let from = ctx.timestamp(Some(&from))?;
      let to = ctx.timestamp(Some(&to))?;
      let days = count_business_days(Some(from), Some(to));
      emit(ctx.json, &days, |n| format!("{n} business days"))
    }

    Command::Batch => batch(ctx).await,
  }
}

/// Build the edit for `doc`, keeping every field the caller left out.
fn edit_for(doc: &Document, args: EditArgs) -> anyhow::Result<DocumentEdit> {
  Ok(match doc.direction {
    Direction::Outgoing => DocumentEdit::Routing(RoutingEdit {
      dts_number:    args.dts_number.unwrap_or_else(|| doc.dts_number.clone()),
      document_type: args
        .document_type
        .unwrap_or_else(|| doc.document_type.clone()),
      route:         args.route.unwrap_or_else(|| doc.route.clone()),
      remarks:       args.remarks.or_else(|| doc.remarks.clone()),
      time:          args.time.or_else(|| doc.time.clone()),
      released_at:   args.released,
    }),
    Direction::Incoming => {
      if args.route.is_some()
        || args.remarks.is_some()
        || args.time.is_some()
        || args.released.is_some()
      {
        bail!("incoming documents only carry a DTS number and a document type");
      }
      DocumentEdit::Incoming(IncomingEdit {
        dts_number:    args.dts_number.unwrap_or_else(|| doc.dts_number.clone()),
        document_type: args
          .document_type
          .unwrap_or_else(|| doc.document_type.clone()),
      })
    }
  })
}

// ─── Batch ───────────────────────────────────────────────────────────────────

/// One line of `logbook batch` input.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum BatchOp {
  Create { document: NewDocument },
  Edit { id: Uuid, edit: DocumentEdit },
  Deduct { id: Uuid, deducted_days: u32, remarks: String },
  ClearDeduction { id: Uuid },
  Archive { id: Uuid, by: Option<String> },
  Restore { id: Uuid },
  Delete { id: Uuid },
}

async fn apply_op(ctx: &Context, op: BatchOp) -> anyhow::Result<()> {
  let store = &ctx.store;
  match op {
    BatchOp::Create { document } => {
      ctx.create(document).await?;
    }
    BatchOp::Edit { id, edit } => {
      store.edit_document(id, edit).await?;
    }
    BatchOp::Deduct { id, deducted_days, remarks } => {
      store.apply_deduction(id, deducted_days, remarks).await?;
    }
    BatchOp::ClearDeduction { id } => {
      store.clear_deduction(id).await?;
    }
    BatchOp::Archive { id, by } => {
      let actor = by.map(Actor::new).unwrap_or_else(|| ctx.operator.clone());
      store.archive_document(id, actor).await?;
    }
    BatchOp::Restore { id } => {
      store.restore_document(id).await?;
    }
    BatchOp::Delete { id } => {
      store.delete_document(id).await?;
    }
  }
  Ok(())
}

/// Apply each stdin line in order. A failing line is reported and skipped;
/// the batch fails at the end if any line did.
async fn batch(ctx: &Context) -> anyhow::Result<()> {
  let mut events = ctx.store.subscribe();
  let mut lines = BufReader::new(tokio::io::stdin()).lines();
  let mut failures = 0usize;
  let mut number = 0usize;

  while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
    number += 1;
    if line.trim().is_empty() {
      continue;
    }
    let result = match serde_json::from_str::<BatchOp>(&line) {
      Ok(op) => apply_op(ctx, op).await,
      Err(e) => Err(anyhow::Error::new(e).context("malformed operation")),
    };
    if let Err(e) = result {
      failures += 1;
      tracing::warn!(line = number, "{e:#}");
    }
    while let Ok(event) = events.try_recv() {
      emit(ctx.json, &event, output::event_line)?;
    }
  }

  if failures > 0 {
    bail!("{failures} of {number} lines failed");
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn outgoing_doc() -> Document {
    let now = chrono::NaiveDate::from_ymd_opt(2025, 6, 2)
      .unwrap()
      .and_hms_opt(9, 0, 0)
      .unwrap();
    NewDocument::Outgoing(NewOutgoing {
      dts_number:    "A1".into(),
      document_type: "Memo".into(),
      route:         "ORD".into(),
      remarks:       Some("urgent".into()),
      sent_at:       now,
      released_at:   "June 6, 2025 at 10:00 AM".into(),
    })
    .into_document(Uuid::new_v4(), now)
    .unwrap()
  }

  fn edit_args(target: &str) -> EditArgs {
    EditArgs {
      target:        target.into(),
      dts_number:    None,
      document_type: None,
      route:         None,
      remarks:       None,
      time:          None,
      released:      None,
    }
  }

  #[test]
  fn edit_keeps_omitted_fields() {
    let doc = outgoing_doc();
    let args = EditArgs { route: Some("HR".into()), ..edit_args("A1") };
    let edited = edit_for(&doc, args).unwrap().apply(&doc).unwrap();
    assert_eq!(edited.route, "HR");
    assert_eq!(edited.remarks.as_deref(), Some("urgent"));
    assert_eq!(edited.released_at, doc.released_at);
  }

  #[test]
  fn incoming_edit_rejects_routing_fields() {
    let doc = Document { direction: Direction::Incoming, ..outgoing_doc() };
    let args = EditArgs { route: Some("HR".into()), ..edit_args("A1") };
    assert!(edit_for(&doc, args).is_err());
  }

  #[test]
  fn batch_ops_parse_from_json_lines() {
    let op: BatchOp = serde_json::from_str(
      r#"{"op":"create","document":{"direction":"incoming","dts_number":"x1","document_type":"Memo","sent_at":null}}"#,
    )
    .unwrap();
    assert!(matches!(op, BatchOp::Create { document: NewDocument::Incoming(_) }));

    let id = Uuid::new_v4();
    let op: BatchOp = serde_json::from_str(&format!(
      r#"{{"op":"deduct","id":"{id}","deducted_days":1,"remarks":"holiday"}}"#
    ))
    .unwrap();
    assert!(matches!(op, BatchOp::Deduct { deducted_days: 1, .. }));

    let op: BatchOp = serde_json::from_str(&format!(
      r#"{{"op":"edit","id":"{id}","edit":{{"kind":"time","time":"-"}}}}"#
    ))
    .unwrap();
    assert!(matches!(op, BatchOp::Edit { edit: DocumentEdit::Time { .. }, .. }));
  }
}
