//! [`SqliteStore`], the SQLite implementation of [`DocumentStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use tokio::sync::broadcast;
use uuid::Uuid;

use logbook_core::{
  document::{
    ArchiveStatus, Document, DocumentEdit, NewDocument, normalize_dts_number,
  },
  events::{DocumentEvent, DocumentEventKind},
  lifecycle::{self, Actor},
  processing,
  store::{DocumentQuery, DocumentStore},
  temporal::{OfficeZone, format_storage},
};

use crate::{
  Error, Result,
  encode::{
    DOCUMENT_COLUMNS, RawDocument, encode_direction, encode_dt, encode_uuid,
    like_pattern,
  },
  notify::Notifier,
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A logbook backed by a single SQLite file.
///
/// Cloning is cheap; clones share the connection and the notification
/// channel.
#[derive(Clone)]
pub struct SqliteStore {
  conn:   tokio_rusqlite::Connection,
  zone:   OfficeZone,
  events: Notifier,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Self::init(conn).await
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Self::init(conn).await
  }

  async fn init(conn: tokio_rusqlite::Connection) -> Result<Self> {
    conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(Self {
      conn,
      zone: OfficeZone::default(),
      events: Notifier::new(),
    })
  }

  /// Use `zone` to stamp incoming documents that arrive without `sent_at`.
  pub fn with_zone(mut self, zone: OfficeZone) -> Self {
    self.zone = zone;
    self
  }

  /// Receive an event after every committed write.
  pub fn subscribe(&self) -> broadcast::Receiver<DocumentEvent> {
    self.events.subscribe()
  }

  /// Load a document or fail with `DocumentNotFound`.
  async fn load(&self, id: Uuid) -> Result<Document> {
    self
      .get_document(id)
      .await?
      .ok_or(Error::Core(logbook_core::Error::DocumentNotFound(id)))
  }

  async fn select(
    &self,
    where_clause: &'static str,
    params: Vec<Option<String>>,
  ) -> Result<Vec<Document>> {
    let raws: Vec<RawDocument> = self
      .conn
      .call(move |conn| {
        let sql = format!("SELECT {DOCUMENT_COLUMNS} FROM documents {where_clause}");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), RawDocument::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawDocument::into_document).collect()
  }

  /// Write the identifying and routing fields of `doc`.
  async fn write_fields(&self, doc: &Document) -> Result<()> {
    let id_str        = encode_uuid(doc.document_id);
    let dts_number    = doc.dts_number.clone();
    let document_type = doc.document_type.clone();
    let route         = doc.route.clone();
    let remarks       = doc.remarks.clone();
    let released_at   = doc.released_at.clone();
    let time          = doc.time.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE documents
             SET dts_number = ?2, document_type = ?3, route = ?4,
                 remarks = ?5, released_at = ?6, time = ?7
           WHERE document_id = ?1",
          rusqlite::params![
            id_str,
            dts_number,
            document_type,
            route,
            remarks,
            released_at,
            time,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Write the processing-day facet of `doc` in one statement.
  async fn write_processing(&self, doc: &Document) -> Result<()> {
    let id_str   = encode_uuid(doc.document_id);
    let deducted = i64::from(doc.deducted_days);
    let computed = doc.network_days.confirmed().map(i64::from);
    let remarks  = doc.network_days_remarks.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE documents
             SET deducted_days = ?2, computed_network_days = ?3,
                 network_days_remarks = ?4
           WHERE document_id = ?1",
          rusqlite::params![id_str, deducted, computed, remarks],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn write_archive(&self, doc: &Document) -> Result<()> {
    let id_str = encode_uuid(doc.document_id);
    let (at, by) = match &doc.archive {
      ArchiveStatus::Active => (None, None),
      ArchiveStatus::Archived { at, by } => (Some(encode_dt(*at)), Some(by.clone())),
    };

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE documents SET archived_at = ?2, archived_by = ?3
           WHERE document_id = ?1",
          rusqlite::params![id_str, at, by],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── DocumentStore impl ──────────────────────────────────────────────────────

impl DocumentStore for SqliteStore {
  type Error = Error;

  // ── Documents ─────────────────────────────────────────────────────────────

  async fn create_document(&self, input: NewDocument) -> Result<Document> {
    let doc = input.into_document(Uuid::new_v4(), self.zone.now())?;

    let id_str        = encode_uuid(doc.document_id);
    let direction     = encode_direction(doc.direction);
    let dts_number    = doc.dts_number.clone();
    let document_type = doc.document_type.clone();
    let route         = doc.route.clone();
    let remarks       = doc.remarks.clone();
    let sent_at       = format_storage(doc.sent_at);
    let released_at   = doc.released_at.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO documents (
             document_id, direction, dts_number, document_type, route,
             remarks, sent_at, released_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            id_str,
            direction,
            dts_number,
            document_type,
            route,
            remarks,
            sent_at,
            released_at,
          ],
        )?;
        Ok(())
      })
      .await?;

    tracing::debug!(
      document_id = %doc.document_id,
      direction = %doc.direction,
      dts_number = %doc.dts_number,
      "created document"
    );
    self.events.emit(doc.document_id, DocumentEventKind::Created);
    Ok(doc)
  }

  async fn get_document(&self, id: Uuid) -> Result<Option<Document>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawDocument> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {DOCUMENT_COLUMNS} FROM documents WHERE document_id = ?1"),
            rusqlite::params![id_str],
            RawDocument::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawDocument::into_document).transpose()
  }

  async fn list_documents(&self, query: &DocumentQuery) -> Result<Vec<Document>> {
    let direction = query.direction.map(|d| encode_direction(d).to_owned());
    let archived  = query.archived.map(|a| if a { "1" } else { "0" }.to_owned());
    let pattern   = query
      .text
      .as_deref()
      .map(str::trim)
      .filter(|t| !t.is_empty())
      .map(like_pattern);

    // LIKE is case-insensitive for ASCII, which covers DTS numbers.
    self
      .select(
        "WHERE (?1 IS NULL OR direction = ?1)
           AND (?2 IS NULL OR (archived_at IS NOT NULL) = CAST(?2 AS INTEGER))
           AND (?3 IS NULL OR dts_number LIKE ?3 ESCAPE '\\'
                           OR document_type LIKE ?3 ESCAPE '\\'
                           OR route LIKE ?3 ESCAPE '\\')
         ORDER BY CASE WHEN ?2 = '1' THEN archived_at END DESC, sent_at DESC",
        vec![direction, archived, pattern],
      )
      .await
  }

  async fn find_by_dts_number(&self, dts_number: &str) -> Result<Vec<Document>> {
    let dts = normalize_dts_number(dts_number);
    self
      .select("WHERE dts_number = ?1 ORDER BY sent_at DESC", vec![Some(dts)])
      .await
  }

  async fn edit_document(&self, id: Uuid, edit: DocumentEdit) -> Result<Document> {
    let current = self.load(id).await?;
    let next = edit.apply(&current)?;
    self.write_fields(&next).await?;

    tracing::debug!(document_id = %id, "edited document");
    self.events.emit(id, DocumentEventKind::Edited);
    Ok(next)
  }

  // ── Processing days ───────────────────────────────────────────────────────

  async fn apply_deduction(
    &self,
    id:            Uuid,
    deducted_days: u32,
    remarks:       String,
  ) -> Result<Document> {
    let current = self.load(id).await?;
    let next = processing::apply_deduction(&current, deducted_days, &remarks)?;
    self.write_processing(&next).await?;

    tracing::debug!(
      document_id = %id,
      deducted_days,
      confirmed = ?next.network_days.confirmed(),
      "confirmed processing days"
    );
    self.events.emit(id, DocumentEventKind::ProcessingDaysChanged);
    Ok(next)
  }

  async fn clear_deduction(&self, id: Uuid) -> Result<Document> {
    let current = self.load(id).await?;
    let next = processing::clear_deduction(&current);
    self.write_processing(&next).await?;

    tracing::debug!(document_id = %id, "cleared processing-day deduction");
    self.events.emit(id, DocumentEventKind::ProcessingDaysChanged);
    Ok(next)
  }

  // ── Archive lifecycle ─────────────────────────────────────────────────────

  async fn archive_document(&self, id: Uuid, by: Actor) -> Result<Document> {
    let current = self.load(id).await?;
    let next = lifecycle::archive(&current, &by, Utc::now())?;
    self.write_archive(&next).await?;

    tracing::debug!(document_id = %id, by = %by.name, "archived document");
    self.events.emit(id, DocumentEventKind::Archived);
    Ok(next)
  }

  async fn restore_document(&self, id: Uuid) -> Result<Document> {
    let current = self.load(id).await?;
    let next = lifecycle::restore(&current)?;
    self.write_archive(&next).await?;

    tracing::debug!(document_id = %id, "restored document");
    self.events.emit(id, DocumentEventKind::Restored);
    Ok(next)
  }

  async fn delete_document(&self, id: Uuid) -> Result<()> {
    let current = self.load(id).await?;
    lifecycle::ensure_deletable(&current)?;

    let id_str = encode_uuid(id);
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "DELETE FROM documents WHERE document_id = ?1 AND archived_at IS NOT NULL",
          rusqlite::params![id_str],
        )?;
        Ok(())
      })
      .await?;

    tracing::debug!(document_id = %id, "deleted document");
    self.events.emit(id, DocumentEventKind::Deleted);
    Ok(())
  }
}
