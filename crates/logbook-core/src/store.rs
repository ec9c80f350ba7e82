//! The `DocumentStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g.
//! `logbook-store-sqlite`). The CLI depends on this abstraction, not on any
//! concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  document::{Direction, Document, DocumentEdit, NewDocument},
  lifecycle::Actor,
};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Parameters for [`DocumentStore::list_documents`].
#[derive(Debug, Clone, Default)]
pub struct DocumentQuery {
  pub direction: Option<Direction>,
  /// `Some(false)` for live documents only, `Some(true)` for the archive,
  /// `None` for both.
  pub archived:  Option<bool>,
  /// Case-insensitive substring over DTS number, document type, and route.
  pub text:      Option<String>,
}

impl DocumentQuery {
  pub fn live(direction: Direction) -> Self {
    Self {
      direction: Some(direction),
      archived: Some(false),
      text: None,
    }
  }

  pub fn archived() -> Self {
    Self { archived: Some(true), ..Self::default() }
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a logbook storage backend.
///
/// Every mutation is validated by the functions in [`crate::document`],
/// [`crate::processing`], and [`crate::lifecycle`] before it is persisted, and
/// each one writes the whole changed facet in a single statement.
pub trait DocumentStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Documents ─────────────────────────────────────────────────────────

  /// Validate, normalise, and persist a new document.
  fn create_document(
    &self,
    input: NewDocument,
  ) -> impl Future<Output = Result<Document, Self::Error>> + Send + '_;

  /// Retrieve a document by UUID. Returns `None` if not found.
  fn get_document(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Document>, Self::Error>> + Send + '_;

  /// Documents matching `query`, newest `sent_at` first. Archived documents
  /// are ordered by when they were archived, newest first.
  fn list_documents<'a>(
    &'a self,
    query: &'a DocumentQuery,
  ) -> impl Future<Output = Result<Vec<Document>, Self::Error>> + Send + 'a;

  /// All documents carrying `dts_number` after normalisation. DTS numbers
  /// are not unique, so this can return several.
  fn find_by_dts_number<'a>(
    &'a self,
    dts_number: &'a str,
  ) -> impl Future<Output = Result<Vec<Document>, Self::Error>> + Send + 'a;

  fn edit_document(
    &self,
    id: Uuid,
    edit: DocumentEdit,
  ) -> impl Future<Output = Result<Document, Self::Error>> + Send + '_;

  // ── Processing days ───────────────────────────────────────────────────

  /// Confirm a processing-day value; see
  /// [`crate::processing::apply_deduction`].
  fn apply_deduction(
    &self,
    id: Uuid,
    deducted_days: u32,
    remarks: String,
  ) -> impl Future<Output = Result<Document, Self::Error>> + Send + '_;

  /// Return a document to the derived processing-day path.
  fn clear_deduction(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Document, Self::Error>> + Send + '_;

  // ── Archive lifecycle ─────────────────────────────────────────────────

  fn archive_document(
    &self,
    id: Uuid,
    by: Actor,
  ) -> impl Future<Output = Result<Document, Self::Error>> + Send + '_;

  fn restore_document(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Document, Self::Error>> + Send + '_;

  /// Permanently delete an archived document.
  fn delete_document(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
