//! Archive, restore, and permanent-delete transitions.
//!
//! A document is `Active` until archived. Archived documents can be restored
//! or permanently deleted; active documents can be neither.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  document::{ArchiveStatus, Document},
};

/// Who is performing an operation. Passed explicitly with each call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
  pub name: String,
}

impl Actor {
  pub fn new(name: impl Into<String>) -> Self { Self { name: name.into() } }
}

pub fn archive(doc: &Document, by: &Actor, at: DateTime<Utc>) -> Result<Document> {
  if doc.is_archived() {
    return Err(Error::AlreadyArchived(doc.document_id));
  }
  Ok(Document {
    archive: ArchiveStatus::Archived { at, by: by.name.clone() },
    ..doc.clone()
  })
}

pub fn restore(doc: &Document) -> Result<Document> {
  if !doc.is_archived() {
    return Err(Error::NotArchived(doc.document_id));
  }
  Ok(Document { archive: ArchiveStatus::Active, ..doc.clone() })
}

/// Check that `doc` may be permanently deleted.
pub fn ensure_deletable(doc: &Document) -> Result<()> {
  if doc.is_archived() {
    Ok(())
  } else {
    Err(Error::NotArchived(doc.document_id))
  }
}
