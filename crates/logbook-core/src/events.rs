//! Change notifications emitted after a successful write.
//!
//! Subscribers treat every event as "data changed, re-fetch"; the payload
//! only says which document and what kind of write.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentEventKind {
  Created,
  Edited,
  ProcessingDaysChanged,
  Archived,
  Restored,
  Deleted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentEvent {
  pub document_id: Uuid,
  pub kind:        DocumentEventKind,
}
