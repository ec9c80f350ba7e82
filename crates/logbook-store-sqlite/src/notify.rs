//! Change notifications for subscribers of a [`SqliteStore`](crate::SqliteStore).

use logbook_core::events::{DocumentEvent, DocumentEventKind};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Capacity of the change-notification channel. Subscribers that fall this
/// far behind receive `RecvError::Lagged` and should re-fetch.
pub const EVENT_BUFFER: usize = 256;

#[derive(Clone)]
pub struct Notifier {
  sender: broadcast::Sender<DocumentEvent>,
}

impl Notifier {
  pub fn new() -> Self {
    let (sender, _) = broadcast::channel(EVENT_BUFFER);
    Self { sender }
  }

  pub fn subscribe(&self) -> broadcast::Receiver<DocumentEvent> {
    self.sender.subscribe()
  }

  /// Announce a committed write. Never blocks; having no subscribers is fine.
  pub fn emit(&self, document_id: Uuid, kind: DocumentEventKind) {
    let _ = self.sender.send(DocumentEvent { document_id, kind });
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn emit_without_subscribers_is_silent() {
    Notifier::new().emit(Uuid::new_v4(), DocumentEventKind::Created);
  }

  #[test]
  fn every_subscriber_sees_the_event() {
    let notifier = Notifier::new();
    let mut a = notifier.subscribe();
    let mut b = notifier.subscribe();
    let id = Uuid::new_v4();
    notifier.emit(id, DocumentEventKind::Archived);

    for rx in [&mut a, &mut b] {
      let event = rx.try_recv().unwrap();
      assert_eq!(event.document_id, id);
      assert_eq!(event.kind, DocumentEventKind::Archived);
    }
  }
}
