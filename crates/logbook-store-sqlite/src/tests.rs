//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{NaiveDate, NaiveDateTime};
use logbook_core::{
  document::{
    Direction, DocumentEdit, IncomingEdit, NetworkDays, NewDocument, NewIncoming,
    NewOutgoing, RoutingEdit,
  },
  error::ValidationError,
  events::DocumentEventKind,
  lifecycle::Actor,
  processing::{ProcessingDays, resolve_processing_days},
  store::{DocumentQuery, DocumentStore},
};
use uuid::Uuid;

use crate::{
  Error, SqliteStore,
  encode::{decode_direction, encode_direction},
};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
  NaiveDate::from_ymd_opt(y, m, d)
    .unwrap()
    .and_hms_opt(h, 0, 0)
    .unwrap()
}

fn outgoing(dts: &str, sent_at: NaiveDateTime, released_at: &str) -> NewDocument {
  NewDocument::Outgoing(NewOutgoing {
    dts_number: dts.into(),
    document_type: "Purchase Request".into(),
    route: "ORD".into(),
    remarks: None,
    sent_at,
    released_at: released_at.into(),
  })
}

fn incoming(dts: &str, sent_at: Option<NaiveDateTime>) -> NewDocument {
  NewDocument::Incoming(NewIncoming {
    dts_number: dts.into(),
    document_type: "Memo".into(),
    sent_at,
  })
}

fn is_core(err: &Error, pred: impl Fn(&logbook_core::Error) -> bool) -> bool {
  matches!(err, Error::Core(e) if pred(e))
}

// ─── Create & read ───────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_outgoing() {
  let s = store().await;
  let doc = s
    .create_document(outgoing("dts-001", at(2025, 6, 2, 9), "june 6, 2025 at 10:00 am"))
    .await
    .unwrap();

  let fetched = s.get_document(doc.document_id).await.unwrap().unwrap();
  assert_eq!(fetched, doc);
  assert_eq!(fetched.dts_number, "DTS001");
  assert_eq!(fetched.released_at.as_deref(), Some("June 6, 2025 at 10:00 AM"));
  assert_eq!(resolve_processing_days(&fetched), ProcessingDays::Derived(5));
}

#[tokio::test]
async fn get_document_missing_returns_none() {
  let s = store().await;
  assert!(s.get_document(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn incoming_without_sent_at_is_stamped_and_unset() {
  let s = store().await;
  let doc = s.create_document(incoming("in-1", None)).await.unwrap();
  assert_eq!(doc.direction, Direction::Incoming);
  assert_eq!(doc.released_at, None);
  assert_eq!(resolve_processing_days(&doc), ProcessingDays::Unset);

  let fetched = s.get_document(doc.document_id).await.unwrap().unwrap();
  assert_eq!(fetched.sent_at, doc.sent_at);
}

#[tokio::test]
async fn invalid_input_is_not_persisted() {
  let s = store().await;
  let err = s
    .create_document(outgoing("x1", at(2025, 6, 2, 9), "February 30, 2025 at 9:00 AM"))
    .await
    .unwrap_err();
  assert!(is_core(&err, |e| matches!(e, logbook_core::Error::Validation(_))));
  assert!(s.list_documents(&DocumentQuery::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn sent_year_past_9999_is_rejected_and_listing_still_works() {
  let s = store().await;
  s.create_document(incoming("ok-1", Some(at(2025, 6, 3, 8))))
    .await
    .unwrap();

  let err = s
    .create_document(incoming("far-1", Some(at(10000, 1, 3, 9))))
    .await
    .unwrap_err();
  assert!(is_core(&err, |e| matches!(
    e,
    logbook_core::Error::Validation(ValidationError::SentYearOutOfRange(10000))
  )));

  let all = s.list_documents(&DocumentQuery::default()).await.unwrap();
  assert_eq!(all.len(), 1);
  assert_eq!(all[0].dts_number, "OK1");
}

#[test]
fn direction_column_values() {
  assert_eq!(encode_direction(Direction::Incoming), "incoming");
  assert_eq!(encode_direction(Direction::Outgoing), "outgoing");
  assert_eq!(decode_direction("outgoing").unwrap(), Direction::Outgoing);
  assert!(decode_direction("sideways").is_err());
}

// ─── Listing ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn list_filters_by_direction_and_orders_newest_first() {
  let s = store().await;
  s.create_document(outgoing("A1", at(2025, 6, 2, 9), "June 6, 2025 at 10:00 AM"))
    .await
    .unwrap();
  s.create_document(outgoing("A2", at(2025, 6, 4, 9), "June 6, 2025 at 10:00 AM"))
    .await
    .unwrap();
  s.create_document(incoming("B1", Some(at(2025, 6, 3, 8))))
    .await
    .unwrap();

  let out = s
    .list_documents(&DocumentQuery::live(Direction::Outgoing))
    .await
    .unwrap();
  let dts: Vec<&str> = out.iter().map(|d| d.dts_number.as_str()).collect();
  assert_eq!(dts, ["A2", "A1"]);

  let all = s.list_documents(&DocumentQuery::default()).await.unwrap();
  assert_eq!(all.len(), 3);
}

#[tokio::test]
async fn list_text_search_is_case_insensitive() {
  let s = store().await;
  s.create_document(outgoing("ABC123", at(2025, 6, 2, 9), "June 6, 2025 at 10:00 AM"))
    .await
    .unwrap();
  s.create_document(incoming("XYZ9", Some(at(2025, 6, 3, 8))))
    .await
    .unwrap();

  let query = DocumentQuery {
    text: Some("abc".into()),
    ..DocumentQuery::default()
  };
  let hits = s.list_documents(&query).await.unwrap();
  assert_eq!(hits.len(), 1);
  assert_eq!(hits[0].dts_number, "ABC123");

  let query = DocumentQuery {
    text: Some("memo".into()),
    ..DocumentQuery::default()
  };
  assert_eq!(s.list_documents(&query).await.unwrap().len(), 1);
}

#[tokio::test]
async fn list_text_search_matches_wildcards_literally() {
  let s = store().await;
  for document_type in ["50% Advance", "500 Advance", "Form A_B", "Form AXB"] {
    s.create_document(NewDocument::Incoming(NewIncoming {
      dts_number: "F1".into(),
      document_type: document_type.into(),
      sent_at: Some(at(2025, 6, 3, 8)),
    }))
    .await
    .unwrap();
  }

  let types = |text: &str| {
    let query = DocumentQuery {
      text: Some(text.into()),
      ..DocumentQuery::default()
    };
    let s = s.clone();
    async move {
      s.list_documents(&query)
        .await
        .unwrap()
        .into_iter()
        .map(|d| d.document_type)
        .collect::<Vec<_>>()
    }
  };
  assert_eq!(types("50%").await, ["50% Advance"]);
  assert_eq!(types("a_b").await, ["Form A_B"]);
  assert!(types("\\").await.is_empty());
}

#[tokio::test]
async fn find_by_dts_number_normalises_and_returns_duplicates() {
  let s = store().await;
  s.create_document(incoming("dup-1", Some(at(2025, 6, 2, 8))))
    .await
    .unwrap();
  s.create_document(incoming("DUP1", Some(at(2025, 6, 3, 8))))
    .await
    .unwrap();

  let found = s.find_by_dts_number("d-u-p 1").await.unwrap();
  assert_eq!(found.len(), 2);
  assert!(found[0].sent_at > found[1].sent_at);
}

// ─── Edits ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn routing_edit_persists_and_keeps_processing_facet() {
  let s = store().await;
  let doc = s
    .create_document(outgoing("A1", at(2025, 6, 2, 9), "June 6, 2025 at 10:00 AM"))
    .await
    .unwrap();
  s.apply_deduction(doc.document_id, 1, "holiday".into())
    .await
    .unwrap();

  let edited = s
    .edit_document(
      doc.document_id,
      DocumentEdit::Routing(RoutingEdit {
        dts_number:    "A1".into(),
        document_type: "Voucher".into(),
        route:         "Accounting_Unit".into(),
        remarks:       Some("signed".into()),
        time:          Some("4:00 PM".into()),
        released_at:   Some("June 9, 2025 at 8:00 AM".into()),
      }),
    )
    .await
    .unwrap();

  let fetched = s.get_document(doc.document_id).await.unwrap().unwrap();
  assert_eq!(fetched, edited);
  assert_eq!(fetched.route, "Accounting_Unit");
  assert_eq!(fetched.released_at.as_deref(), Some("June 9, 2025 at 8:00 AM"));
  // The confirmed value survives an edit of the timestamps.
  assert_eq!(fetched.network_days, NetworkDays::Confirmed(4));
}

#[tokio::test]
async fn incoming_edit_and_time_quick_edit() {
  let s = store().await;
  let doc = s.create_document(incoming("in-1", None)).await.unwrap();

  s.edit_document(
    doc.document_id,
    DocumentEdit::Incoming(IncomingEdit {
      dts_number:    "in-2".into(),
      document_type: "Letter".into(),
    }),
  )
  .await
  .unwrap();
  let edited = s
    .edit_document(doc.document_id, DocumentEdit::Time { time: Some("9:15 AM".into()) })
    .await
    .unwrap();
  assert_eq!(edited.dts_number, "IN2");
  assert_eq!(edited.time.as_deref(), Some("9:15 AM"));

  let cleared = s
    .edit_document(doc.document_id, DocumentEdit::Time { time: Some("-".into()) })
    .await
    .unwrap();
  assert_eq!(cleared.time, None);
  let fetched = s.get_document(doc.document_id).await.unwrap().unwrap();
  assert_eq!(fetched.time, None);
}

#[tokio::test]
async fn routing_edit_on_incoming_is_rejected() {
  let s = store().await;
  let doc = s.create_document(incoming("in-1", None)).await.unwrap();

  let err = s
    .edit_document(
      doc.document_id,
      DocumentEdit::Routing(RoutingEdit {
        dts_number:    "in-1".into(),
        document_type: "Memo".into(),
        route:         "ORD".into(),
        remarks:       None,
        time:          None,
        released_at:   Some("June 6, 2025 at 10:00 AM".into()),
      }),
    )
    .await
    .unwrap_err();
  assert!(is_core(&err, |e| matches!(
    e,
    logbook_core::Error::Validation(ValidationError::WrongDirection(Direction::Incoming))
  )));

  let fetched = s.get_document(doc.document_id).await.unwrap().unwrap();
  assert_eq!(fetched, doc);
  assert!(fetched.route.is_empty());

  let err = s
    .apply_deduction(doc.document_id, 1, "x".into())
    .await
    .unwrap_err();
  assert!(is_core(&err, |e| matches!(
    e,
    logbook_core::Error::Validation(ValidationError::NotReleased)
  )));
  let fetched = s.get_document(doc.document_id).await.unwrap().unwrap();
  assert_eq!(fetched.network_days, NetworkDays::Derived);
}

#[tokio::test]
async fn incoming_edit_on_outgoing_is_rejected() {
  let s = store().await;
  let doc = s
    .create_document(outgoing("A1", at(2025, 6, 2, 9), "June 6, 2025 at 10:00 AM"))
    .await
    .unwrap();

  let err = s
    .edit_document(
      doc.document_id,
      DocumentEdit::Incoming(IncomingEdit {
        dts_number:    "A2".into(),
        document_type: "Memo".into(),
      }),
    )
    .await
    .unwrap_err();
  assert!(is_core(&err, |e| matches!(
    e,
    logbook_core::Error::Validation(ValidationError::WrongDirection(Direction::Outgoing))
  )));
  assert_eq!(s.get_document(doc.document_id).await.unwrap().unwrap(), doc);
}

#[tokio::test]
async fn edit_missing_document_fails() {
  let s = store().await;
  let err = s
    .edit_document(Uuid::new_v4(), DocumentEdit::Time { time: None })
    .await
    .unwrap_err();
  assert!(is_core(&err, |e| matches!(e, logbook_core::Error::DocumentNotFound(_))));
}

// ─── Processing days ─────────────────────────────────────────────────────────

#[tokio::test]
async fn deduction_round_trips_through_storage() {
  let s = store().await;
  let doc = s
    .create_document(outgoing("A1", at(2025, 6, 2, 9), "June 6, 2025 at 10:00 AM"))
    .await
    .unwrap();

  s.apply_deduction(doc.document_id, 2, "courier delay".into())
    .await
    .unwrap();
  let fetched = s.get_document(doc.document_id).await.unwrap().unwrap();
  assert_eq!(fetched.deducted_days, 2);
  assert_eq!(fetched.network_days, NetworkDays::Confirmed(3));
  assert_eq!(fetched.network_days_remarks, "courier delay");
  assert_eq!(resolve_processing_days(&fetched), ProcessingDays::Confirmed(3));

  s.clear_deduction(doc.document_id).await.unwrap();
  let fetched = s.get_document(doc.document_id).await.unwrap().unwrap();
  assert_eq!(fetched.deducted_days, 0);
  assert_eq!(fetched.network_days, NetworkDays::Derived);
  assert_eq!(resolve_processing_days(&fetched), ProcessingDays::Derived(5));
}

#[tokio::test]
async fn rejected_deduction_leaves_row_untouched() {
  let s = store().await;
  let doc = s
    .create_document(outgoing("A1", at(2025, 6, 2, 9), "June 6, 2025 at 10:00 AM"))
    .await
    .unwrap();

  let err = s
    .apply_deduction(doc.document_id, 5, "too much".into())
    .await
    .unwrap_err();
  assert!(err.to_string().contains("cannot be zero"));

  let fetched = s.get_document(doc.document_id).await.unwrap().unwrap();
  assert_eq!(fetched, doc);
}

// ─── Archive lifecycle ───────────────────────────────────────────────────────

#[tokio::test]
async fn archive_restore_and_delete() {
  let s = store().await;
  let doc = s.create_document(incoming("in-1", None)).await.unwrap();

  let err = s.delete_document(doc.document_id).await.unwrap_err();
  assert!(is_core(&err, |e| matches!(e, logbook_core::Error::NotArchived(_))));

  let archived = s
    .archive_document(doc.document_id, Actor::new("records"))
    .await
    .unwrap();
  assert!(archived.is_archived());

  let live = s
    .list_documents(&DocumentQuery::live(Direction::Incoming))
    .await
    .unwrap();
  assert!(live.is_empty());
  let archive = s.list_documents(&DocumentQuery::archived()).await.unwrap();
  assert_eq!(archive.len(), 1);
  assert_eq!(archive[0].archive, archived.archive);

  let restored = s.restore_document(doc.document_id).await.unwrap();
  assert!(!restored.is_archived());

  s.archive_document(doc.document_id, Actor::new("records"))
    .await
    .unwrap();
  s.delete_document(doc.document_id).await.unwrap();
  assert!(s.get_document(doc.document_id).await.unwrap().is_none());
}

#[tokio::test]
async fn archive_twice_fails() {
  let s = store().await;
  let doc = s.create_document(incoming("in-1", None)).await.unwrap();
  s.archive_document(doc.document_id, Actor::new("a"))
    .await
    .unwrap();
  let err = s
    .archive_document(doc.document_id, Actor::new("a"))
    .await
    .unwrap_err();
  assert!(is_core(&err, |e| matches!(e, logbook_core::Error::AlreadyArchived(_))));
}

// ─── Notifications ───────────────────────────────────────────────────────────

#[tokio::test]
async fn writes_are_announced_in_order() {
  let s = store().await;
  let mut rx = s.subscribe();

  let doc = s.create_document(incoming("in-1", None)).await.unwrap();
  s.archive_document(doc.document_id, Actor::new("a"))
    .await
    .unwrap();
  s.delete_document(doc.document_id).await.unwrap();

  let kinds: Vec<DocumentEventKind> = (0..3)
    .map(|_| rx.try_recv().unwrap())
    .inspect(|e| assert_eq!(e.document_id, doc.document_id))
    .map(|e| e.kind)
    .collect();
  assert_eq!(
    kinds,
    [
      DocumentEventKind::Created,
      DocumentEventKind::Archived,
      DocumentEventKind::Deleted,
    ]
  );
  assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn failed_writes_are_not_announced() {
  let s = store().await;
  let doc = s.create_document(incoming("in-1", None)).await.unwrap();
  let mut rx = s.subscribe();

  assert!(s.restore_document(doc.document_id).await.is_err());
  assert!(rx.try_recv().is_err());
}
