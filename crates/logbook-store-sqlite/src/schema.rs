//! SQL schema for the logbook SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS documents (
    document_id           TEXT PRIMARY KEY,
    direction             TEXT NOT NULL,   -- 'incoming' | 'outgoing'
    dts_number            TEXT NOT NULL,   -- normalised; not unique
    document_type         TEXT NOT NULL,
    route                 TEXT NOT NULL DEFAULT '',
    remarks               TEXT,
    sent_at               TEXT NOT NULL,   -- 'YYYY-MM-DD HH:MM:SS', office wall clock
    released_at           TEXT,            -- display string, e.g. 'June 6, 2025 at 10:00 AM'
    time                  TEXT,
    deducted_days         INTEGER NOT NULL DEFAULT 0,
    computed_network_days INTEGER,         -- NULL while derived
    network_days_remarks  TEXT NOT NULL DEFAULT '',
    archived_at           TEXT,            -- RFC 3339 UTC; NULL while active
    archived_by           TEXT,
    CHECK (direction IN ('incoming', 'outgoing')),
    CHECK (deducted_days >= 0),
    CHECK ((archived_at IS NULL) = (archived_by IS NULL))
);

CREATE INDEX IF NOT EXISTS documents_dts_idx      ON documents(dts_number);
CREATE INDEX IF NOT EXISTS documents_sent_idx     ON documents(sent_at);
CREATE INDEX IF NOT EXISTS documents_archived_idx ON documents(archived_at);

PRAGMA user_version = 1;
";
