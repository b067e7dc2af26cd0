//! SQL schema for the Folio SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- Every entity lives here as a flat JSON field map.
CREATE TABLE IF NOT EXISTS records (
    collection  TEXT    NOT NULL,   -- 'documents' | 'services' | 'messages' | 'admin'
    record_id   TEXT    NOT NULL,
    created_at  INTEGER NOT NULL,   -- ms since epoch; mirrors body.createdAt
    body        TEXT    NOT NULL,
    PRIMARY KEY (collection, record_id)
);

-- A row here means the collection has been seeded or migrated and must not
-- be seeded again, even once it is empty.
CREATE TABLE IF NOT EXISTS collections (
    name            TEXT PRIMARY KEY,
    initialized_at  TEXT NOT NULL
);

-- Records that failed validation on read, moved out of `records`.
CREATE TABLE IF NOT EXISTS quarantine (
    quarantine_id   TEXT PRIMARY KEY,
    collection      TEXT NOT NULL,
    record_id       TEXT NOT NULL,
    body            TEXT NOT NULL,
    reason          TEXT NOT NULL,
    quarantined_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS records_created_idx ON records(collection, created_at);

PRAGMA user_version = 1;
";
