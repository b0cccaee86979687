//! SQL schema for the Roster SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per entity record. `body` holds the entity's JSON fields; the
-- envelope (id, timestamps) lives in columns.
CREATE TABLE IF NOT EXISTS records (
    seq         INTEGER PRIMARY KEY AUTOINCREMENT,   -- insertion order
    record_id   TEXT    NOT NULL UNIQUE,
    collection  TEXT    NOT NULL,
    unique_key  TEXT,                                -- value of Entity::UNIQUE
    body        TEXT    NOT NULL,
    created_at  TEXT    NOT NULL,                    -- ISO 8601 UTC
    updated_at  TEXT    NOT NULL,
    UNIQUE (collection, unique_key)
);

CREATE INDEX IF NOT EXISTS records_collection_idx ON records(collection, seq);

CREATE TABLE IF NOT EXISTS users (
    user_id           TEXT PRIMARY KEY,
    email             TEXT NOT NULL UNIQUE,          -- lowercased
    full_name         TEXT NOT NULL,
    organization_name TEXT NOT NULL,
    mobile_no         TEXT NOT NULL,
    password_hash     TEXT NOT NULL,                 -- argon2 PHC string
    created_at        TEXT NOT NULL,
    updated_at        TEXT NOT NULL
);

PRAGMA user_version = 1;
";
