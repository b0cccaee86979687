//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. Entity bodies are stored as
//! compact JSON. UUIDs are stored as hyphenated lowercase strings.

use chrono::{DateTime, Utc};
use roster_core::{
  entity::{Entity, Record},
  user::{StoredUser, User},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Entity body ─────────────────────────────────────────────────────────────

pub fn encode_body<E: Entity>(entity: &E) -> Result<String> {
  Ok(serde_json::to_string(entity)?)
}

pub fn decode_body<E: Entity>(s: &str) -> Result<E> { Ok(serde_json::from_str(s)?) }

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `records` row.
pub struct RawRecord {
  pub record_id:  String,
  pub body:       String,
  pub created_at: String,
  pub updated_at: String,
}

impl RawRecord {
  /// Column order: `record_id, body, created_at, updated_at`.
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      record_id:  row.get(0)?,
      body:       row.get(1)?,
      created_at: row.get(2)?,
      updated_at: row.get(3)?,
    })
  }

  pub fn into_record<E: Entity>(self) -> Result<Record<E>> {
    Ok(Record {
      id:         decode_uuid(&self.record_id)?,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
      entity:     decode_body(&self.body)?,
    })
  }
}

/// Raw strings read directly from a `users` row.
pub struct RawUser {
  pub user_id:           String,
  pub email:             String,
  pub full_name:         String,
  pub organization_name: String,
  pub mobile_no:         String,
  pub password_hash:     String,
  pub created_at:        String,
  pub updated_at:        String,
}

impl RawUser {
  /// Column order matches [`USER_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:           row.get(0)?,
      email:             row.get(1)?,
      full_name:         row.get(2)?,
      organization_name: row.get(3)?,
      mobile_no:         row.get(4)?,
      password_hash:     row.get(5)?,
      created_at:        row.get(6)?,
      updated_at:        row.get(7)?,
    })
  }

  pub fn into_stored_user(self) -> Result<StoredUser> {
    Ok(StoredUser {
      user:          User {
        id:                decode_uuid(&self.user_id)?,
        full_name:         self.full_name,
        organization_name: self.organization_name,
        email:             self.email,
        mobile_no:         self.mobile_no,
        created_at:        decode_dt(&self.created_at)?,
        updated_at:        decode_dt(&self.updated_at)?,
      },
      password_hash: self.password_hash,
    })
  }
}

pub const USER_COLUMNS: &str = "user_id, email, full_name, organization_name, mobile_no, \
                                password_hash, created_at, updated_at";

/// `true` if a statement failed on a UNIQUE (or other) constraint.
pub fn is_constraint_violation(e: &rusqlite::Error) -> bool {
  matches!(
    e,
    rusqlite::Error::SqliteFailure(f, _) if f.code == rusqlite::ErrorCode::ConstraintViolation
  )
}
