//! [`SqliteStore`]: the SQLite implementation of [`RecordStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use roster_core::{
  entity::{Entity, Record},
  store::RecordStore,
  user::{NewUser, StoredUser, User},
};

use crate::{
  encode::{
    RawRecord, RawUser, USER_COLUMNS, encode_body, encode_dt, encode_uuid,
    is_constraint_violation,
  },
  schema::SCHEMA,
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Roster record store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

fn duplicate<E: Entity>(value: Option<String>) -> Error {
  Error::Duplicate {
    field: E::UNIQUE.unwrap_or("id").to_owned(),
    value: value.unwrap_or_default(),
  }
}

// ─── RecordStore impl ────────────────────────────────────────────────────────

impl RecordStore for SqliteStore {
  type Error = Error;

  // ── Records ───────────────────────────────────────────────────────────────

  async fn list<E: Entity>(&self) -> Result<Vec<Record<E>>> {
    let collection = E::COLLECTION;

    let raws: Vec<RawRecord> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT record_id, body, created_at, updated_at
           FROM records
           WHERE collection = ?1
           ORDER BY seq",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![collection], RawRecord::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRecord::into_record).collect()
  }

  async fn get<E: Entity>(&self, id: Uuid) -> Result<Option<Record<E>>> {
    let collection = E::COLLECTION;
    let id_str = encode_uuid(id);

    let raw: Option<RawRecord> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT record_id, body, created_at, updated_at
             FROM records
             WHERE record_id = ?1 AND collection = ?2",
            rusqlite::params![id_str, collection],
            RawRecord::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawRecord::into_record).transpose()
  }

  async fn insert<E: Entity>(&self, entity: E) -> Result<Record<E>> {
    let record = Record::new(entity);

    let unique     = record.entity.unique_value();
    let unique_col = unique.clone();
    let id_str     = encode_uuid(record.id);
    let body       = encode_body(&record.entity)?;
    let created    = encode_dt(record.created_at);
    let updated    = encode_dt(record.updated_at);
    let collection = E::COLLECTION;

    let inserted = self
      .conn
      .call(move |conn| {
        let outcome = conn.execute(
          "INSERT INTO records (
             record_id, collection, unique_key, body, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id_str, collection, unique_col, body, created, updated],
        );
        match outcome {
          Ok(_) => Ok(true),
          Err(e) if is_constraint_violation(&e) => Ok(false),
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    if !inserted {
      return Err(duplicate::<E>(unique));
    }
    Ok(record)
  }

  async fn replace<E: Entity>(&self, id: Uuid, entity: E) -> Result<Option<Record<E>>> {
    let unique     = entity.unique_value();
    let unique_col = unique.clone();
    let id_str     = encode_uuid(id);
    let body       = encode_body(&entity)?;
    let updated    = encode_dt(Utc::now());
    let collection = E::COLLECTION;

    // `None` means the update hit a constraint.
    let changed: Option<usize> = self
      .conn
      .call(move |conn| {
        let outcome = conn.execute(
          "UPDATE records
           SET body = ?1, unique_key = ?2, updated_at = ?3
           WHERE record_id = ?4 AND collection = ?5",
          rusqlite::params![body, unique_col, updated, id_str, collection],
        );
        match outcome {
          Ok(n) => Ok(Some(n)),
          Err(e) if is_constraint_violation(&e) => Ok(None),
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    match changed {
      None => Err(duplicate::<E>(unique)),
      Some(0) => Ok(None),
      Some(_) => self.get::<E>(id).await,
    }
  }

  async fn delete<E: Entity>(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    let collection = E::COLLECTION;

    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM records WHERE record_id = ?1 AND collection = ?2",
          rusqlite::params![id_str, collection],
        )?)
      })
      .await?;

    Ok(removed > 0)
  }

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn add_user(&self, input: NewUser) -> Result<User> {
    let now = Utc::now();
    let user = User {
      id:                Uuid::new_v4(),
      full_name:         input.full_name,
      organization_name: input.organization_name,
      email:             input.email,
      mobile_no:         input.mobile_no,
      created_at:        now,
      updated_at:        now,
    };

    let id_str = encode_uuid(user.id);
    let email  = user.email.clone();
    let name   = user.full_name.clone();
    let org    = user.organization_name.clone();
    let mobile = user.mobile_no.clone();
    let hash   = input.password_hash;
    let at_str = encode_dt(now);

    let inserted = self
      .conn
      .call(move |conn| {
        let outcome = conn.execute(
          "INSERT INTO users (
             user_id, email, full_name, organization_name, mobile_no,
             password_hash, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
          rusqlite::params![id_str, email, name, org, mobile, hash, at_str],
        );
        match outcome {
          Ok(_) => Ok(true),
          Err(e) if is_constraint_violation(&e) => Ok(false),
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    if !inserted {
      return Err(Error::Duplicate { field: "email".into(), value: user.email });
    }
    Ok(user)
  }

  async fn find_user(&self, email: &str) -> Result<Option<StoredUser>> {
    let email = email.to_owned();

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
            rusqlite::params![email],
            RawUser::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawUser::into_stored_user).transpose()
  }

  async fn set_password_hash(&self, email: &str, password_hash: String) -> Result<bool> {
    let email  = email.to_owned();
    let at_str = encode_dt(Utc::now());

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE users SET password_hash = ?1, updated_at = ?2 WHERE email = ?3",
          rusqlite::params![password_hash, at_str, email],
        )?)
      })
      .await?;

    Ok(changed > 0)
  }

  // ── Health ────────────────────────────────────────────────────────────────

  async fn ping(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.query_row("SELECT 1", [], |_| Ok(()))?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}
