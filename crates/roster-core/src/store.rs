//! The `RecordStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `roster-store-sqlite`).
//! Higher layers (`roster-api`, `roster-server`) depend on this abstraction,
//! not on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  entity::{Entity, Record},
  user::{NewUser, StoredUser, User},
};

/// Error type returned by a [`RecordStore`].
///
/// Backends enforce uniqueness themselves; callers need to tell those
/// violations apart from storage failures.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  /// `true` if the operation collided with a uniqueness constraint.
  fn is_conflict(&self) -> bool;
}

/// Abstraction over a Roster record store backend.
///
/// Each entity type lives in its own collection; no operation spans
/// collections and none is transactional across records.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait RecordStore: Send + Sync {
  type Error: StoreError;

  // ── Records ───────────────────────────────────────────────────────────

  /// Every record of `E`, in insertion order.
  fn list<E: Entity>(
    &self,
  ) -> impl Future<Output = Result<Vec<Record<E>>, Self::Error>> + Send + '_;

  /// Retrieve a record by id. Returns `None` if not found.
  fn get<E: Entity>(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Record<E>>, Self::Error>> + Send + '_;

  /// Persist a new record. The id and timestamps are assigned by the store.
  ///
  /// Returns a conflict error if `E::UNIQUE` collides with an existing record.
  fn insert<E: Entity>(
    &self,
    entity: E,
  ) -> impl Future<Output = Result<Record<E>, Self::Error>> + Send + '_;

  /// Overwrite the fields of an existing record and bump `updated_at`.
  /// Returns `None` if `id` does not exist.
  fn replace<E: Entity>(
    &self,
    id: Uuid,
    entity: E,
  ) -> impl Future<Output = Result<Option<Record<E>>, Self::Error>> + Send + '_;

  /// Remove a record. Returns `false` if `id` did not exist.
  fn delete<E: Entity>(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Create an account. Returns a conflict error if the email is taken.
  fn add_user(
    &self,
    user: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  /// Look up an account by (normalised) email.
  fn find_user<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<StoredUser>, Self::Error>> + Send + 'a;

  /// Replace an account's password hash. Returns `false` if no such account.
  fn set_password_hash<'a>(
    &'a self,
    email: &'a str,
    password_hash: String,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  // ── Health ────────────────────────────────────────────────────────────

  /// Round-trip a trivial query to confirm the backend is reachable.
  fn ping(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
