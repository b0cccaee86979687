//! Generic CRUD handlers, instantiated once per [`Entity`].
//!
//! | Method   | Path                | Notes |
//! |----------|---------------------|-------|
//! | `GET`    | `/<resource>`       | Whole collection, insertion order |
//! | `POST`   | `/<resource>`       | Full record; returns 201 + stored record |
//! | `GET`    | `/<resource>/:id`   | 404 if not found |
//! | `PUT`    | `/<resource>/:id`   | Partial update; merged over the stored record |
//! | `DELETE` | `/<resource>/:id`   | 404 if not found |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State, rejection::JsonRejection},
  http::StatusCode,
  response::IntoResponse,
};
use roster_core::{
  entity::{Entity, Record},
  store::RecordStore,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::ApiError;

/// A JSON body whose decoding failure is reported in our own error shape.
type Body = Result<Json<Value>, JsonRejection>;

/// Response body for successful deletes.
#[derive(Debug, Serialize, Deserialize)]
pub struct Message {
  pub message: String,
}

fn not_found<E: Entity>() -> ApiError {
  ApiError::NotFound(format!("{} not found", E::title()))
}

/// Ids that are not UUIDs cannot name a record, so they are simply absent.
fn parse_id<E: Entity>(raw: &str) -> Result<Uuid, ApiError> {
  Uuid::parse_str(raw).map_err(|_| not_found::<E>())
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /<resource>`
pub async fn list<S, E>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<Record<E>>>, ApiError>
where
  S: RecordStore,
  E: Entity,
{
  let records = store
    .list::<E>()
    .await
    .map_err(ApiError::store(format!("Error fetching {}", E::COLLECTION)))?;
  Ok(Json(records))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /<resource>/:id`
pub async fn get_one<S, E>(
  State(store): State<Arc<S>>,
  Path(id): Path<String>,
) -> Result<Json<Record<E>>, ApiError>
where
  S: RecordStore,
  E: Entity,
{
  let id = parse_id::<E>(&id)?;
  let record = store
    .get::<E>(id)
    .await
    .map_err(ApiError::store(format!("Error fetching {}", E::LABEL)))?
    .ok_or_else(not_found::<E>)?;
  Ok(Json(record))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /<resource>`, answering 201 with the stored record.
pub async fn create<S, E>(
  State(store): State<Arc<S>>,
  body: Body,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecordStore,
  E: Entity,
{
  let Json(body) = body?;
  let entity = E::from_json(body)?;
  entity.validate()?;

  let record = store
    .insert(entity)
    .await
    .map_err(ApiError::store(format!("Error creating {}", E::LABEL)))?;

  tracing::info!(collection = E::COLLECTION, id = %record.id, "record created");
  Ok((StatusCode::CREATED, Json(record)))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PUT /<resource>/:id`. The body holds any subset of the entity's fields.
pub async fn update<S, E>(
  State(store): State<Arc<S>>,
  Path(id): Path<String>,
  body: Body,
) -> Result<Json<Record<E>>, ApiError>
where
  S: RecordStore,
  E: Entity,
{
  let id = parse_id::<E>(&id)?;
  let Json(body) = body?;
  let Value::Object(patch) = body else {
    return Err(roster_core::Error::NotAnObject.into());
  };

  let context = format!("Error updating {}", E::LABEL);
  let existing = store
    .get::<E>(id)
    .await
    .map_err(ApiError::store(context.clone()))?
    .ok_or_else(not_found::<E>)?;

  let merged = existing.merged(&patch)?;
  merged.validate()?;

  let record = store
    .replace(id, merged)
    .await
    .map_err(ApiError::store(context))?
    .ok_or_else(not_found::<E>)?;

  tracing::info!(collection = E::COLLECTION, id = %record.id, "record updated");
  Ok(Json(record))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /<resource>/:id`
pub async fn remove<S, E>(
  State(store): State<Arc<S>>,
  Path(id): Path<String>,
) -> Result<Json<Message>, ApiError>
where
  S: RecordStore,
  E: Entity,
{
  let id = parse_id::<E>(&id)?;
  let removed = store
    .delete::<E>(id)
    .await
    .map_err(ApiError::store(format!("Error deleting {}", E::LABEL)))?;
  if !removed {
    return Err(not_found::<E>());
  }

  tracing::info!(collection = E::COLLECTION, %id, "record deleted");
  Ok(Json(Message { message: format!("{} deleted", E::title()) }))
}
