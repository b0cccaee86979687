//! Handler for `GET /health`.

use std::sync::Arc;

use axum::{Json, extract::State};
use roster_core::store::RecordStore;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
  pub status:   String,
  /// `"connected"` or `"disconnected"`.
  pub database: String,
}

/// `GET /health`. Always 200; the store probe is reported in the body.
pub async fn handler<S: RecordStore>(State(store): State<Arc<S>>) -> Json<HealthResponse> {
  let database = match store.ping().await {
    Ok(()) => "connected",
    Err(e) => {
      tracing::warn!(error = %e, "store ping failed");
      "disconnected"
    }
  };
  Json(HealthResponse {
    status:   "Server is running".into(),
    database: database.into(),
  })
}
