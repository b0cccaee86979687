//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every error renders as `{"error": "...", "details"?: "..."}`.

use axum::{
  Json,
  extract::rejection::JsonRejection,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use roster_core::store::StoreError;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  /// Missing or malformed input, caught before any store call.
  #[error("{message}")]
  Validation {
    message: String,
    details: Option<String>,
  },

  /// A uniqueness violation. Reported with 400 like validation, but kept
  /// distinct so callers and logs can tell them apart.
  #[error("{0}")]
  Conflict(String),

  #[error("{0}")]
  Unauthorized(String),

  #[error("{0}")]
  NotFound(String),

  #[error("Method not allowed")]
  MethodNotAllowed,

  #[error("{context}: {source}")]
  Store {
    context: String,
    #[source]
    source:  Box<dyn std::error::Error + Send + Sync>,
  },

  #[error("{0}")]
  Internal(String),
}

impl ApiError {
  pub fn validation(message: impl Into<String>) -> Self {
    Self::Validation { message: message.into(), details: None }
  }

  /// Adapter for `map_err`: conflicts keep their message, anything else
  /// becomes a 500 carrying `context` and the underlying error text.
  pub fn store<E: StoreError>(context: impl Into<String>) -> impl FnOnce(E) -> Self {
    let context = context.into();
    move |e| {
      if e.is_conflict() {
        Self::Conflict(e.to_string())
      } else {
        Self::Store { context, source: Box::new(e) }
      }
    }
  }
}

impl From<roster_core::Error> for ApiError {
  fn from(e: roster_core::Error) -> Self {
    let details = e.details();
    let message = match &e {
      roster_core::Error::MissingFields(_) | roster_core::Error::Invalid(_) => e.to_string(),
      roster_core::Error::NotAnObject | roster_core::Error::Serialization(_) => {
        "Invalid request body".to_owned()
      }
    };
    Self::Validation { message, details }
  }
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self {
    Self::Validation {
      message: "Invalid request body".to_owned(),
      details: Some(rejection.body_text()),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message, details) = match self {
      ApiError::Validation { message, details } => (StatusCode::BAD_REQUEST, message, details),
      ApiError::Conflict(m) => (StatusCode::BAD_REQUEST, m, None),
      ApiError::Unauthorized(m) => (StatusCode::UNAUTHORIZED, m, None),
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m, None),
      ApiError::MethodNotAllowed => {
        (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed".to_owned(), None)
      }
      ApiError::Store { context, source } => {
        tracing::error!(error = %source, "{context}");
        (StatusCode::INTERNAL_SERVER_ERROR, context, Some(source.to_string()))
      }
      ApiError::Internal(m) => {
        tracing::error!("{m}");
        (StatusCode::INTERNAL_SERVER_ERROR, m, None)
      }
    };
    let body = match details {
      Some(details) => json!({ "error": message, "details": details }),
      None => json!({ "error": message }),
    };
    (status, Json(body)).into_response()
  }
}
