//! Error types for `roster-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// One or more required fields are absent or empty.
  #[error("Please fill all required fields")]
  MissingFields(Vec<&'static str>),

  /// A value is present but malformed; the message is user-facing.
  #[error("{0}")]
  Invalid(String),

  #[error("expected a JSON object")]
  NotAnObject,

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl Error {
  /// Extra context suitable for an error response's `details` field.
  pub fn details(&self) -> Option<String> {
    match self {
      Self::MissingFields(fields) => Some(format!("missing: {}", fields.join(", "))),
      Self::Serialization(e) => Some(e.to_string()),
      Self::Invalid(_) | Self::NotAnObject => None,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
