//! Account handlers and password hashing.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/auth/signup` | Body: [`Signup`]; 201 + user |
//! | `POST` | `/auth/login` | Body: [`Credentials`]; 401 on unknown email or wrong password |
//! | `GET`  | `/users/:email` | 404 if not found |
//! | `PUT`  | `/users/:email/password` | Body: [`PasswordChange`] |
//!
//! Passwords are stored as argon2 PHC strings with a per-user random salt.
//! The server issues no token; a successful login only returns the account.

use std::sync::Arc;

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use axum::{
  Json,
  extract::{Path, State, rejection::JsonRejection},
  http::StatusCode,
  response::IntoResponse,
};
use rand_core::OsRng;
use roster_core::{
  store::{RecordStore, StoreError},
  user::{Credentials, NewUser, PasswordChange, Signup, User, normalize_email},
};
use serde::{Deserialize, Serialize};

use crate::{error::ApiError, records::Message};

const EMAIL_TAKEN: &str = "Email already registered";

// ─── Hashing ──────────────────────────────────────────────────────────────────

/// Hash `password` with a fresh random salt, returning the PHC string.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| ApiError::Internal(format!("argon2 error: {e}")))
}

/// Check `password` against a stored PHC string. A malformed hash never
/// verifies.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
  let Ok(parsed) = PasswordHash::new(password_hash) else {
    return false;
  };
  Argon2::default()
    .verify_password(password.as_bytes(), &parsed)
    .is_ok()
}

// ─── Responses ────────────────────────────────────────────────────────────────

/// Body returned by signup and login.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
  pub message: String,
  pub user:    User,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
  pub user: User,
}

// ─── Signup ───────────────────────────────────────────────────────────────────

/// `POST /auth/signup`
pub async fn signup<S: RecordStore>(
  State(store): State<Arc<S>>,
  body: Result<Json<Signup>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
  let Json(body) = body?;
  body.validate()?;

  let context = "Error creating account";
  let email = normalize_email(&body.email);
  let existing = store
    .find_user(&email)
    .await
    .map_err(ApiError::store(context))?;
  if existing.is_some() {
    return Err(ApiError::Conflict(EMAIL_TAKEN.into()));
  }

  let new_user = NewUser {
    full_name:         body.full_name.trim().to_owned(),
    organization_name: body.organization_name.trim().to_owned(),
    email,
    mobile_no:         body.mobile_no.trim().to_owned(),
    password_hash:     hash_password(&body.password)?,
  };

  // The unique index still guards against a concurrent signup.
  let user = store.add_user(new_user).await.map_err(|e| {
    if e.is_conflict() {
      ApiError::Conflict(EMAIL_TAKEN.into())
    } else {
      ApiError::store(context)(e)
    }
  })?;

  tracing::info!(email = %user.email, "user created");
  Ok((
    StatusCode::CREATED,
    Json(AuthResponse { message: "Account created successfully".into(), user }),
  ))
}

// ─── Login ────────────────────────────────────────────────────────────────────

/// `POST /auth/login`
pub async fn login<S: RecordStore>(
  State(store): State<Arc<S>>,
  body: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<AuthResponse>, ApiError> {
  let Json(body) = body?;
  body.validate()?;

  let email = normalize_email(&body.email);
  let stored = store
    .find_user(&email)
    .await
    .map_err(ApiError::store("Error during login"))?
    .ok_or_else(|| ApiError::Unauthorized("Email not found. Please sign up first".into()))?;

  if !verify_password(&body.password, &stored.password_hash) {
    return Err(ApiError::Unauthorized("Incorrect password".into()));
  }

  tracing::info!(email = %stored.user.email, "user logged in");
  Ok(Json(AuthResponse { message: "Login successful".into(), user: stored.user }))
}

// ─── Lookup ───────────────────────────────────────────────────────────────────

/// `GET /users/:email`
pub async fn get_user<S: RecordStore>(
  State(store): State<Arc<S>>,
  Path(email): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
  let email = normalize_email(&email);
  let stored = store
    .find_user(&email)
    .await
    .map_err(ApiError::store("Error fetching user"))?
    .ok_or_else(|| ApiError::NotFound("User not found".into()))?;
  Ok(Json(UserResponse { user: stored.user }))
}

// ─── Password change ──────────────────────────────────────────────────────────

/// `PUT /users/:email/password`
pub async fn change_password<S: RecordStore>(
  State(store): State<Arc<S>>,
  Path(email): Path<String>,
  body: Result<Json<PasswordChange>, JsonRejection>,
) -> Result<Json<Message>, ApiError> {
  let Json(body) = body?;
  body.validate()?;

  let context = "Error changing password";
  let email = normalize_email(&email);
  let stored = store
    .find_user(&email)
    .await
    .map_err(ApiError::store(context))?
    .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

  if !verify_password(&body.current_password, &stored.password_hash) {
    return Err(ApiError::Unauthorized("Incorrect password".into()));
  }

  let hash = hash_password(&body.new_password)?;
  let changed = store
    .set_password_hash(&email, hash)
    .await
    .map_err(ApiError::store(context))?;
  if !changed {
    return Err(ApiError::NotFound("User not found".into()));
  }

  tracing::info!(%email, "password changed");
  Ok(Json(Message { message: "Password changed successfully".into() }))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn hash_round_trip() {
    let hash = hash_password("secret1").unwrap();
    assert!(hash.starts_with("$argon2"));
    assert!(verify_password("secret1", &hash));
    assert!(!verify_password("secret2", &hash));
  }

  #[test]
  fn same_password_gets_distinct_salts() {
    let a = hash_password("secret1").unwrap();
    let b = hash_password("secret1").unwrap();
    assert_ne!(a, b);
  }

  #[test]
  fn malformed_hash_never_verifies() {
    assert!(!verify_password("secret1", "secret1"));
  }
}
