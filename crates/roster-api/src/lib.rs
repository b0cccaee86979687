//! JSON REST API for Roster.
//!
//! Exposes an axum [`Router`] backed by any [`roster_core::store::RecordStore`].
//! Every entity gets the same five CRUD routes from [`records`]; accounts and
//! the health probe have their own handlers. TLS, CORS, and request tracing
//! are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", roster_api::api_router(store.clone()))
//! ```

pub mod auth;
pub mod error;
pub mod health;
pub mod records;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post, put},
};
use roster_core::{
  Entity,
  attendance::{StaffAttendance, StudentAttendance},
  event::Event,
  school::{SchoolClass, Student, Subject, Teacher},
  store::RecordStore,
};

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: RecordStore + 'static,
{
  let router = Router::new()
    // Health
    .route("/health", get(health::handler::<S>))
    // Accounts
    .route("/auth/signup", post(auth::signup::<S>))
    .route("/auth/login", post(auth::login::<S>))
    .route("/users/{email}", get(auth::get_user::<S>))
    .route("/users/{email}/password", put(auth::change_password::<S>));

  let router = resource::<S, Student>(router);
  let router = resource::<S, Teacher>(router);
  let router = resource::<S, SchoolClass>(router);
  let router = resource::<S, Subject>(router);
  let router = resource::<S, StudentAttendance>(router);
  let router = resource::<S, StaffAttendance>(router);
  let router = resource::<S, Event>(router);

  router
    .fallback(no_route)
    .method_not_allowed_fallback(wrong_method)
    .with_state(store)
}

async fn no_route() -> ApiError { ApiError::NotFound("Not found".into()) }

async fn wrong_method() -> ApiError { ApiError::MethodNotAllowed }

/// Register the collection and item routes for `E` under `/{E::PATH}`.
fn resource<S, E>(router: Router<Arc<S>>) -> Router<Arc<S>>
where
  S: RecordStore + 'static,
  E: Entity,
{
  let collection = format!("/{}", E::PATH);
  let item = format!("/{}/{{id}}", E::PATH);
  router
    .route(
      &collection,
      get(records::list::<S, E>).post(records::create::<S, E>),
    )
    .route(
      &item,
      get(records::get_one::<S, E>)
        .put(records::update::<S, E>)
        .delete(records::remove::<S, E>),
    )
}
