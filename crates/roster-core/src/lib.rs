//! Core types and trait definitions for the Roster school-administration
//! store.
//!
//! This crate is deliberately free of HTTP and database dependencies. Every
//! entity is described once, through the [`entity::Entity`] schema trait, and
//! the API, store, and client layers are written generically over it.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod attendance;
pub mod entity;
pub mod error;
pub mod event;
pub mod filter;
pub mod school;
pub mod store;
pub mod user;

pub use entity::{Entity, FieldKind, FieldSpec, Record};
pub use error::{Error, Result};
