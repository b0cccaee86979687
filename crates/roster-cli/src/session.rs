//! The signed-in administrator.
//!
//! The server is stateless, so a session is purely a client-side value: it
//! exists from a successful login until logout and is never written to disk.

use chrono::{DateTime, Local, Utc};
use roster_core::user::User;

#[derive(Debug, Clone)]
pub struct Session {
  pub user:      User,
  pub issued_at: DateTime<Utc>,
}

impl Session {
  /// Open a session for an account the server has just authenticated.
  pub fn new(user: User) -> Self {
    Self { user, issued_at: Utc::now() }
  }

  pub fn email(&self) -> &str { &self.user.email }

  /// `"Meera Iyer · Celestial High School"`
  pub fn banner(&self) -> String {
    format!("{} · {}", self.user.full_name, self.user.organization_name)
  }

  pub fn signed_in_since(&self) -> String {
    self
      .issued_at
      .with_timezone(&Local)
      .format("%H:%M")
      .to_string()
  }
}
