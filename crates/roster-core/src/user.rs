//! Administrator accounts.
//!
//! Passwords never appear in a [`User`]; stores keep only a password hash
//! (see [`StoredUser`]) and hashing itself is the API layer's concern.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

pub const MIN_PASSWORD_LEN: usize = 6;
pub const MIN_MOBILE_LEN: usize = 10;

/// Emails are stored and looked up lowercased.
pub fn normalize_email(email: &str) -> String { email.trim().to_lowercase() }

/// The public view of an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
  pub id:                Uuid,
  pub full_name:         String,
  pub organization_name: String,
  pub email:             String,
  pub mobile_no:         String,
  pub created_at:        DateTime<Utc>,
  pub updated_at:        DateTime<Utc>,
}

/// Input to [`crate::store::RecordStore::add_user`].
#[derive(Debug, Clone)]
pub struct NewUser {
  pub full_name:         String,
  pub organization_name: String,
  /// Already normalised with [`normalize_email`].
  pub email:             String,
  pub mobile_no:         String,
  /// PHC-format password hash.
  pub password_hash:     String,
}

/// An account together with its credential, as read back from a store.
#[derive(Debug, Clone)]
pub struct StoredUser {
  pub user:          User,
  pub password_hash: String,
}

// ─── Request bodies ──────────────────────────────────────────────────────────

/// `POST /api/auth/signup` body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Signup {
  pub full_name:         String,
  pub organization_name: String,
  pub email:             String,
  pub mobile_no:         String,
  pub password:          String,
}

impl Signup {
  pub fn validate(&self) -> Result<()> {
    let fields = [
      &self.full_name,
      &self.organization_name,
      &self.email,
      &self.mobile_no,
      &self.password,
    ];
    if fields.iter().any(|f| f.trim().is_empty()) {
      return Err(Error::Invalid("Please fill in all fields".into()));
    }
    if !self.email.trim().contains('@') {
      return Err(Error::Invalid("Please enter a valid email".into()));
    }
    // Checked as stored: the handler keeps the trimmed value.
    if self.mobile_no.trim().chars().count() < MIN_MOBILE_LEN {
      return Err(Error::Invalid("Please enter a valid mobile number".into()));
    }
    if self.password.chars().count() < MIN_PASSWORD_LEN {
      return Err(Error::Invalid(format!(
        "Password must be at least {MIN_PASSWORD_LEN} characters"
      )));
    }
    Ok(())
  }
}

/// `POST /api/auth/login` body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
  pub email:    String,
  pub password: String,
}

impl Credentials {
  pub fn validate(&self) -> Result<()> {
    if self.email.trim().is_empty() || self.password.is_empty() {
      return Err(Error::Invalid("Please fill in all fields".into()));
    }
    if !self.email.contains('@') {
      return Err(Error::Invalid("Please enter a valid email".into()));
    }
    Ok(())
  }
}

/// `PUT /api/users/{email}/password` body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PasswordChange {
  pub current_password: String,
  pub new_password:     String,
}

impl PasswordChange {
  pub fn validate(&self) -> Result<()> {
    if self.current_password.is_empty() || self.new_password.is_empty() {
      return Err(Error::Invalid("Please fill all password fields".into()));
    }
    if self.new_password.chars().count() < MIN_PASSWORD_LEN {
      return Err(Error::Invalid(format!(
        "Password must be at least {MIN_PASSWORD_LEN} characters"
      )));
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn signup() -> Signup {
    Signup {
      full_name:         "Meera Iyer".into(),
      organization_name: "Celestial High School".into(),
      email:             "meera@celestial.edu".into(),
      mobile_no:         "9876543210".into(),
      password:          "hunter22".into(),
    }
  }

  fn message(r: Result<()>) -> String { r.unwrap_err().to_string() }

  #[test]
  fn signup_checks_run_in_order() {
    assert!(signup().validate().is_ok());

    let s = Signup { organization_name: String::new(), ..signup() };
    assert_eq!(message(s.validate()), "Please fill in all fields");

    let s = Signup { email: "meera.celestial.edu".into(), ..signup() };
    assert_eq!(message(s.validate()), "Please enter a valid email");

    let s = Signup { mobile_no: "98765".into(), ..signup() };
    assert_eq!(message(s.validate()), "Please enter a valid mobile number");

    let s = Signup { password: "abc".into(), ..signup() };
    assert_eq!(message(s.validate()), "Password must be at least 6 characters");
  }

  #[test]
  fn mobile_length_ignores_surrounding_whitespace() {
    let s = Signup { mobile_no: "123456789 ".into(), ..signup() };
    assert_eq!(message(s.validate()), "Please enter a valid mobile number");

    let s = Signup { mobile_no: " 9876543210 ".into(), ..signup() };
    assert!(s.validate().is_ok());
  }

  #[test]
  fn email_is_normalised() {
    assert_eq!(normalize_email("  Meera@Celestial.EDU "), "meera@celestial.edu");
  }

  #[test]
  fn signup_body_uses_camel_case() {
    let s: Signup = serde_json::from_str(
      r#"{"fullName":"A","organizationName":"B","email":"a@b","mobileNo":"1234567890","password":"secret"}"#,
    )
    .unwrap();
    assert_eq!(s.organization_name, "B");
    assert_eq!(s.mobile_no, "1234567890");
  }
}
