//! Admin credentials — the singleton record in the `admin` collection.
//!
//! Passwords are stored as argon2 PHC strings. Older deployments stored the
//! password in plaintext; [`StoredCredentials::from_stored`] upgrades such a
//! record on read.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use rand_core::OsRng;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

pub const DEFAULT_USERNAME: &str = "admin";
pub const DEFAULT_PASSWORD: &str = "admin123";

/// Id of the single record in the admin collection.
pub const CREDENTIALS_ID: &str = "credentials";

/// A username/password pair as submitted by an operator.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct AdminCredentials {
  pub username: String,
  pub password: String,
}

impl AdminCredentials {
  pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
    Self { username: username.into(), password: password.into() }
  }

  pub fn default_pair() -> Self { Self::new(DEFAULT_USERNAME, DEFAULT_PASSWORD) }

  /// Hash the password and produce the persisted form.
  pub fn hash(&self) -> Result<StoredCredentials> {
    let username = self.username.trim();
    if username.is_empty() || self.password.is_empty() {
      return Err(Error::Validation("username and password are required".into()));
    }
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
      .hash_password(self.password.as_bytes(), &salt)
      .map_err(|e| Error::Credentials(e.to_string()))?
      .to_string();
    Ok(StoredCredentials { username: username.to_owned(), password_hash })
  }
}

impl std::fmt::Debug for AdminCredentials {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("AdminCredentials")
      .field("username", &self.username)
      .field("password", &"<redacted>")
      .finish()
  }
}

/// The persisted credential record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredCredentials {
  pub username:      String,
  /// argon2 PHC string, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
}

/// The plaintext shape written by older deployments.
#[derive(Deserialize)]
struct LegacyCredentials {
  username: String,
  password: String,
}

impl StoredCredentials {
  /// Decode a stored record.
  ///
  /// Returns the credentials and whether the record was upgraded from the
  /// legacy plaintext form (in which case the caller should persist it).
  pub fn from_stored(value: serde_json::Value) -> Result<(Self, bool)> {
    if let Ok(stored) = serde_json::from_value::<StoredCredentials>(value.clone()) {
      PasswordHash::new(&stored.password_hash)
        .map_err(|e| Error::Validation(format!("passwordHash: {e}")))?;
      return Ok((stored, false));
    }
    let legacy: LegacyCredentials = serde_json::from_value(value)
      .map_err(|e| Error::Validation(format!("admin: {e}")))?;
    let upgraded = AdminCredentials::new(legacy.username, legacy.password).hash()?;
    Ok((upgraded, true))
  }

  /// `true` only when `username` matches exactly and `password` verifies.
  pub fn verify(&self, username: &str, password: &str) -> bool {
    if username != self.username {
      return false;
    }
    let Ok(parsed) = PasswordHash::new(&self.password_hash) else {
      return false;
    };
    Argon2::default()
      .verify_password(password.as_bytes(), &parsed)
      .is_ok()
  }
}
