//! Admin access gate.
//!
//! A convenience gate, not a security boundary: a session is `LoggedIn` after
//! a username/password pair matches the stored credentials, and stays so
//! until logout. Each load of the admin surface re-validates it.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::store::ContentStore;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Session {
  LoggedOut,
  LoggedIn { username: String, since: DateTime<Utc> },
}

impl Session {
  pub fn is_logged_in(&self) -> bool { matches!(self, Self::LoggedIn { .. }) }

  pub fn username(&self) -> Option<&str> {
    match self {
      Self::LoggedIn { username, .. } => Some(username),
      Self::LoggedOut => None,
    }
  }

  /// Check a submitted pair against the stored credentials.
  ///
  /// Returns `LoggedIn` on an exact match and `LoggedOut` otherwise; only a
  /// store failure is an error.
  pub async fn login<S: ContentStore>(
    store: &S,
    username: &str,
    password: &str,
  ) -> Result<Session, S::Error> {
    let creds = store.get_admin_credentials().await?;
    if creds.verify(username, password) {
      tracing::info!(username, "admin logged in");
      Ok(Session::LoggedIn { username: username.to_owned(), since: Utc::now() })
    } else {
      tracing::warn!(username, "rejected admin login");
      Ok(Session::LoggedOut)
    }
  }

  pub fn logout(self) -> Session {
    if let Session::LoggedIn { username, .. } = &self {
      tracing::info!(username = %username, "admin logged out");
    }
    Session::LoggedOut
  }

  /// Re-check a remembered session against the current credentials. A
  /// session whose username no longer matches falls back to `LoggedOut`.
  pub async fn revalidate<S: ContentStore>(self, store: &S) -> Result<Session, S::Error> {
    let Session::LoggedIn { username, since } = self else {
      return Ok(Session::LoggedOut);
    };
    let creds = store.get_admin_credentials().await?;
    if creds.username == username {
      Ok(Session::LoggedIn { username, since })
    } else {
      Ok(Session::LoggedOut)
    }
  }
}
