//! The four named collections and their storage names.
//!
//! Collection names are part of the persisted layout. Renaming one requires a
//! migration, which is what [`Collection::legacy_name`] is for.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display,
  EnumString, EnumIter, IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Collection {
  Documents,
  Services,
  Messages,
  Admin,
}

impl Collection {
  /// The storage name of this collection.
  pub fn name(self) -> &'static str { self.into() }

  /// The name an older deployment stored this collection under, if any.
  ///
  /// Data found there while the current collection is uninitialised is moved
  /// over once and the legacy location is cleared.
  pub fn legacy_name(self) -> Option<&'static str> {
    match self {
      Self::Documents => Some("docs"),
      _ => None,
    }
  }
}

#[cfg(test)]
mod tests {
  use std::str::FromStr as _;

  use strum::IntoEnumIterator as _;

  use super::*;

  #[test]
  fn name_matches_display_and_serde() {
    for c in Collection::iter() {
      assert_eq!(c.to_string(), c.name());
      assert_eq!(Collection::from_str(c.name()).unwrap(), c);
      assert_eq!(serde_json::to_value(c).unwrap(), c.name());
    }
  }

  #[test]
  fn only_documents_has_a_legacy_name() {
    assert_eq!(Collection::Documents.legacy_name(), Some("docs"));
    assert!(Collection::Services.legacy_name().is_none());
    assert!(Collection::Messages.legacy_name().is_none());
    assert!(Collection::Admin.legacy_name().is_none());
  }

  #[test]
  fn storage_names() {
    assert_eq!(Collection::Documents.name(), "documents");
    assert_eq!(Collection::Admin.name(), "admin");
  }
}
