//! Status transition rules for documents and contact messages.
//!
//! Stores call [`ItemStatus::transition`] and [`MessageStatus::transition`]
//! before persisting a status change; a rejected transition never reaches the
//! backend.

use crate::{
  Error, Result,
  model::{ItemStatus, MessageStatus},
};

impl ItemStatus {
  /// Whether a document may move from `self` to `to`.
  ///
  /// Visible and hidden toggle freely, either may be soft-deleted, and a
  /// deleted document may be restored to visible. Re-applying the current
  /// status is allowed.
  pub fn can_transition_to(self, to: ItemStatus) -> bool {
    use ItemStatus::*;
    match (self, to) {
      (a, b) if a == b => true,
      (Visible, Hidden) | (Hidden, Visible) => true,
      (Visible, Deleted) | (Hidden, Deleted) => true,
      (Deleted, Visible) => true,
      _ => false,
    }
  }

  pub fn transition(self, to: ItemStatus) -> Result<ItemStatus> {
    if self.can_transition_to(to) {
      Ok(to)
    } else {
      Err(Error::InvalidTransition { from: self.into(), to: to.into() })
    }
  }

  pub fn is_visible(self) -> bool { self == ItemStatus::Visible }
}

impl MessageStatus {
  /// Whether a message may move from `self` to `to`.
  ///
  /// Status only moves forward (unread, read, replied) except for the
  /// explicit operator reset back to unread.
  pub fn can_transition_to(self, to: MessageStatus) -> bool {
    use MessageStatus::*;
    match (self, to) {
      (a, b) if a == b => true,
      (_, Unread) => true,
      (Unread, Read) | (Unread, Replied) | (Read, Replied) => true,
      _ => false,
    }
  }

  pub fn transition(self, to: MessageStatus) -> Result<MessageStatus> {
    if self.can_transition_to(to) {
      Ok(to)
    } else {
      Err(Error::InvalidTransition { from: self.into(), to: to.into() })
    }
  }

  /// The status after an admin opens the message: unread becomes read,
  /// anything else is kept.
  pub fn on_open(self) -> MessageStatus {
    match self {
      MessageStatus::Unread => MessageStatus::Read,
      other => other,
    }
  }
}
