//! Counters shown on the home page and the admin dashboard.

use serde::{Deserialize, Serialize};

use crate::model::{Category, ContactMessage, DocumentItem, ItemStatus, MessageStatus, ServiceItem};

/// Public counters over visible documents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counters {
  pub diplomas:     usize,
  pub certificates: usize,
}

impl Counters {
  pub fn from_documents(docs: &[DocumentItem]) -> Self {
    docs
      .iter()
      .filter(|d| d.status.is_visible())
      .fold(Self::default(), |mut acc, d| {
        match d.category {
          Category::Diploma => acc.diplomas += 1,
          Category::Certificate => acc.certificates += 1,
        }
        acc
      })
  }
}

/// Totals for the admin console.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
  pub visible:  usize,
  pub hidden:   usize,
  pub deleted:  usize,
  pub services: usize,
  pub messages: usize,
  pub unread:   usize,
  pub read:     usize,
  pub replied:  usize,
}

impl DashboardStats {
  pub fn compute(
    docs: &[DocumentItem],
    services: &[ServiceItem],
    messages: &[ContactMessage],
  ) -> Self {
    let mut stats = Self { services: services.len(), messages: messages.len(), ..Self::default() };
    for d in docs {
      match d.status {
        ItemStatus::Visible => stats.visible += 1,
        ItemStatus::Hidden => stats.hidden += 1,
        ItemStatus::Deleted => stats.deleted += 1,
      }
    }
    for m in messages {
      match m.status {
        MessageStatus::Unread => stats.unread += 1,
        MessageStatus::Read => stats.read += 1,
        MessageStatus::Replied => stats.replied += 1,
      }
    }
    stats
  }
}

#[cfg(test)]
mod tests {
  use chrono::Utc;

  use super::*;

  fn doc(category: Category, status: ItemStatus) -> DocumentItem {
    DocumentItem {
      id: crate::model::new_id(),
      title: "t".into(),
      description: String::new(),
      image_url: "u".into(),
      category,
      status,
      created_at: Utc::now(),
    }
  }

  fn msg(status: MessageStatus) -> ContactMessage {
    ContactMessage {
      id: crate::model::new_id(),
      name: "n".into(),
      email: "n@example.com".into(),
      subject: String::new(),
      message: "m".into(),
      status,
      created_at: Utc::now(),
    }
  }

  #[test]
  fn counters_ignore_hidden_and_deleted() {
    let docs = vec![
      doc(Category::Diploma, ItemStatus::Visible),
      doc(Category::Diploma, ItemStatus::Hidden),
      doc(Category::Certificate, ItemStatus::Visible),
      doc(Category::Certificate, ItemStatus::Visible),
      doc(Category::Certificate, ItemStatus::Deleted),
    ];
    assert_eq!(Counters::from_documents(&docs), Counters { diplomas: 1, certificates: 2 });
  }

  #[test]
  fn dashboard_totals() {
    let docs = vec![
      doc(Category::Diploma, ItemStatus::Visible),
      doc(Category::Diploma, ItemStatus::Hidden),
      doc(Category::Certificate, ItemStatus::Deleted),
    ];
    let messages = vec![
      msg(MessageStatus::Unread),
      msg(MessageStatus::Unread),
      msg(MessageStatus::Replied),
    ];
    let stats = DashboardStats::compute(&docs, &[], &messages);
    assert_eq!(stats.visible, 1);
    assert_eq!(stats.hidden, 1);
    assert_eq!(stats.deleted, 1);
    assert_eq!(stats.messages, 3);
    assert_eq!(stats.unread, 2);
    assert_eq!(stats.read, 0);
    assert_eq!(stats.replied, 1);
    assert_eq!(stats.services, 0);
  }
}
