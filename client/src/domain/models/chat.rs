//! Buyer/farmer/delivery messaging.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity_ref::EntityRef;

/// A message inside a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: u64,
    #[serde(default)]
    pub conversation: Option<EntityRef>,
    pub sender: EntityRef,
    #[serde(alias = "text", alias = "message")]
    pub content: String,
    #[serde(default, alias = "read")]
    pub is_read: bool,
    #[serde(default, alias = "timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

/// A conversation between two or more users.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: u64,
    #[serde(default)]
    pub participants: Vec<EntityRef>,
    #[serde(default)]
    pub last_message: Option<ChatMessage>,
    #[serde(default)]
    pub unread_count: u64,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}
