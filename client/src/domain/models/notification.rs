//! In-app notifications.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default, alias = "body")]
    pub message: String,
    #[serde(default, rename = "type", alias = "notification_type")]
    pub kind: Option<String>,
    #[serde(default, alias = "read")]
    pub is_read: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}
