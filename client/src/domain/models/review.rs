//! Product reviews.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity_ref::EntityRef;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: u64,
    #[serde(default)]
    pub product: Option<EntityRef>,
    #[serde(default, alias = "user", alias = "reviewer")]
    pub author: Option<EntityRef>,
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Payload for creating or editing a review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewReview {
    pub product: u64,
    pub rating: u8,
    pub comment: String,
}
