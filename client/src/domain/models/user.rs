//! Marketplace user profile.

use serde::{Deserialize, Serialize};

/// Role a user plays in the marketplace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[default]
    Buyer,
    Farmer,
    #[serde(alias = "delivery_agent", alias = "delivery_person")]
    Delivery,
    Admin,
    #[serde(other)]
    Other,
}

impl UserRole {
    /// Wire spelling used in filters and sign-up payloads.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Buyer => "buyer",
            Self::Farmer => "farmer",
            Self::Delivery => "delivery",
            Self::Admin => "admin",
            Self::Other => "other",
        }
    }
}

/// User profile as returned by the backend and cached in the session.
///
/// # Examples
/// ```
/// use serde_json::json;
/// use terrabia_client::domain::models::{User, UserRole};
///
/// let user: User = serde_json::from_value(json!({
///     "id": 4,
///     "email": "ama@farm.example",
///     "user_type": "farmer",
/// }))
/// .expect("decode");
/// assert_eq!(user.role, UserRole::Farmer);
/// assert_eq!(user.display_name(), "ama@farm.example");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default, alias = "user_type")]
    pub role: UserRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl User {
    /// Full name when known, otherwise username, otherwise email.
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let full = full.trim();
        if !full.is_empty() {
            return full.to_owned();
        }
        if !self.username.trim().is_empty() {
            return self.username.clone();
        }
        self.email.clone()
    }
}

/// Partial profile update; absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}
