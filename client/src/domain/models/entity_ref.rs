//! References to related records that may be inlined or given by id.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An embedded related record; only its id is guaranteed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddedEntity {
    /// Record identifier.
    pub id: u64,
    /// Remaining fields, kept verbatim.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// A related record given as a bare id or as an embedded object.
///
/// # Examples
/// ```
/// use serde_json::json;
/// use terrabia_client::domain::models::EntityRef;
///
/// let bare: EntityRef = serde_json::from_value(json!(7)).expect("id");
/// let nested: EntityRef =
///     serde_json::from_value(json!({ "id": 7, "name": "Kale" })).expect("object");
/// assert_eq!(bare.id(), 7);
/// assert_eq!(nested.id(), 7);
/// assert_eq!(nested.display_name(), Some("Kale"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityRef {
    Id(u64),
    Embedded(EmbeddedEntity),
}

impl EntityRef {
    /// Identifier of the referenced record.
    pub fn id(&self) -> u64 {
        match self {
            Self::Id(id) => *id,
            Self::Embedded(entity) => entity.id,
        }
    }

    /// Best-effort display name of an embedded record.
    pub fn display_name(&self) -> Option<&str> {
        let Self::Embedded(entity) = self else {
            return None;
        };
        ["name", "username", "email"]
            .iter()
            .find_map(|key| entity.fields.get(*key).and_then(Value::as_str))
    }
}

impl From<u64> for EntityRef {
    fn from(value: u64) -> Self {
        Self::Id(value)
    }
}
