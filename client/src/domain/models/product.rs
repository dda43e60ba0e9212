//! Products, categories, and listing filters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::amount;
use super::entity_ref::EntityRef;
use crate::domain::request::{FilePart, RequestDescriptor};

/// Product listed by a farmer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(deserialize_with = "amount::deserialize")]
    pub price: f64,
    #[serde(default, alias = "stock_quantity", alias = "quantity_available")]
    pub stock: u32,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub category: Option<EntityRef>,
    #[serde(default, alias = "owner", alias = "seller")]
    pub farmer: Option<EntityRef>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub is_available: Option<bool>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Product {
    /// Whether `farmer_id` owns this product.
    pub fn is_owned_by(&self, farmer_id: u64) -> bool {
        self.farmer.as_ref().is_some_and(|farmer| farmer.id() == farmer_id)
    }

    /// Whether a listing filtered server-side by `farmer_id` should keep
    /// this product. A product that omits its owner is taken on trust.
    pub fn may_belong_to(&self, farmer_id: u64) -> bool {
        self.farmer.is_none() || self.is_owned_by(farmer_id)
    }
}

/// Product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Filters accepted by the product listing endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductQuery {
    pub category: Option<u64>,
    pub farmer: Option<u64>,
    pub search: Option<String>,
    pub ordering: Option<String>,
    pub page: Option<u32>,
}

impl ProductQuery {
    pub(crate) fn apply(&self, descriptor: RequestDescriptor) -> RequestDescriptor {
        descriptor
            .with_optional_query("category", self.category)
            .with_optional_query("farmer", self.farmer)
            .with_optional_query("search", self.search.as_deref())
            .with_optional_query("ordering", self.ordering.as_deref())
            .with_optional_query("page", self.page)
    }
}

/// Fields for creating or updating a product.
///
/// When `images` is non-empty the draft is sent as a multipart form.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub stock: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<u64>,
    #[serde(skip)]
    pub images: Vec<FilePart>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_decimal_price_and_nested_farmer() {
        let product: Product = serde_json::from_value(json!({
            "id": 11,
            "name": "Cassava",
            "price": "3.20",
            "quantity_available": 40,
            "farmer": { "id": 5, "username": "ama" },
            "category": 2,
        }))
        .expect("decode product");
        assert_eq!(product.price, 3.2);
        assert_eq!(product.stock, 40);
        assert!(product.is_owned_by(5));
        assert!(!product.is_owned_by(6));
        assert_eq!(product.category.map(|c| c.id()), Some(2));
    }

    #[test]
    fn draft_serialization_skips_images() {
        let draft = ProductDraft {
            name: "Yam".to_owned(),
            price: 1.5,
            stock: 3,
            images: vec![FilePart {
                field: "image".to_owned(),
                file_name: "yam.png".to_owned(),
                content_type: None,
                bytes: vec![1],
            }],
            ..ProductDraft::default()
        };
        let encoded = serde_json::to_value(&draft).expect("encode");
        assert!(encoded.get("images").is_none());
        assert_eq!(encoded["name"], json!("Yam"));
    }
}
