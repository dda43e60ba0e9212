//! Shopping cart.

use serde::{Deserialize, Serialize};

use super::amount;
use super::entity_ref::EntityRef;

/// Line in the current user's cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: u64,
    pub product: EntityRef,
    pub quantity: u32,
    #[serde(
        default,
        alias = "total_price",
        deserialize_with = "amount::deserialize_optional"
    )]
    pub subtotal: Option<f64>,
}

/// The current user's cart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default, alias = "cart_items")]
    pub items: Vec<CartItem>,
    #[serde(
        default,
        alias = "total_price",
        alias = "total_amount",
        deserialize_with = "amount::deserialize_optional"
    )]
    pub total: Option<f64>,
}

impl Cart {
    /// Number of units across all lines.
    pub fn unit_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }
}
