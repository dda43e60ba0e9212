//! Orders and their lifecycle.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::amount;
use super::entity_ref::EntityRef;

/// Order lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Processing,
    #[serde(alias = "ready", alias = "ready_for_pickup")]
    ReadyForDelivery,
    #[serde(alias = "shipped", alias = "out_for_delivery")]
    InTransit,
    Delivered,
    #[serde(alias = "canceled")]
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl OrderStatus {
    /// Statuses a delivery agent can still act on.
    pub const ACTIVE_DELIVERY: [Self; 4] = [
        Self::Confirmed,
        Self::Processing,
        Self::ReadyForDelivery,
        Self::InTransit,
    ];

    /// Whether the order is in the active-delivery set.
    pub fn is_active_delivery(self) -> bool {
        Self::ACTIVE_DELIVERY.contains(&self)
    }

    /// Wire spelling used when updating status.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Processing => "processing",
            Self::ReadyForDelivery => "ready_for_delivery",
            Self::InTransit => "in_transit",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
            Self::Unknown => "unknown",
        }
    }
}

/// One product line within an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    #[serde(default)]
    pub id: Option<u64>,
    pub product: EntityRef,
    pub quantity: u32,
    #[serde(default, deserialize_with = "amount::deserialize_optional")]
    pub price: Option<f64>,
}

/// Order as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: u64,
    #[serde(default, alias = "customer", alias = "user")]
    pub buyer: Option<EntityRef>,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default, alias = "order_items")]
    pub items: Vec<OrderItem>,
    #[serde(
        default,
        alias = "total",
        alias = "total_price",
        deserialize_with = "amount::deserialize_optional"
    )]
    pub total_amount: Option<f64>,
    #[serde(default, alias = "delivery_person", alias = "assigned_to")]
    pub delivery_agent: Option<EntityRef>,
    #[serde(default, alias = "shipping_address")]
    pub delivery_address: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Whether any line references a product in `product_ids`.
    pub fn references_any_product(&self, product_ids: &BTreeSet<u64>) -> bool {
        self.items
            .iter()
            .any(|item| product_ids.contains(&item.product.id()))
    }

    /// Whether `agent_id` may work this order: it is in the active-delivery
    /// set and is assigned to `agent_id` or unassigned.
    pub fn is_claimable_by(&self, agent_id: u64) -> bool {
        self.status.is_active_delivery()
            && self
                .delivery_agent
                .as_ref()
                .is_none_or(|agent| agent.id() == agent_id)
    }
}

/// Product and quantity for a new order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderLine {
    pub product_id: u64,
    pub quantity: u32,
}

/// Payload for placing an order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NewOrder {
    pub items: Vec<OrderLine>,
    pub delivery_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}
