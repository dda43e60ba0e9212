//! Delivery-agent statistics and location pushes.

use serde::{Deserialize, Serialize};

use super::amount;

/// Aggregate figures for the current delivery agent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeliveryStats {
    #[serde(default)]
    pub total_deliveries: u64,
    #[serde(default)]
    pub completed_deliveries: u64,
    #[serde(default, alias = "active_deliveries")]
    pub pending_deliveries: u64,
    #[serde(
        default,
        alias = "earnings",
        deserialize_with = "amount::deserialize_optional"
    )]
    pub total_earnings: Option<f64>,
}

/// Current position reported by a delivery agent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LocationUpdate {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<u64>,
}
