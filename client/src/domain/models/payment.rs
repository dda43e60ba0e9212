//! Payment intents and confirmations.

use serde::{Deserialize, Serialize};

use super::amount;
use super::entity_ref::EntityRef;

/// Server-side payment intent for an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentIntent {
    #[serde(alias = "payment_intent_id")]
    pub id: String,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default, deserialize_with = "amount::deserialize_optional")]
    pub amount: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Outcome of confirming a payment intent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentConfirmation {
    #[serde(default)]
    pub status: String,
    #[serde(default, alias = "order_id")]
    pub order: Option<EntityRef>,
}
