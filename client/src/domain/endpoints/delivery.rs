//! Delivery-agent workflow: claim, progress and location reporting.

use crate::domain::api_client::ApiClient;
use crate::domain::error::ApiResult;
use crate::domain::models::{DeliveryStats, LocationUpdate};
use crate::domain::request::RequestDescriptor;

use super::orders::DELIVERY_ORDERS_PATH;

const LOCATION_PATH: &str = "delivery/location/";
const STATS_PATH: &str = "delivery/stats/";

/// Step in the delivery workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryAction {
    Accept,
    Reject,
    Start,
    Complete,
}

impl DeliveryAction {
    const fn segment(self) -> &'static str {
        match self {
            Self::Accept => "accept",
            Self::Reject => "reject",
            Self::Start => "start",
            Self::Complete => "complete",
        }
    }
}

/// Delivery endpoint group.
#[derive(Debug, Clone, Copy)]
pub struct DeliveryEndpoints<'a> {
    client: &'a ApiClient,
}

impl<'a> DeliveryEndpoints<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Apply `action` to `order_id`.
    pub async fn act(&self, order_id: u64, action: DeliveryAction) -> ApiResult<()> {
        let path = format!("{DELIVERY_ORDERS_PATH}{order_id}/{}/", action.segment());
        self.client.send_unit(RequestDescriptor::post(path)).await
    }

    pub async fn accept(&self, order_id: u64) -> ApiResult<()> {
        self.act(order_id, DeliveryAction::Accept).await
    }

    pub async fn reject(&self, order_id: u64) -> ApiResult<()> {
        self.act(order_id, DeliveryAction::Reject).await
    }

    pub async fn start(&self, order_id: u64) -> ApiResult<()> {
        self.act(order_id, DeliveryAction::Start).await
    }

    pub async fn complete(&self, order_id: u64) -> ApiResult<()> {
        self.act(order_id, DeliveryAction::Complete).await
    }

    /// Report the agent's current position.
    pub async fn push_location(&self, update: &LocationUpdate) -> ApiResult<()> {
        let descriptor = RequestDescriptor::post(LOCATION_PATH).with_json(update)?;
        self.client.send_unit(descriptor).await
    }

    pub async fn stats(&self) -> ApiResult<DeliveryStats> {
        self.client.send_json(RequestDescriptor::get(STATS_PATH)).await
    }
}
