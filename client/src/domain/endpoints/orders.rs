//! Orders, including the farmer- and delivery-scoped listings.
//!
//! The scoped listings probe a dedicated endpoint first and fall back to the
//! unfiltered collection with an equivalent client-side filter.

use std::collections::BTreeSet;

use serde_json::json;
use tracing::{debug, warn};

use super::fetch_list;
use crate::domain::api_client::ApiClient;
use crate::domain::error::{ApiError, ApiResult};
use crate::domain::fallback::FallbackChain;
use crate::domain::models::{NewOrder, Order, OrderStatus, ProductQuery};
use crate::domain::request::RequestDescriptor;

const ORDERS_PATH: &str = "orders/";
const FARMER_ORDERS_PATH: &str = "orders/farmer/";
pub(crate) const DELIVERY_ORDERS_PATH: &str = "delivery/orders/";

fn order_path(id: u64) -> String {
    format!("orders/{id}/")
}

/// Order endpoint group.
#[derive(Debug, Clone, Copy)]
pub struct OrderEndpoints<'a> {
    client: &'a ApiClient,
}

impl<'a> OrderEndpoints<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Orders visible to the authenticated user.
    pub async fn list(&self) -> ApiResult<Vec<Order>> {
        fetch_list(self.client, RequestDescriptor::get(ORDERS_PATH)).await
    }

    pub async fn get(&self, id: u64) -> ApiResult<Order> {
        self.client.send_json(RequestDescriptor::get(order_path(id))).await
    }

    pub async fn create(&self, order: &NewOrder) -> ApiResult<Order> {
        let descriptor = RequestDescriptor::post(ORDERS_PATH).with_json(order)?;
        self.client.send_json(descriptor).await
    }

    pub async fn update_status(&self, id: u64, status: OrderStatus) -> ApiResult<Order> {
        let descriptor = RequestDescriptor::patch(format!("orders/{id}/status/"))
            .with_json(&json!({ "status": status.as_str() }))?;
        self.client.send_json(descriptor).await
    }

    pub async fn cancel(&self, id: u64) -> ApiResult<()> {
        self.client
            .send_unit(RequestDescriptor::post(format!("orders/{id}/cancel/")))
            .await
    }

    /// Orders containing at least one of `farmer_id`'s products.
    ///
    /// # Errors
    ///
    /// Returns the fallback's error when both the dedicated endpoint and the
    /// client-side filter fail.
    pub async fn farmer_orders(&self, farmer_id: u64) -> ApiResult<Vec<Order>> {
        let this = *self;
        FallbackChain::new("farmer_orders")
            .then("dedicated", move || {
                fetch_list(this.client, RequestDescriptor::get(FARMER_ORDERS_PATH))
            })
            .then("filtered", move || this.filter_farmer_orders(farmer_id))
            .run()
            .await
            .map_err(ApiError::from)
    }

    /// Active orders assigned to `agent_id` or still unassigned.
    ///
    /// # Errors
    ///
    /// Returns the fallback's error when both the dedicated endpoint and the
    /// client-side filter fail.
    pub async fn delivery_orders(&self, agent_id: u64) -> ApiResult<Vec<Order>> {
        let this = *self;
        FallbackChain::new("delivery_orders")
            .then("dedicated", move || {
                fetch_list(this.client, RequestDescriptor::get(DELIVERY_ORDERS_PATH))
            })
            .then("filtered", move || async move {
                let orders = this.list().await?;
                Ok(claimable_orders(orders, agent_id))
            })
            .run()
            .await
            .map_err(ApiError::from)
    }

    async fn filter_farmer_orders(self, farmer_id: u64) -> ApiResult<Vec<Order>> {
        let query = ProductQuery {
            farmer: Some(farmer_id),
            ..ProductQuery::default()
        };
        let listed = self.client.products().list(&query).await?;
        let listed_count = listed.len();
        let owned = listed
            .into_iter()
            .filter(|product| product.may_belong_to(farmer_id))
            .map(|product| product.id)
            .collect::<BTreeSet<_>>();
        if owned.is_empty() && listed_count > 0 {
            warn!(
                farmer_id,
                listed = listed_count,
                "no listed product belongs to the farmer; farmer order list will be empty"
            );
        }
        debug!(farmer_id, owned = owned.len(), "filtering orders by owned products");
        let orders = self.list().await?;
        Ok(orders_for_products(orders, &owned))
    }
}

/// Keep orders with at least one line whose product is in `owned`.
pub(crate) fn orders_for_products(orders: Vec<Order>, owned: &BTreeSet<u64>) -> Vec<Order> {
    orders
        .into_iter()
        .filter(|order| order.references_any_product(owned))
        .collect()
}

/// Keep orders in the active-delivery set assigned to `agent_id` or nobody.
pub(crate) fn claimable_orders(orders: Vec<Order>, agent_id: u64) -> Vec<Order> {
    orders
        .into_iter()
        .filter(|order| order.is_claimable_by(agent_id))
        .collect()
}
