//! Shopping cart.

use serde_json::json;

use crate::domain::api_client::ApiClient;
use crate::domain::error::ApiResult;
use crate::domain::models::Cart;
use crate::domain::request::RequestDescriptor;

const CART_PATH: &str = "cart/";
const ADD_PATH: &str = "cart/add/";
const CLEAR_PATH: &str = "cart/clear/";

fn item_path(item_id: u64) -> String {
    format!("cart/items/{item_id}/")
}

/// Cart endpoint group.
///
/// Mutations discard the response body; the backend's echo differs between
/// deployments, so callers re-read the cart when they need it.
#[derive(Debug, Clone, Copy)]
pub struct CartEndpoints<'a> {
    client: &'a ApiClient,
}

impl<'a> CartEndpoints<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn get(&self) -> ApiResult<Cart> {
        self.client.send_json(RequestDescriptor::get(CART_PATH)).await
    }

    pub async fn add(&self, product_id: u64, quantity: u32) -> ApiResult<()> {
        let descriptor = RequestDescriptor::post(ADD_PATH)
            .with_json(&json!({ "product_id": product_id, "quantity": quantity }))?;
        self.client.send_unit(descriptor).await
    }

    pub async fn update_item(&self, item_id: u64, quantity: u32) -> ApiResult<()> {
        let descriptor = RequestDescriptor::patch(item_path(item_id))
            .with_json(&json!({ "quantity": quantity }))?;
        self.client.send_unit(descriptor).await
    }

    pub async fn remove_item(&self, item_id: u64) -> ApiResult<()> {
        self.client
            .send_unit(RequestDescriptor::delete(item_path(item_id)))
            .await
    }

    pub async fn clear(&self) -> ApiResult<()> {
        self.client
            .send_unit(RequestDescriptor::delete(CLEAR_PATH))
            .await
    }
}
