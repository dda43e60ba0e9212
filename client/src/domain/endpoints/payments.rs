//! Payment intents.

use serde_json::json;

use crate::domain::api_client::ApiClient;
use crate::domain::error::ApiResult;
use crate::domain::models::{PaymentConfirmation, PaymentIntent};
use crate::domain::request::RequestDescriptor;

const INTENT_PATH: &str = "payments/intent/";
const CONFIRM_PATH: &str = "payments/confirm/";

/// Payment endpoint group.
#[derive(Debug, Clone, Copy)]
pub struct PaymentEndpoints<'a> {
    client: &'a ApiClient,
}

impl<'a> PaymentEndpoints<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Open a payment intent for `order_id`.
    pub async fn create_intent(&self, order_id: u64) -> ApiResult<PaymentIntent> {
        let descriptor =
            RequestDescriptor::post(INTENT_PATH).with_json(&json!({ "order_id": order_id }))?;
        self.client.send_json(descriptor).await
    }

    pub async fn confirm(&self, intent_id: &str) -> ApiResult<PaymentConfirmation> {
        let descriptor = RequestDescriptor::post(CONFIRM_PATH)
            .with_json(&json!({ "payment_intent_id": intent_id }))?;
        self.client.send_json(descriptor).await
    }
}
