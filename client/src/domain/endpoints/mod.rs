//! Thin per-resource method groups.
//!
//! Each group borrows the [`ApiClient`] and maps one logical operation to a
//! verb, a path and a payload. Groups hold no state of their own.

pub(crate) mod auth;
mod cart;
mod chat;
mod delivery;
mod location;
mod notifications;
mod orders;
mod payments;
mod products;
mod reviews;
mod users;

use serde::de::DeserializeOwned;

use crate::domain::api_client::ApiClient;
use crate::domain::error::ApiResult;
use crate::domain::models::ListPayload;
use crate::domain::request::RequestDescriptor;

pub use auth::AuthEndpoints;
pub use cart::CartEndpoints;
pub use chat::ChatEndpoints;
pub use delivery::{DeliveryAction, DeliveryEndpoints};
pub use location::LocationEndpoints;
pub use notifications::NotificationEndpoints;
pub use orders::OrderEndpoints;
pub use payments::PaymentEndpoints;
pub use products::ProductEndpoints;
pub use reviews::ReviewEndpoints;
pub use users::UserEndpoints;

/// Fetch a collection, accepting both bare arrays and paginated envelopes.
async fn fetch_list<T: DeserializeOwned>(
    client: &ApiClient,
    descriptor: RequestDescriptor,
) -> ApiResult<Vec<T>> {
    client
        .send_json::<ListPayload<T>>(descriptor)
        .await
        .map(ListPayload::into_items)
}
