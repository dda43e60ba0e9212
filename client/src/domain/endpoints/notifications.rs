//! In-app notifications.

use super::fetch_list;
use crate::domain::api_client::ApiClient;
use crate::domain::error::ApiResult;
use crate::domain::models::Notification;
use crate::domain::request::RequestDescriptor;

const NOTIFICATIONS_PATH: &str = "notifications/";

/// Notification endpoint group.
#[derive(Debug, Clone, Copy)]
pub struct NotificationEndpoints<'a> {
    client: &'a ApiClient,
}

impl<'a> NotificationEndpoints<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> ApiResult<Vec<Notification>> {
        fetch_list(self.client, RequestDescriptor::get(NOTIFICATIONS_PATH)).await
    }

    pub async fn mark_read(&self, id: u64) -> ApiResult<()> {
        self.client
            .send_unit(RequestDescriptor::post(format!(
                "{NOTIFICATIONS_PATH}{id}/mark-read/"
            )))
            .await
    }
}
