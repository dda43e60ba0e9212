//! User directory and profile updates.

use super::fetch_list;
use crate::domain::api_client::ApiClient;
use crate::domain::error::ApiResult;
use crate::domain::models::{ProfileUpdate, User, UserRole};
use crate::domain::request::RequestDescriptor;

const USERS_PATH: &str = "users/";
const SEARCH_PATH: &str = "users/search/";
const ME_PATH: &str = "users/me/";

/// User endpoint group.
#[derive(Debug, Clone, Copy)]
pub struct UserEndpoints<'a> {
    client: &'a ApiClient,
}

impl<'a> UserEndpoints<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Users, optionally restricted to one role.
    pub async fn list(&self, role: Option<UserRole>) -> ApiResult<Vec<User>> {
        fetch_list(
            self.client,
            RequestDescriptor::get(USERS_PATH)
                .with_optional_query("role", role.map(UserRole::as_str)),
        )
        .await
    }

    pub async fn search(&self, term: &str) -> ApiResult<Vec<User>> {
        fetch_list(
            self.client,
            RequestDescriptor::get(SEARCH_PATH).with_query("q", term),
        )
        .await
    }

    pub async fn get(&self, id: u64) -> ApiResult<User> {
        self.client
            .send_json(RequestDescriptor::get(format!("users/{id}/")))
            .await
    }

    /// Apply a partial update to the authenticated user's profile.
    pub async fn update_me(&self, update: &ProfileUpdate) -> ApiResult<User> {
        let descriptor = RequestDescriptor::patch(ME_PATH).with_json(update)?;
        self.client.send_json(descriptor).await
    }
}
