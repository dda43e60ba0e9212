//! Conversations and messages.

use serde::Deserialize;
use serde_json::json;

use super::fetch_list;
use crate::domain::api_client::ApiClient;
use crate::domain::error::ApiResult;
use crate::domain::models::{ChatMessage, Conversation};
use crate::domain::request::RequestDescriptor;

const CONVERSATIONS_PATH: &str = "chat/conversations/";
const UNREAD_COUNT_PATH: &str = "chat/unread-count/";

fn messages_path(conversation_id: u64) -> String {
    format!("{CONVERSATIONS_PATH}{conversation_id}/messages/")
}

#[derive(Deserialize)]
struct UnreadCount {
    #[serde(alias = "unread_count", alias = "total")]
    count: u64,
}

/// Chat endpoint group.
#[derive(Debug, Clone, Copy)]
pub struct ChatEndpoints<'a> {
    client: &'a ApiClient,
}

impl<'a> ChatEndpoints<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn conversations(&self) -> ApiResult<Vec<Conversation>> {
        fetch_list(self.client, RequestDescriptor::get(CONVERSATIONS_PATH)).await
    }

    /// Open (or reopen) a conversation with `participant_id`.
    pub async fn start_conversation(&self, participant_id: u64) -> ApiResult<Conversation> {
        let descriptor = RequestDescriptor::post(CONVERSATIONS_PATH)
            .with_json(&json!({ "participant_id": participant_id }))?;
        self.client.send_json(descriptor).await
    }

    pub async fn messages(&self, conversation_id: u64) -> ApiResult<Vec<ChatMessage>> {
        fetch_list(
            self.client,
            RequestDescriptor::get(messages_path(conversation_id)),
        )
        .await
    }

    pub async fn send_message(
        &self,
        conversation_id: u64,
        content: &str,
    ) -> ApiResult<ChatMessage> {
        let descriptor = RequestDescriptor::post(messages_path(conversation_id))
            .with_json(&json!({ "content": content }))?;
        self.client.send_json(descriptor).await
    }

    pub async fn mark_read(&self, conversation_id: u64) -> ApiResult<()> {
        self.client
            .send_unit(RequestDescriptor::post(format!(
                "{CONVERSATIONS_PATH}{conversation_id}/mark-read/"
            )))
            .await
    }

    /// Unread messages across all conversations.
    pub async fn unread_count(&self) -> ApiResult<u64> {
        self.client
            .send_json::<UnreadCount>(RequestDescriptor::get(UNREAD_COUNT_PATH))
            .await
            .map(|unread| unread.count)
    }
}
