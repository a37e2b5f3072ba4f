//! Bot API client

use super::types::{ApiResponse, ChatMember, SendMessage, SetWebhook, ALL_UPDATE_TYPES};
use super::{ChatTransport, TelegramError};
use crate::state_machine::{Reply, UserId};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

const API_BASE: &str = "https://api.telegram.org";

pub struct TelegramClient {
    client: Client,
    base_url: String,
}

impl TelegramClient {
    pub fn new(token: &str) -> Result<Self, reqwest::Error> {
        Self::with_api_base(API_BASE, token)
    }

    /// Client against a non-default Bot API server
    pub fn with_api_base(api_base: &str, token: &str) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            client,
            base_url: format!("{}/bot{token}", api_base.trim_end_matches('/')),
        })
    }

    async fn call<B, T>(&self, method: &'static str, body: &B) -> Result<T, TelegramError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned + Send,
    {
        let response: ApiResponse<T> = self
            .client
            .post(format!("{}/{method}", self.base_url))
            .json(body)
            .send()
            .await?
            .json()
            .await?;

        match response {
            ApiResponse {
                ok: true,
                result: Some(result),
                ..
            } => Ok(result),
            ApiResponse { description, .. } => Err(TelegramError::Api {
                method,
                description: description.unwrap_or_else(|| "no description".to_string()),
            }),
        }
    }

    /// Point the platform at `<webhook_url>/telegram`
    pub async fn set_webhook(&self, webhook_url: &str) -> Result<(), TelegramError> {
        let url = format!("{}/telegram", webhook_url.trim_end_matches('/'));
        let body = SetWebhook {
            url: &url,
            allowed_updates: ALL_UPDATE_TYPES,
        };
        let _: bool = self.call("setWebhook", &body).await?;
        tracing::info!(url = %url, "Webhook registered");
        Ok(())
    }

    async fn send(&self, message: &SendMessage<'_>) -> Result<(), TelegramError> {
        let _: serde_json::Value = self.call("sendMessage", message).await?;
        Ok(())
    }
}

#[async_trait]
impl ChatTransport for TelegramClient {
    async fn send_reply(&self, chat_id: i64, reply: &Reply) -> Result<(), TelegramError> {
        self.send(&SendMessage::reply(chat_id, reply)).await
    }

    async fn send_html(&self, chat_id: i64, html: &str) -> Result<(), TelegramError> {
        self.send(&SendMessage::html(chat_id, html)).await
    }

    async fn display_name(&self, user_id: UserId) -> Result<String, TelegramError> {
        let body = serde_json::json!({ "chat_id": user_id.0, "user_id": user_id.0 });
        let member: ChatMember = self.call("getChatMember", &body).await?;
        Ok(member.user.full_name())
    }
}
