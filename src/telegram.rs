//! Chat transport
//!
//! The dispatcher talks to the chat platform only through [`ChatTransport`].
//! [`TelegramClient`] implements it over the Bot API.

mod client;
mod types;

pub use client::TelegramClient;
pub use types::Update;

use crate::state_machine::{Reply, UserId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("request to bot API failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("bot API rejected {method}: {description}")]
    Api {
        method: &'static str,
        description: String,
    },
}

/// Outbound side of the chat platform
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send a prompt or result to a chat, with its keyboard
    async fn send_reply(&self, chat_id: i64, reply: &Reply) -> Result<(), TelegramError>;

    /// Send an HTML-formatted notification
    async fn send_html(&self, chat_id: i64, html: &str) -> Result<(), TelegramError>;

    /// Human-readable name of a user, for mentions
    async fn display_name(&self, user_id: UserId) -> Result<String, TelegramError>;
}

#[async_trait]
impl<T: ChatTransport + ?Sized> ChatTransport for Arc<T> {
    async fn send_reply(&self, chat_id: i64, reply: &Reply) -> Result<(), TelegramError> {
        (**self).send_reply(chat_id, reply).await
    }

    async fn send_html(&self, chat_id: i64, html: &str) -> Result<(), TelegramError> {
        (**self).send_html(chat_id, html).await
    }

    async fn display_name(&self, user_id: UserId) -> Result<String, TelegramError> {
        (**self).display_name(user_id).await
    }
}

/// Escape text for the Bot API's HTML parse mode
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Inline mention that links to the user's profile
pub fn mention_html(user_id: UserId, name: &str) -> String {
    format!("<a href=\"tg://user?id={user_id}\">{}</a>", escape_html(name))
}
