//! Outbound prompts produced by transitions

use serde::Serialize;

/// Keyboard attached to a reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
#[serde(tag = "type", content = "labels", rename_all = "snake_case")]
pub enum Keyboard {
    /// Plain message, no markup
    #[default]
    None,
    /// Free-text prompt, the client opens a reply field
    ForceReply,
    /// Suggested choices, one per row
    Choices(Vec<String>),
}

/// Text sent back to the user plus optional suggested choices
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reply {
    pub text: String,
    pub keyboard: Keyboard,
}

impl Reply {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: Keyboard::None,
        }
    }

    pub fn force_reply(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: Keyboard::ForceReply,
        }
    }

    pub fn with_choices(text: impl Into<String>, labels: &[String]) -> Self {
        Self {
            text: text.into(),
            keyboard: Keyboard::Choices(labels.to_vec()),
        }
    }

    /// Suggested choices, empty for free-text and plain replies
    #[allow(dead_code)] // State query utility
    pub fn choices(&self) -> &[String] {
        match &self.keyboard {
            Keyboard::Choices(labels) => labels,
            Keyboard::None | Keyboard::ForceReply => &[],
        }
    }
}
