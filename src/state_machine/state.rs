//! Draft and stage types

use chrono::{DateTime, FixedOffset};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identity of a chat user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Allowed choices
// ============================================================================

/// Allowed labels for the categorical fields, loaded once at startup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Choices {
    pub categories: Vec<String>,
    pub sources: Vec<String>,
}

impl Choices {
    pub fn new(categories: Vec<String>, sources: Vec<String>) -> Self {
        Self {
            categories,
            sources,
        }
    }
}

// ============================================================================
// Conversation stage
// ============================================================================

/// Where a conversation is in the prompt sequence.
///
/// Each variant carries exactly the fields collected so far, so a draft can
/// never hold a category without an amount and description before it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Stage {
    AwaitingAmount,
    AwaitingDescription {
        amount: BigDecimal,
    },
    AwaitingCategory {
        amount: BigDecimal,
        description: String,
    },
    AwaitingSource {
        amount: BigDecimal,
        description: String,
        category: String,
    },
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::AwaitingAmount => "awaiting_amount",
            Stage::AwaitingDescription { .. } => "awaiting_description",
            Stage::AwaitingCategory { .. } => "awaiting_category",
            Stage::AwaitingSource { .. } => "awaiting_source",
        }
    }
}

/// In-progress transaction for one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Draft {
    pub user_id: UserId,
    pub started_at: DateTime<FixedOffset>,
    pub stage: Stage,
}

#[allow(dead_code)] // Field accessors for callers holding a draft
impl Draft {
    pub fn new(user_id: UserId, started_at: DateTime<FixedOffset>) -> Self {
        Self {
            user_id,
            started_at,
            stage: Stage::AwaitingAmount,
        }
    }

    pub fn amount(&self) -> Option<&BigDecimal> {
        match &self.stage {
            Stage::AwaitingAmount => None,
            Stage::AwaitingDescription { amount }
            | Stage::AwaitingCategory { amount, .. }
            | Stage::AwaitingSource { amount, .. } => Some(amount),
        }
    }

    pub fn description(&self) -> Option<&str> {
        match &self.stage {
            Stage::AwaitingCategory { description, .. }
            | Stage::AwaitingSource { description, .. } => Some(description),
            Stage::AwaitingAmount | Stage::AwaitingDescription { .. } => None,
        }
    }

    pub fn category(&self) -> Option<&str> {
        match &self.stage {
            Stage::AwaitingSource { category, .. } => Some(category),
            _ => None,
        }
    }

    /// Same draft moved to the next stage
    pub(crate) fn advance(&self, stage: Stage) -> Self {
        Self {
            user_id: self.user_id,
            started_at: self.started_at,
            stage,
        }
    }
}

/// A draft with every field filled in, ready for the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletedTransaction {
    pub user_id: UserId,
    pub started_at: DateTime<FixedOffset>,
    pub amount: BigDecimal,
    pub description: String,
    pub category: String,
    pub source: String,
}
