//! Conversation runtime
//!
//! Owns the draft store and the ledger client, applies pure transitions and
//! executes the one side effect they can call for: submission.

#[cfg(test)]
pub mod testing;

use crate::ledger::{submit_guarded, Ack, LedgerClient, SubmitError};
use crate::state_machine::{self, Choices, Reply, Transition, UserId, ValidationError};
use crate::store::DraftStore;
use chrono::Local;
use std::sync::Arc;
use thiserror::Error;

pub const SUBMIT_OK: &str = "Transaction entered successfully!";
pub const SUBMIT_FAILED: &str = "Failed to enter transaction. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversationError {
    #[error("no active conversation")]
    NoActiveConversation,
}

/// What happened to one input
#[derive(Debug, Clone)]
pub enum Outcome {
    /// Field accepted, next prompt
    Prompt(Reply),
    /// Field rejected, same stage asked again
    Reprompt { reply: Reply, error: ValidationError },
    /// Conversation closed, ledger received the transaction
    Submitted { reply: Reply, ack: Ack },
    /// Conversation closed, submission failed
    Failed { reply: Reply, error: SubmitError },
}

impl Outcome {
    pub fn reply(&self) -> &Reply {
        match self {
            Outcome::Prompt(reply)
            | Outcome::Reprompt { reply, .. }
            | Outcome::Submitted { reply, .. }
            | Outcome::Failed { reply, .. } => reply,
        }
    }

    /// True once the conversation has ended
    #[allow(dead_code)] // State query utility
    pub fn is_terminal(&self) -> bool {
        matches!(self, Outcome::Submitted { .. } | Outcome::Failed { .. })
    }
}

pub struct ConversationRuntime<L> {
    store: Arc<DraftStore>,
    choices: Arc<Choices>,
    ledger: L,
}

impl<L: LedgerClient> ConversationRuntime<L> {
    pub fn new(store: Arc<DraftStore>, choices: Arc<Choices>, ledger: L) -> Self {
        Self {
            store,
            choices,
            ledger,
        }
    }

    #[allow(dead_code)] // Used by tests and diagnostics
    pub fn store(&self) -> &Arc<DraftStore> {
        &self.store
    }

    /// Begin a conversation, discarding any draft the user already had
    pub async fn start(&self, user_id: UserId) -> Reply {
        let mut entry = self.store.lock(user_id).await;
        let (draft, reply) = state_machine::start(user_id, Local::now().fixed_offset());
        if entry.get().is_some() {
            tracing::info!(user_id = %user_id, "Restarting conversation, previous draft discarded");
        } else {
            tracing::info!(user_id = %user_id, "Conversation started");
        }
        entry.set(draft);
        reply
    }

    /// Feed one input to the user's active conversation.
    ///
    /// The user's slot stays locked for the whole call, submission included,
    /// so inputs from the same user are applied strictly one after another.
    pub async fn submit_input(
        &self,
        user_id: UserId,
        text: &str,
    ) -> Result<Outcome, ConversationError> {
        let mut entry = self.store.lock(user_id).await;
        let Some(draft) = entry.get() else {
            return Err(ConversationError::NoActiveConversation);
        };

        match state_machine::transition(draft, &self.choices, text) {
            Transition::Advance { draft, reply } => {
                tracing::debug!(user_id = %user_id, stage = draft.stage.name(), "Field accepted");
                entry.set(draft);
                Ok(Outcome::Prompt(reply))
            }
            Transition::Reprompt { error, reply } => {
                tracing::debug!(user_id = %user_id, error = %error, "Field rejected");
                Ok(Outcome::Reprompt { reply, error })
            }
            Transition::Complete(tx) => {
                // Closed before the call so no outcome can leave it behind
                entry.take();
                let outcome = match submit_guarded(&self.ledger, &tx).await {
                    Ok(ack) => Outcome::Submitted {
                        reply: Reply::plain(SUBMIT_OK),
                        ack,
                    },
                    Err(error) => Outcome::Failed {
                        reply: Reply::plain(SUBMIT_FAILED),
                        error,
                    },
                };
                Ok(outcome)
            }
        }
    }
}
