//! Pure state transition function
//!
//! Given the same draft, choices, and input this always produces the same
//! result. No I/O happens here; submission is the runtime's job.

use super::reply::Reply;
use super::state::{Choices, CompletedTransaction, Draft, Stage, UserId};
use super::validate::{validate_amount, validate_choice, validate_description, ValidationError};
use chrono::{DateTime, FixedOffset};

pub const PROMPT_AMOUNT: &str = "Enter the transaction amount:";
pub const PROMPT_DESCRIPTION: &str = "Enter a description for the transaction:";
pub const PROMPT_CATEGORY: &str = "Select a category:";
pub const PROMPT_SOURCE: &str = "Select a source:";
pub const REPROMPT_AMOUNT: &str = "Invalid amount. Please enter a number.";
pub const REPROMPT_DESCRIPTION: &str = "Description cannot be empty. Enter a description:";
pub const REPROMPT_CATEGORY: &str = "Please select a valid category.";
pub const REPROMPT_SOURCE: &str = "Please select a valid source.";

/// Result of feeding one input to a draft
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Input accepted, draft moved to the next stage
    Advance { draft: Draft, reply: Reply },
    /// Input rejected, stage and fields unchanged
    Reprompt {
        error: ValidationError,
        reply: Reply,
    },
    /// Last field accepted, conversation is terminal
    Complete(CompletedTransaction),
}

/// Fresh draft for `user_id` and the first prompt
pub fn start(user_id: UserId, started_at: DateTime<FixedOffset>) -> (Draft, Reply) {
    (
        Draft::new(user_id, started_at),
        Reply::force_reply(PROMPT_AMOUNT),
    )
}

pub fn transition(draft: &Draft, choices: &Choices, input: &str) -> Transition {
    match &draft.stage {
        Stage::AwaitingAmount => match validate_amount(input) {
            Ok(amount) => Transition::Advance {
                draft: draft.advance(Stage::AwaitingDescription { amount }),
                reply: Reply::force_reply(PROMPT_DESCRIPTION),
            },
            Err(error) => Transition::Reprompt {
                error,
                reply: Reply::plain(REPROMPT_AMOUNT),
            },
        },

        Stage::AwaitingDescription { amount } => match validate_description(input) {
            Ok(description) => Transition::Advance {
                draft: draft.advance(Stage::AwaitingCategory {
                    amount: amount.clone(),
                    description: description.to_string(),
                }),
                reply: Reply::with_choices(PROMPT_CATEGORY, &choices.categories),
            },
            Err(error) => Transition::Reprompt {
                error,
                reply: Reply::force_reply(REPROMPT_DESCRIPTION),
            },
        },

        Stage::AwaitingCategory {
            amount,
            description,
        } => match validate_choice(input, &choices.categories) {
            Ok(category) => Transition::Advance {
                draft: draft.advance(Stage::AwaitingSource {
                    amount: amount.clone(),
                    description: description.clone(),
                    category: category.to_string(),
                }),
                reply: Reply::with_choices(PROMPT_SOURCE, &choices.sources),
            },
            Err(error) => Transition::Reprompt {
                error,
                reply: Reply::with_choices(REPROMPT_CATEGORY, &choices.categories),
            },
        },

        Stage::AwaitingSource {
            amount,
            description,
            category,
        } => match validate_choice(input, &choices.sources) {
            Ok(source) => Transition::Complete(CompletedTransaction {
                user_id: draft.user_id,
                started_at: draft.started_at,
                amount: amount.clone(),
                description: description.clone(),
                category: category.clone(),
                source: source.to_string(),
            }),
            Err(error) => Transition::Reprompt {
                error,
                reply: Reply::with_choices(REPROMPT_SOURCE, &choices.sources),
            },
        },
    }
}
