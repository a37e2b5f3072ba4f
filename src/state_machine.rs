//! Transaction entry state machine
//!
//! Pure transitions over an explicit stage enum. The runtime owns the draft
//! store and the ledger client and executes whatever the transition decides.

mod reply;
pub mod state;
pub(crate) mod transition;
pub mod validate;

#[cfg(test)]
mod proptests;

pub use reply::{Keyboard, Reply};
#[allow(unused_imports)] // Stage is matched on by callers' tests
pub use state::{Choices, CompletedTransaction, Draft, Stage, UserId};
pub use transition::{start, transition, Transition};
pub use validate::ValidationError;
