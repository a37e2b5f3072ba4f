//! Ledger submission error types

use thiserror::Error;

/// Submission failure with classification
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct SubmitError {
    pub kind: SubmitErrorKind,
    pub message: String,
}

impl SubmitError {
    pub fn new(kind: SubmitErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(SubmitErrorKind::Network, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(SubmitErrorKind::Timeout, message)
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        Self::new(SubmitErrorKind::Serialization, message)
    }

    pub fn rejected(status: u16, body: &str) -> Self {
        Self::new(SubmitErrorKind::Rejected { status }, format!("HTTP {status}: {body}"))
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(SubmitErrorKind::Internal, message)
    }
}

/// What went wrong reaching the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitErrorKind {
    /// Connection refused, reset, DNS
    Network,
    /// No response within the configured timeout
    Timeout,
    /// Payload could not be encoded
    Serialization,
    /// Non-2xx response while strict status checking is on
    Rejected { status: u16 },
    /// The client panicked or failed unexpectedly
    Internal,
}
