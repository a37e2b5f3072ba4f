//! Ledger API abstraction
//!
//! One outbound request per completed conversation. The runtime only sees
//! the [`LedgerClient`] trait so tests can swap in a mock.

mod error;
mod firefly;
mod types;

pub use error::SubmitError;
#[allow(unused_imports)] // Public API re-exports
pub use error::SubmitErrorKind;
pub use firefly::FireflyClient;
pub use types::Ack;

use crate::state_machine::CompletedTransaction;
use async_trait::async_trait;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

/// Client for the remote ledger
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Submit a completed transaction. At most one attempt, never retried.
    async fn submit(&self, tx: &CompletedTransaction) -> Result<Ack, SubmitError>;
}

#[async_trait]
impl<T: LedgerClient + ?Sized> LedgerClient for Arc<T> {
    async fn submit(&self, tx: &CompletedTransaction) -> Result<Ack, SubmitError> {
        (**self).submit(tx).await
    }
}

/// Logging wrapper for ledger clients
pub struct LoggingLedger<L> {
    inner: L,
}

impl<L: LedgerClient> LoggingLedger<L> {
    pub fn new(inner: L) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<L: LedgerClient> LedgerClient for LoggingLedger<L> {
    async fn submit(&self, tx: &CompletedTransaction) -> Result<Ack, SubmitError> {
        let start = std::time::Instant::now();
        let result = self.inner.submit(tx).await;
        let duration = start.elapsed();

        match &result {
            Ok(ack) => {
                tracing::info!(
                    user_id = %tx.user_id,
                    trace_id = %ack.trace_id,
                    status = ack.status,
                    duration_ms = %duration.as_millis(),
                    amount = %tx.amount,
                    category = %tx.category,
                    source = %tx.source,
                    "Transaction submitted"
                );
            }
            Err(e) => {
                tracing::error!(
                    user_id = %tx.user_id,
                    duration_ms = %duration.as_millis(),
                    kind = ?e.kind,
                    error = %e.message,
                    "Transaction submission failed"
                );
            }
        }

        result
    }
}

/// Submit and turn a panic inside the client into [`SubmitError`], so the
/// conversation always terminates cleanly.
pub async fn submit_guarded<L: LedgerClient + ?Sized>(
    ledger: &L,
    tx: &CompletedTransaction,
) -> Result<Ack, SubmitError> {
    match AssertUnwindSafe(ledger.submit(tx)).catch_unwind().await {
        Ok(result) => result,
        Err(panic) => {
            let message = panic
                .downcast_ref::<&str>()
                .map(ToString::to_string)
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "ledger client panicked".to_string());
            Err(SubmitError::internal(message))
        }
    }
}
