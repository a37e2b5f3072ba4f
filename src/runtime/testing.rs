//! Mock implementations for testing
//!
//! These mocks enable integration testing without real I/O.

use crate::ledger::{Ack, LedgerClient, SubmitError};
use crate::state_machine::{CompletedTransaction, Reply, UserId};
use crate::telegram::{ChatTransport, TelegramError};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;
use uuid::Uuid;

// ============================================================================
// Mock Ledger Client
// ============================================================================

/// Ledger that acknowledges everything unless an error was queued
pub struct MockLedgerClient {
    results: Mutex<VecDeque<Result<Ack, SubmitError>>>,
    delay: Option<Duration>,
    /// Record of every submission
    pub submissions: Mutex<Vec<CompletedTransaction>>,
}

#[allow(dead_code)]
impl MockLedgerClient {
    pub fn new() -> Self {
        Self {
            results: Mutex::new(VecDeque::new()),
            delay: None,
            submissions: Mutex::new(Vec::new()),
        }
    }

    /// Sleep before answering, to widen race windows
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn queue_error(&self, error: SubmitError) {
        self.results.lock().unwrap().push_back(Err(error));
    }

    pub fn queue_status(&self, status: u16) {
        self.results.lock().unwrap().push_back(Ok(Ack {
            trace_id: Uuid::new_v4(),
            status,
        }));
    }

    pub fn recorded_submissions(&self) -> Vec<CompletedTransaction> {
        self.submissions.lock().unwrap().clone()
    }
}

impl Default for MockLedgerClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerClient for MockLedgerClient {
    async fn submit(&self, tx: &CompletedTransaction) -> Result<Ack, SubmitError> {
        self.submissions.lock().unwrap().push(tx.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.results.lock().unwrap().pop_front().unwrap_or_else(|| {
            Ok(Ack {
                trace_id: Uuid::new_v4(),
                status: 200,
            })
        })
    }
}

/// Ledger whose client code blows up
pub struct PanickingLedgerClient;

#[async_trait]
impl LedgerClient for PanickingLedgerClient {
    async fn submit(&self, _tx: &CompletedTransaction) -> Result<Ack, SubmitError> {
        panic!("ledger client bug");
    }
}

// ============================================================================
// Mock Chat Transport
// ============================================================================

/// Transport that records everything it is asked to send
#[derive(Default)]
pub struct MockTransport {
    names: HashMap<UserId, String>,
    /// `(chat_id, reply)` in send order
    pub replies: Mutex<Vec<(i64, Reply)>>,
    /// `(chat_id, html)` in send order
    pub notifications: Mutex<Vec<(i64, String)>>,
}

#[allow(dead_code)]
impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, user_id: UserId, name: impl Into<String>) -> Self {
        self.names.insert(user_id, name.into());
        self
    }

    pub fn recorded_replies(&self) -> Vec<(i64, Reply)> {
        self.replies.lock().unwrap().clone()
    }

    pub fn reply_texts(&self, chat_id: i64) -> Vec<String> {
        self.replies
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| *id == chat_id)
            .map(|(_, reply)| reply.text.clone())
            .collect()
    }

    pub fn recorded_notifications(&self) -> Vec<(i64, String)> {
        self.notifications.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatTransport for MockTransport {
    async fn send_reply(&self, chat_id: i64, reply: &Reply) -> Result<(), TelegramError> {
        self.replies.lock().unwrap().push((chat_id, reply.clone()));
        Ok(())
    }

    async fn send_html(&self, chat_id: i64, html: &str) -> Result<(), TelegramError> {
        self.notifications
            .lock()
            .unwrap()
            .push((chat_id, html.to_string()));
        Ok(())
    }

    async fn display_name(&self, user_id: UserId) -> Result<String, TelegramError> {
        self.names.get(&user_id).cloned().ok_or(TelegramError::Api {
            method: "getChatMember",
            description: "user not found".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::SubmitErrorKind;
    use chrono::{FixedOffset, TimeZone};
    use bigdecimal::BigDecimal;

    fn sample() -> CompletedTransaction {
        CompletedTransaction {
            user_id: UserId(1),
            started_at: FixedOffset::east_opt(0)
                .unwrap()
                .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
                .unwrap(),
            amount: BigDecimal::from(1),
            description: "d".to_string(),
            category: "c".to_string(),
            source: "s".to_string(),
        }
    }

    #[tokio::test]
    async fn test_mock_ledger_queue_then_default() {
        let mock = MockLedgerClient::new();
        mock.queue_error(SubmitError::timeout("slow"));
        mock.queue_status(500);

        let err = mock.submit(&sample()).await.unwrap_err();
        assert_eq!(err.kind, SubmitErrorKind::Timeout);
        assert_eq!(mock.submit(&sample()).await.unwrap().status, 500);
        assert_eq!(mock.submit(&sample()).await.unwrap().status, 200);
        assert_eq!(mock.recorded_submissions().len(), 3);
    }

    #[tokio::test]
    async fn test_mock_transport_records() {
        let transport = MockTransport::new().with_name(UserId(1), "Ada");
        transport.send_reply(1, &Reply::plain("a")).await.unwrap();
        transport.send_html(2, "<b>b</b>").await.unwrap();

        assert_eq!(transport.reply_texts(1), vec!["a"]);
        assert_eq!(transport.recorded_notifications(), vec![(2, "<b>b</b>".to_string())]);
        assert_eq!(transport.display_name(UserId(1)).await.unwrap(), "Ada");
        assert!(transport.display_name(UserId(2)).await.is_err());
    }
}
