//! Firefly III transactions API client

use super::types::{Ack, TransactionBatch};
use super::{LedgerClient, SubmitError};
use crate::config::LedgerConfig;
use crate::state_machine::CompletedTransaction;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use uuid::Uuid;

pub const TRACE_HEADER: &str = "X-Trace-Id";

/// Posts one transaction batch per call, no retries
pub struct FireflyClient {
    client: Client,
    endpoint: String,
    token: String,
    strict_status: bool,
}

impl FireflyClient {
    pub fn new(config: &LedgerConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            token: config.token.clone(),
            strict_status: config.strict_status,
        })
    }
}

#[async_trait]
impl LedgerClient for FireflyClient {
    async fn submit(&self, tx: &CompletedTransaction) -> Result<Ack, SubmitError> {
        let trace_id = Uuid::new_v4();
        let body = serde_json::to_vec(&TransactionBatch::from(tx))
            .map_err(|e| SubmitError::serialization(format!("Failed to encode batch: {e}")))?;

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .header(TRACE_HEADER, trace_id.to_string())
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SubmitError::timeout(format!("Request timeout: {e}"))
                } else if e.is_connect() {
                    SubmitError::network(format!("Connection failed: {e}"))
                } else {
                    SubmitError::network(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            // The body is only read for diagnostics; a read failure is not fatal
            let body = response.text().await.unwrap_or_default();
            if self.strict_status {
                return Err(SubmitError::rejected(status.as_u16(), &body));
            }
            tracing::warn!(
                trace_id = %trace_id,
                status = status.as_u16(),
                body = %body,
                "Ledger answered with an error status, treating as received"
            );
        }

        Ok(Ack {
            trace_id,
            status: status.as_u16(),
        })
    }
}
