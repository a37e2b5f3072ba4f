//! Ledger wire format

use crate::state_machine::CompletedTransaction;
use bigdecimal::BigDecimal;
use chrono::SecondsFormat;
use serde::{ser::Error as _, Serialize, Serializer};
use uuid::Uuid;

/// Transaction kinds the ledger accepts. This flow only records expenses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Withdrawal,
}

/// Request body: a batch of transaction splits
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionBatch {
    pub transactions: Vec<TransactionSplit>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionSplit {
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// ISO-8601 with offset
    pub date: String,
    #[serde(serialize_with = "amount_as_number")]
    pub amount: BigDecimal,
    pub description: String,
    pub category_name: String,
    pub source_name: String,
}

impl From<&CompletedTransaction> for TransactionBatch {
    fn from(tx: &CompletedTransaction) -> Self {
        Self {
            transactions: vec![TransactionSplit {
                kind: TransactionType::Withdrawal,
                date: tx.started_at.to_rfc3339_opts(SecondsFormat::Secs, false),
                amount: tx.amount.clone(),
                description: tx.description.clone(),
                category_name: tx.category.clone(),
                source_name: tx.source.clone(),
            }],
        }
    }
}

/// The ledger takes a JSON number; amounts beyond `f64` range cannot be sent
fn amount_as_number<S: Serializer>(amount: &BigDecimal, serializer: S) -> Result<S::Ok, S::Error> {
    // Going through the decimal text keeps the f64 correctly rounded
    let value = amount.to_string().parse::<f64>().ok();
    match value.filter(|value| value.is_finite()) {
        Some(value) => serializer.serialize_f64(value),
        None => Err(S::Error::custom(format!("amount {amount} is out of range"))),
    }
}

/// The ledger received the submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ack {
    /// Value sent in `X-Trace-Id`
    pub trace_id: Uuid,
    pub status: u16,
}
