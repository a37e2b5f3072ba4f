//! API request and response types

use serde::{Deserialize, Serialize};

/// Query string of the custom payload callback. Both fields are required;
/// they are optional here so the handler can answer with a useful 400.
#[derive(Debug, Deserialize)]
pub struct PayloadQuery {
    pub user_id: Option<String>,
    pub payload: Option<String>,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
