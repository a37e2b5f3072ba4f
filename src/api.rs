//! Webhook HTTP API
//!
//! Receives platform updates and custom payload callbacks and puts them on
//! the dispatch queue. Handlers never wait for the conversation itself.

mod handlers;
mod types;

pub use handlers::create_router;

use crate::dispatch::Inbound;
use tokio::sync::mpsc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub events: mpsc::Sender<Inbound>,
}

impl AppState {
    pub fn new(events: mpsc::Sender<Inbound>) -> Self {
        Self { events }
    }
}
