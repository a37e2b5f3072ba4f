//! Firefly Bot - record ledger transactions from a chat
//!
//! Walks a user through amount, description, category and source, then
//! posts the transaction to the Firefly III API.

mod api;
mod config;
mod dispatch;
mod ledger;
mod runtime;
mod state_machine;
mod store;
mod telegram;

use api::{create_router, AppState};
use config::BotConfig;
use dispatch::Dispatcher;
use ledger::{FireflyClient, LoggingLedger};
use runtime::ConversationRuntime;
use std::net::SocketAddr;
use std::sync::Arc;
use store::DraftStore;
use telegram::TelegramClient;
use tokio::sync::mpsc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const EVENT_QUEUE: usize = 1024;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "firefly_bot=info,tower_http=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let config = BotConfig::from_env()?;
    if config.choices.categories.is_empty() || config.choices.sources.is_empty() {
        tracing::warn!(
            categories = config.choices.categories.len(),
            sources = config.choices.sources.len(),
            "A choice list is empty; conversations cannot complete"
        );
    }
    tracing::info!(
        categories = ?config.choices.categories,
        sources = ?config.choices.sources,
        ledger = %config.ledger.endpoint,
        "Configuration loaded"
    );

    // Core
    let store = Arc::new(DraftStore::new());
    if let Some(ttl) = config.draft_ttl {
        tracing::info!(ttl_secs = ttl.as_secs(), "Draft idle expiry enabled");
        store::spawn_expiry_sweeper(Arc::clone(&store), ttl);
    }
    let ledger = LoggingLedger::new(FireflyClient::new(&config.ledger)?);
    let runtime = Arc::new(ConversationRuntime::new(
        store,
        Arc::new(config.choices.clone()),
        ledger,
    ));

    // Transport and dispatch
    let telegram = Arc::new(TelegramClient::new(&config.bot_token)?);
    if let Err(e) = telegram.set_webhook(&config.webhook_url).await {
        tracing::warn!(error = %e, "Failed to register webhook");
    }
    let (events_tx, events_rx) = mpsc::channel(EVENT_QUEUE);
    let dispatcher = Arc::new(Dispatcher::new(
        runtime,
        Arc::clone(&telegram),
        config.admin_chat_id,
    ));
    dispatcher.spawn(events_rx);

    // Start server
    let app = create_router(AppState::new(events_tx)).layer(TraceLayer::new_for_http());
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Firefly bot listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
