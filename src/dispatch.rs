//! Inbound dispatch
//!
//! Every inbound event goes through one queue. A single loop forwards each
//! event to a worker task owned by its user, so a user's events are handled
//! strictly in arrival order while different users proceed in parallel.

use crate::ledger::LedgerClient;
use crate::runtime::{ConversationError, ConversationRuntime, Outcome};
use crate::state_machine::{Reply, UserId};
use crate::telegram::{escape_html, mention_html, ChatTransport, Update};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

pub const WELCOME: &str =
    "Welcome! I'm a bot that helps you enter transactions. Use /enter_transaction to start.";
pub const NO_CONVERSATION: &str = "Use /enter_transaction to start.";

const WORKER_QUEUE: usize = 64;
/// Payloads remembered per user; older ones fall off the notification
const PAYLOAD_HISTORY: usize = 50;
const WORKER_IDLE: Duration = Duration::from_secs(300);

/// One unit of inbound work
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// Text typed by a user in a chat
    Message {
        chat_id: i64,
        user_id: UserId,
        text: String,
    },
    /// Out-of-band payload posted to the custom callback endpoint
    Payload { user_id: UserId, payload: String },
}

impl Inbound {
    /// Text messages with a sender; everything else is not for us
    pub fn from_update(update: Update) -> Option<Self> {
        let message = update.message?;
        let user = message.from?;
        let text = message.text?;
        Some(Inbound::Message {
            chat_id: message.chat.id,
            user_id: UserId(user.id),
            text,
        })
    }

    pub fn user_id(&self) -> UserId {
        match self {
            Inbound::Message { user_id, .. } | Inbound::Payload { user_id, .. } => *user_id,
        }
    }
}

/// Bot commands this dispatcher understands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    EnterTransaction,
    Other(String),
}

/// Parse `/name` or `/name@botname`, ignoring trailing arguments
pub fn parse_command(text: &str) -> Option<Command> {
    let word = text.trim_start().strip_prefix('/')?.split_whitespace().next()?;
    let name = word.split('@').next().unwrap_or(word);
    Some(match name {
        "start" => Command::Start,
        "help" => Command::Help,
        "enter_transaction" => Command::EnterTransaction,
        other => Command::Other(other.to_string()),
    })
}

/// Admin notification for a user's payload history
pub fn payload_notification(user_id: UserId, name: &str, payloads: &[String]) -> String {
    let combined = payloads
        .iter()
        .map(|p| escape_html(p))
        .collect::<Vec<_>>()
        .join("</code>\n• <code>");
    format!(
        "The user {} has sent a new payload. \
         So far they have sent the following payloads: \n\n• <code>{combined}</code>",
        mention_html(user_id, name)
    )
}

pub struct Dispatcher<L, T> {
    runtime: Arc<ConversationRuntime<L>>,
    transport: T,
    admin_chat_id: Option<i64>,
    payloads: Mutex<HashMap<UserId, Vec<String>>>,
    worker_idle: Duration,
}

impl<L, T> Dispatcher<L, T>
where
    L: LedgerClient + 'static,
    T: ChatTransport + 'static,
{
    pub fn new(
        runtime: Arc<ConversationRuntime<L>>,
        transport: T,
        admin_chat_id: Option<i64>,
    ) -> Self {
        Self {
            runtime,
            transport,
            admin_chat_id,
            payloads: Mutex::new(HashMap::new()),
            worker_idle: WORKER_IDLE,
        }
    }

    /// How long a user's worker lingers without events before exiting
    pub fn with_worker_idle(mut self, idle: Duration) -> Self {
        self.worker_idle = idle;
        self
    }

    /// Handle one event to completion
    pub async fn handle(&self, event: Inbound) {
        match event {
            Inbound::Message {
                chat_id,
                user_id,
                text,
            } => self.handle_message(chat_id, user_id, &text).await,
            Inbound::Payload { user_id, payload } => self.handle_payload(user_id, payload).await,
        }
    }

    async fn handle_message(&self, chat_id: i64, user_id: UserId, text: &str) {
        let reply = match parse_command(text) {
            Some(Command::Start | Command::Help) => Reply::plain(WELCOME),
            Some(Command::EnterTransaction) => self.runtime.start(user_id).await,
            Some(Command::Other(name)) => {
                tracing::debug!(user_id = %user_id, command = %name, "Ignoring unknown command");
                return;
            }
            None => match self.runtime.submit_input(user_id, text).await {
                Ok(outcome) => {
                    if let Outcome::Failed { error, .. } = &outcome {
                        tracing::warn!(
                            user_id = %user_id,
                            error = %error,
                            "Conversation closed without submission"
                        );
                    }
                    outcome.reply().clone()
                }
                Err(ConversationError::NoActiveConversation) => Reply::plain(NO_CONVERSATION),
            },
        };

        if let Err(e) = self.transport.send_reply(chat_id, &reply).await {
            tracing::error!(chat_id, user_id = %user_id, error = %e, "Failed to send reply");
        }
    }

    async fn handle_payload(&self, user_id: UserId, payload: String) {
        let history = {
            let mut payloads = self.payloads.lock().await;
            let entry = payloads.entry(user_id).or_default();
            entry.push(payload);
            if entry.len() > PAYLOAD_HISTORY {
                let excess = entry.len() - PAYLOAD_HISTORY;
                entry.drain(..excess);
            }
            entry.clone()
        };

        let name = match self.transport.display_name(user_id).await {
            Ok(name) => name,
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "Could not resolve user name");
                user_id.to_string()
            }
        };
        let text = payload_notification(user_id, &name, &history);

        match self.admin_chat_id {
            Some(admin) => {
                if let Err(e) = self.transport.send_html(admin, &text).await {
                    tracing::error!(user_id = %user_id, error = %e, "Failed to notify admin");
                }
            }
            None => {
                tracing::info!(
                    user_id = %user_id,
                    payloads = history.len(),
                    "Payload received, no admin chat configured"
                );
            }
        }
    }

    /// Start a worker for `user_id`. It waits for `previous`, the user's
    /// last worker, so events still draining there are handled first.
    fn spawn_worker(self: &Arc<Self>, user_id: UserId, previous: Option<JoinHandle<()>>) -> Worker {
        let (tx, mut rx) = mpsc::channel(WORKER_QUEUE);
        let dispatcher = Arc::clone(self);
        let handle = tokio::spawn(async move {
            if let Some(previous) = previous {
                let _ = previous.await;
            }
            tracing::debug!(user_id = %user_id, "User worker started");
            loop {
                match tokio::time::timeout(dispatcher.worker_idle, rx.recv()).await {
                    Ok(Some(event)) => dispatcher.handle(event).await,
                    Ok(None) => break,
                    Err(_) => {
                        // Refuse new events, then finish whatever was already queued
                        rx.close();
                        while let Some(event) = rx.recv().await {
                            dispatcher.handle(event).await;
                        }
                        break;
                    }
                }
            }
            tracing::debug!(user_id = %user_id, "User worker stopped");
        });
        Worker { tx, handle }
    }

    /// Forward queued events to per-user workers until the queue closes
    pub fn spawn(self: Arc<Self>, mut events: mpsc::Receiver<Inbound>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut workers: HashMap<UserId, Worker> = HashMap::new();
            while let Some(event) = events.recv().await {
                let user_id = event.user_id();
                let mut pending = event;
                let mut previous = None;
                loop {
                    let worker = workers
                        .entry(user_id)
                        .or_insert_with(|| self.spawn_worker(user_id, previous.take()));
                    // Never waits, so a busy user cannot hold up the others
                    let sent = worker.tx.try_send(pending);
                    match sent {
                        Ok(()) => break,
                        Err(TrySendError::Full(dropped)) => {
                            tracing::warn!(
                                user_id = %user_id,
                                event = ?dropped,
                                "User worker backlog full, dropping event"
                            );
                            break;
                        }
                        // Worker went idle and stopped accepting; chain a fresh one
                        Err(TrySendError::Closed(returned)) => {
                            previous = workers.remove(&user_id).map(|w| w.handle);
                            pending = returned;
                        }
                    }
                }
                workers.retain(|_, worker| !worker.handle.is_finished());
            }
            tracing::info!("Dispatch loop stopped");
        })
    }
}

struct Worker {
    tx: mpsc::Sender<Inbound>,
    handle: JoinHandle<()>,
}
