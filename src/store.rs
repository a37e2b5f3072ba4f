//! In-memory draft store
//!
//! One slot per user. Holding a slot's lock serializes that user's inputs
//! while other users proceed independently. Nothing is persisted.

use crate::state_machine::{Draft, UserId};
use chrono::{DateTime, FixedOffset, Local};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio::task::JoinHandle;

type Slot = Arc<Mutex<Option<Draft>>>;

/// Per-user drafts for the lifetime of the process
#[derive(Default)]
pub struct DraftStore {
    slots: Mutex<HashMap<UserId, Slot>>,
}

/// Exclusive access to one user's draft
pub struct DraftEntry {
    user_id: UserId,
    guard: OwnedMutexGuard<Option<Draft>>,
}

#[allow(dead_code)] // API completeness
impl DraftEntry {
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn get(&self) -> Option<&Draft> {
        self.guard.as_ref()
    }

    /// Replace the user's draft; any previous one is dropped without merging
    pub fn set(&mut self, draft: Draft) {
        debug_assert_eq!(draft.user_id, self.user_id);
        *self.guard = Some(draft);
    }

    pub fn take(&mut self) -> Option<Draft> {
        self.guard.take()
    }
}

#[allow(dead_code)] // get/set/delete are the store's public surface
impl DraftStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn slot(&self, user_id: UserId) -> Slot {
        let mut slots = self.slots.lock().await;
        Arc::clone(slots.entry(user_id).or_default())
    }

    /// Lock a user's slot. Waits for any in-flight input of the same user.
    pub async fn lock(&self, user_id: UserId) -> DraftEntry {
        let guard = self.slot(user_id).await.lock_owned().await;
        DraftEntry { user_id, guard }
    }

    pub async fn get(&self, user_id: UserId) -> Option<Draft> {
        self.lock(user_id).await.get().cloned()
    }

    pub async fn set(&self, draft: Draft) {
        self.lock(draft.user_id).await.set(draft);
    }

    pub async fn delete(&self, user_id: UserId) -> Option<Draft> {
        self.lock(user_id).await.take()
    }

    /// Number of users with an active draft
    pub async fn active_count(&self) -> usize {
        let slots: Vec<Slot> = self.slots.lock().await.values().cloned().collect();
        let mut count = 0;
        for slot in slots {
            if slot.lock().await.is_some() {
                count += 1;
            }
        }
        count
    }

    /// Drop drafts started before `cutoff` and release empty slots.
    /// Returns how many drafts were dropped.
    pub async fn expire_started_before(&self, cutoff: DateTime<FixedOffset>) -> usize {
        let slots: Vec<(UserId, Slot)> = self
            .slots
            .lock()
            .await
            .iter()
            .map(|(id, slot)| (*id, Arc::clone(slot)))
            .collect();

        let mut expired = 0;
        for (user_id, slot) in slots {
            let mut draft = slot.lock().await;
            if draft.as_ref().is_some_and(|d| d.started_at < cutoff) {
                *draft = None;
                expired += 1;
                tracing::info!(user_id = %user_id, "Expired idle draft");
            }
        }

        // A slot referenced only by the map has no waiter and can go if empty
        self.slots.lock().await.retain(|_, slot| {
            Arc::strong_count(slot) > 1 || slot.try_lock().map_or(true, |d| d.is_some())
        });

        expired
    }
}

/// Periodically expire drafts older than `ttl`
pub fn spawn_expiry_sweeper(store: Arc<DraftStore>, ttl: Duration) -> JoinHandle<()> {
    let period = (ttl / 4).max(Duration::from_secs(1));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            let Ok(age) = chrono::Duration::from_std(ttl) else {
                tracing::error!(
                    ttl_secs = ttl.as_secs(),
                    "Draft TTL out of range, sweeper stopped"
                );
                return;
            };
            let cutoff = Local::now().fixed_offset() - age;
            let expired = store.expire_started_before(cutoff).await;
            if expired > 0 {
                tracing::debug!(expired, "Draft sweep finished");
            }
        }
    })
}
