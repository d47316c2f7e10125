use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use tracing::debug;

use crate::dialogue::states::{ConversationRecord, DialogueState};
use crate::domain::order::{DraftPatch, OrderDraft};
use crate::domain::party::PartyId;

/// Inactivity window after which a conversation is treated as abandoned.
pub const DEFAULT_TTL_MINUTES: i64 = 30;

/// Injected time source so expiry and order-id generation are testable.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Settable clock for tests and offline tooling.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn starting_at(now: DateTime<Utc>) -> Self {
        Self { now: Mutex::new(now) }
    }

    pub fn advance(&self, delta: Duration) {
        let mut guard = self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard += delta;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[derive(Clone, Debug)]
struct ConversationEntry {
    state: DialogueState,
    draft: Option<OrderDraft>,
    last_activity_at: DateTime<Utc>,
}

impl ConversationEntry {
    fn fresh(now: DateTime<Utc>) -> Self {
        Self { state: DialogueState::Idle, draft: None, last_activity_at: now }
    }
}

/// Locked view of one party's conversation, handed to `with_party`
/// closures. Mutations apply in place; `clear` takes effect when the
/// closure returns.
pub struct ConversationAccess<'a> {
    entry: &'a mut ConversationEntry,
    now: DateTime<Utc>,
    cleared: bool,
}

impl ConversationAccess<'_> {
    pub fn state(&self) -> DialogueState {
        self.entry.state
    }

    pub fn set_state(&mut self, state: DialogueState) {
        self.entry.state = state;
        self.entry.last_activity_at = self.now;
        self.cleared = false;
    }

    pub fn merge_draft(&mut self, patch: DraftPatch) {
        patch.apply_to(self.entry.draft.get_or_insert_with(OrderDraft::default));
    }

    pub fn draft(&self) -> OrderDraft {
        self.entry.draft.clone().unwrap_or_default()
    }

    pub fn clear(&mut self) {
        self.cleared = true;
    }
}

/// Per-party conversation state with time-based expiry.
///
/// A single lock guards the whole map: every operation is a short
/// in-memory mutation, and holding the lock across each read-modify-write
/// keeps get/set/clear/sweep atomic with respect to one another, so the
/// sweep can never observe a half-written record. Whole dialogue steps
/// go through `with_party`, which holds the same lock across the step so
/// two messages from one party can never interleave mid-transition.
pub struct ConversationStore {
    entries: Mutex<HashMap<PartyId, ConversationEntry>>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock), Duration::minutes(DEFAULT_TTL_MINUTES))
    }
}

impl ConversationStore {
    pub fn new(clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self { entries: Mutex::new(HashMap::new()), clock, ttl }
    }

    /// Runs one dialogue step for the party while holding the map lock,
    /// so concurrent messages from the same party serialize: each step
    /// sees exactly the state the previous one wrote. Expired records
    /// are dropped before the step runs, as in `state_of`. The closure
    /// must stay synchronous and lock-free toward this store.
    pub fn with_party<T>(
        &self,
        party_id: &PartyId,
        step: impl FnOnce(&mut ConversationAccess<'_>) -> T,
    ) -> T {
        let now = self.clock.now();
        let mut entries = self.lock_entries();

        let expired = entries
            .get(party_id)
            .is_some_and(|entry| now - entry.last_activity_at > self.ttl);
        if expired {
            debug!(event_name = "store.conversation_expired", party_id = %party_id, "conversation expired on access");
            entries.remove(party_id);
        }

        let entry = entries
            .entry(party_id.clone())
            .or_insert_with(|| ConversationEntry::fresh(now));

        let mut access = ConversationAccess { entry, now, cleared: false };
        let result = step(&mut access);
        let cleared = access.cleared;
        if cleared {
            entries.remove(party_id);
            debug!(event_name = "store.conversation_cleared", party_id = %party_id, "conversation cleared");
        }
        result
    }

    /// Returns the party's record, synthesizing a fresh `Idle` one when
    /// none exists or the existing one has expired. An expired record is
    /// cleared (state and draft both) before the fresh record is returned.
    pub fn state_of(&self, party_id: &PartyId) -> ConversationRecord {
        let now = self.clock.now();
        let mut entries = self.lock_entries();

        let expired = entries
            .get(party_id)
            .is_some_and(|entry| now - entry.last_activity_at > self.ttl);
        if expired {
            debug!(event_name = "store.conversation_expired", party_id = %party_id, "conversation expired on access");
            entries.remove(party_id);
        }

        let entry = entries
            .entry(party_id.clone())
            .or_insert_with(|| ConversationEntry::fresh(now));

        ConversationRecord {
            party_id: party_id.clone(),
            state: entry.state,
            last_activity_at: entry.last_activity_at,
        }
    }

    /// Overwrites the dialogue state and resets the activity timestamp.
    /// The order draft is untouched.
    pub fn set_state(&self, party_id: &PartyId, state: DialogueState) {
        let now = self.clock.now();
        let mut entries = self.lock_entries();
        let entry = entries
            .entry(party_id.clone())
            .or_insert_with(|| ConversationEntry::fresh(now));
        entry.state = state;
        entry.last_activity_at = now;
        debug!(event_name = "store.state_set", party_id = %party_id, state = ?state, "dialogue state updated");
    }

    /// Shallow-merges fields into the party's draft, creating one when
    /// absent. Later writes of the same field overwrite earlier ones.
    pub fn merge_draft(&self, party_id: &PartyId, patch: DraftPatch) {
        let now = self.clock.now();
        let mut entries = self.lock_entries();
        let entry = entries
            .entry(party_id.clone())
            .or_insert_with(|| ConversationEntry::fresh(now));
        patch.apply_to(entry.draft.get_or_insert_with(OrderDraft::default));
    }

    pub fn draft_of(&self, party_id: &PartyId) -> OrderDraft {
        self.lock_entries()
            .get(party_id)
            .and_then(|entry| entry.draft.clone())
            .unwrap_or_default()
    }

    /// Removes both the conversation record and the draft; used on
    /// confirmation, cancellation, and expiry.
    pub fn clear(&self, party_id: &PartyId) {
        self.lock_entries().remove(party_id);
        debug!(event_name = "store.conversation_cleared", party_id = %party_id, "conversation cleared");
    }

    /// Removes every record older than the TTL; returns how many were
    /// dropped. Safe to call concurrently with normal access since the
    /// whole pass runs under the map lock.
    pub fn sweep_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.lock_entries();
        let before = entries.len();
        entries.retain(|_, entry| now - entry.last_activity_at <= self.ttl);
        before - entries.len()
    }

    pub fn active_conversations(&self) -> usize {
        self.lock_entries().len()
    }

    /// Short human-readable order identifier: fixed prefix, the last
    /// eight digits of the unix-millis timestamp, and a random 3-digit
    /// suffix. Uniqueness is best-effort (time + randomness), fine at
    /// this volume; a high-volume port would need a collision check.
    pub fn generate_order_id(&self) -> String {
        let millis = self.clock.now().timestamp_millis().to_string();
        let tail_start = millis.len().saturating_sub(8);
        let suffix: u16 = rand::thread_rng().gen_range(0..1000);
        format!("PSJ{}{suffix:03}", &millis[tail_start..])
    }

    fn lock_entries(&self) -> std::sync::MutexGuard<'_, HashMap<PartyId, ConversationEntry>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
