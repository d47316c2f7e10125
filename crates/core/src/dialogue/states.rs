use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::party::PartyId;

/// Current step of the multi-turn order-collection flow. Exactly one
/// state is active per party; `Idle` is both the initial state and the
/// state reached after completion, cancellation, or expiry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DialogueState {
    Idle,
    CollectingAddress,
    CollectingPhone,
    CollectingPayment,
    ConfirmingOrder,
}

impl DialogueState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}

/// Per-party conversation snapshot handed out by the store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationRecord {
    pub party_id: PartyId,
    pub state: DialogueState,
    pub last_activity_at: DateTime<Utc>,
}
