use std::sync::Arc;

use tracing::{debug, info};

use crate::dialogue::states::DialogueState;
use crate::domain::order::{DraftPatch, PaymentMethod};
use crate::domain::party::PartyId;
use crate::extract::OrderExtractor;
use crate::intent::{Intent, IntentClassifier, OrderSignal, QuantityProductSignal};
use crate::messages;
use crate::store::{ConversationAccess, ConversationStore};
use crate::text::{sanitize, tokenize};

/// Minimum plausible address length, in characters.
const MIN_ADDRESS_CHARS: usize = 10;
/// Minimum digits for a contact phone number after separator stripping.
const MIN_PHONE_DIGITS: usize = 10;

/// The dialogue orchestrator: one message in, one message out.
///
/// Given incoming text and the party's current state it either
/// classifies intent (idle) or advances the collection flow (active),
/// mutating the store and returning the next outbound message text.
/// Each step runs under the store's per-party lock, so concurrent
/// messages from the same party serialize instead of interleaving
/// mid-transition. It never blocks on external I/O and never fails
/// toward the party; every unrecognized input becomes a clarifying
/// re-prompt, and a store inconsistency resets the dialogue with a
/// restart message.
pub struct DialogueEngine<S = QuantityProductSignal> {
    store: Arc<ConversationStore>,
    classifier: IntentClassifier<S>,
    extractor: OrderExtractor,
}

impl DialogueEngine<QuantityProductSignal> {
    pub fn new(store: Arc<ConversationStore>) -> Self {
        Self { store, classifier: IntentClassifier::new(), extractor: OrderExtractor::default() }
    }
}

impl<S> DialogueEngine<S>
where
    S: OrderSignal,
{
    pub fn with_components(
        store: Arc<ConversationStore>,
        classifier: IntentClassifier<S>,
        extractor: OrderExtractor,
    ) -> Self {
        Self { store, classifier, extractor }
    }

    pub fn store(&self) -> &Arc<ConversationStore> {
        &self.store
    }

    /// Single entry point for the channel adapter. Malformed or missing
    /// text is treated as empty input and routed through the default
    /// path so a reply is always produced.
    pub fn handle_inbound_text(&self, party_id: &PartyId, raw_text: &str) -> String {
        self.store.with_party(party_id, |party| {
            debug!(
                event_name = "dialogue.inbound",
                party_id = %party_id,
                state = ?party.state(),
                "processing inbound text"
            );

            match party.state() {
                DialogueState::Idle => self.handle_idle(party, party_id, raw_text),
                DialogueState::CollectingAddress => self.handle_address(party, raw_text),
                DialogueState::CollectingPhone => self.handle_phone(party, raw_text),
                DialogueState::CollectingPayment => self.handle_payment(party, raw_text),
                DialogueState::ConfirmingOrder => self.handle_confirmation(party, party_id, raw_text),
            }
        })
    }

    /// Timer hook for the hosting process; removes stale conversations.
    pub fn run_expiry_sweep(&self) -> usize {
        let removed = self.store.sweep_expired();
        if removed > 0 {
            info!(event_name = "dialogue.sweep", removed, "expired conversations swept");
        }
        removed
    }

    fn handle_idle(
        &self,
        party: &mut ConversationAccess<'_>,
        party_id: &PartyId,
        raw_text: &str,
    ) -> String {
        let intent = self.classifier.classify(raw_text);
        debug!(event_name = "dialogue.intent", party_id = %party_id, intent = ?intent, "intent classified");

        match intent {
            Intent::SpecificOrder => self.start_order(party, raw_text),
            Intent::Greeting => messages::greeting(),
            Intent::Order => messages::order_prompt(),
            Intent::Tracking => messages::tracking(),
            Intent::Prices => messages::prices(self.extractor.catalog()),
            Intent::Info => messages::info(),
            Intent::HumanHandoff => messages::human_handoff(),
            Intent::Default => messages::fallback(),
        }
    }

    fn start_order(&self, party: &mut ConversationAccess<'_>, raw_text: &str) -> String {
        let items = self.extractor.extract(raw_text);
        if items.is_empty() {
            // looked like an order but nothing matched the lexicon
            return messages::clarify_order();
        }

        let reply = messages::order_started(&items);
        party.merge_draft(DraftPatch::items(items));
        party.set_state(DialogueState::CollectingAddress);
        reply
    }

    fn handle_address(&self, party: &mut ConversationAccess<'_>, raw_text: &str) -> String {
        let Some(()) = self.guard_draft(party) else {
            return messages::restart_needed();
        };

        let address = raw_text.trim();
        if address.chars().count() < MIN_ADDRESS_CHARS {
            return messages::address_retry();
        }

        party.merge_draft(DraftPatch::address(address));
        party.set_state(DialogueState::CollectingPhone);
        messages::phone_prompt()
    }

    fn handle_phone(&self, party: &mut ConversationAccess<'_>, raw_text: &str) -> String {
        let Some(()) = self.guard_draft(party) else {
            return messages::restart_needed();
        };

        let digits: String =
            raw_text.chars().filter(|character| character.is_ascii_digit()).collect();
        if digits.len() < MIN_PHONE_DIGITS {
            return messages::phone_retry();
        }

        party.merge_draft(DraftPatch::phone(digits));
        party.set_state(DialogueState::CollectingPayment);
        messages::payment_options()
    }

    fn handle_payment(&self, party: &mut ConversationAccess<'_>, raw_text: &str) -> String {
        let Some(()) = self.guard_draft(party) else {
            return messages::restart_needed();
        };

        let Some(method) = PaymentMethod::resolve(&sanitize(raw_text)) else {
            return messages::payment_retry();
        };

        party.merge_draft(DraftPatch::payment_method(method));
        party.set_state(DialogueState::ConfirmingOrder);
        messages::confirmation_summary(&party.draft())
    }

    fn handle_confirmation(
        &self,
        party: &mut ConversationAccess<'_>,
        party_id: &PartyId,
        raw_text: &str,
    ) -> String {
        let Some(()) = self.guard_draft(party) else {
            return messages::restart_needed();
        };

        let sanitized = sanitize(raw_text);
        let tokens = tokenize(&sanitized);

        if sanitized.contains("confirmar") || tokens.iter().any(|token| token == "si") {
            let order_id = self.store.generate_order_id();
            party.clear();
            info!(
                event_name = "dialogue.order_confirmed",
                party_id = %party_id,
                order_id = %order_id,
                "order confirmed"
            );
            return messages::order_confirmed(&order_id);
        }

        if sanitized.contains("cancelar") || sanitized.contains("anular") {
            party.clear();
            info!(event_name = "dialogue.order_cancelled", party_id = %party_id, "order cancelled");
            return messages::order_cancelled();
        }

        if sanitized.contains("modificar") {
            // the modify path always restarts at the address step, draft retained
            party.set_state(DialogueState::CollectingAddress);
            return messages::modify_prompt();
        }

        messages::confirm_retry()
    }

    /// Active states require a draft with items; an expiry racing the
    /// current step can leave the state behind without one. Reset to a
    /// fresh Idle record and ask the party to restart.
    fn guard_draft(&self, party: &mut ConversationAccess<'_>) -> Option<()> {
        if party.draft().ensure_has_items().is_err() {
            party.clear();
            return None;
        }
        Some(())
    }
}
