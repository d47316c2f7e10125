use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use serde::Serialize;
use tracing::{debug, info, warn};

use hembi_core::{DialogueEngine, PartyId};

use crate::delivery::MessageDelivery;
use crate::webhook::{InboundMessage, WebhookPayload};

/// Most recent message ids remembered for duplicate suppression.
const DEDUP_CAPACITY: usize = 1_000;

/// Counters returned to the webhook caller after a payload pass.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ProcessSummary {
    pub entries: usize,
    pub text_messages: usize,
    pub media_messages: usize,
    pub duplicates: usize,
    pub statuses: usize,
    pub failures: usize,
}

/// Fans one webhook payload out into dialogue-engine calls and reply
/// deliveries. Per-message failures are logged and counted, never
/// propagated: the webhook response is always a success so Meta does
/// not retry the whole batch.
pub struct InboundProcessor {
    engine: Arc<DialogueEngine>,
    delivery: Arc<dyn MessageDelivery>,
    seen_messages: Mutex<DedupCache>,
}

impl InboundProcessor {
    pub fn new(engine: Arc<DialogueEngine>, delivery: Arc<dyn MessageDelivery>) -> Self {
        Self { engine, delivery, seen_messages: Mutex::new(DedupCache::new(DEDUP_CAPACITY)) }
    }

    pub fn engine(&self) -> &Arc<DialogueEngine> {
        &self.engine
    }

    pub async fn process_payload(&self, payload: &WebhookPayload) -> ProcessSummary {
        let mut summary = ProcessSummary { entries: payload.entry.len(), ..Default::default() };

        for entry in &payload.entry {
            for change in &entry.changes {
                for message in &change.value.messages {
                    self.process_message(message, &mut summary).await;
                }
                for status in &change.value.statuses {
                    debug!(
                        event_name = "inbound.status",
                        message_id = %status.id,
                        status = %status.status,
                        recipient_id = %status.recipient_id,
                        "delivery status received"
                    );
                    summary.statuses += 1;
                }
            }
        }

        info!(
            event_name = "inbound.payload_processed",
            entries = summary.entries,
            text_messages = summary.text_messages,
            media_messages = summary.media_messages,
            duplicates = summary.duplicates,
            failures = summary.failures,
            "webhook payload processed"
        );
        summary
    }

    async fn process_message(&self, message: &InboundMessage, summary: &mut ProcessSummary) {
        if message.from.is_empty() {
            warn!(event_name = "inbound.missing_sender", message_id = %message.id, "message without sender skipped");
            summary.failures += 1;
            return;
        }

        if !message.id.is_empty() && self.is_duplicate(&message.id) {
            debug!(event_name = "inbound.duplicate", message_id = %message.id, "duplicate message suppressed");
            summary.duplicates += 1;
            return;
        }

        let party_id = PartyId::from(message.from.as_str());
        let reply = match message.text_body() {
            Some(text) => {
                summary.text_messages += 1;
                self.engine.handle_inbound_text(&party_id, text)
            }
            None => {
                summary.media_messages += 1;
                media_acknowledgement(&message.message_type)
            }
        };

        if let Err(error) = self.delivery.deliver(&party_id, &reply).await {
            warn!(
                event_name = "inbound.delivery_failed",
                party_id = %party_id,
                error = %error,
                "could not deliver reply"
            );
            summary.failures += 1;
        }
    }

    fn is_duplicate(&self, message_id: &str) -> bool {
        self.seen_messages
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .check_and_insert(message_id)
    }
}

/// Canned replies for non-text content; a human follows up.
fn media_acknowledgement(message_type: &str) -> String {
    match message_type {
        "image" => "Gracias por la imagen. 📷 Un agente la revisará y te contactará pronto.",
        "audio" => "Gracias por el audio. 🎙️ Un agente lo escuchará y te contactará pronto.",
        "video" => "Gracias por el video. 🎬 Un agente lo revisará y te contactará pronto.",
        "document" => "Gracias por el documento. 📄 Un agente lo revisará y te contactará pronto.",
        _ => "Gracias por tu mensaje. Un agente te contactará pronto.",
    }
    .to_string()
}

/// Bounded set of recently seen message ids. When full, the oldest half
/// is evicted so steady-state inserts stay cheap.
struct DedupCache {
    capacity: usize,
    seen: HashSet<String>,
    order: VecDeque<String>,
}

impl DedupCache {
    fn new(capacity: usize) -> Self {
        Self { capacity, seen: HashSet::new(), order: VecDeque::new() }
    }

    /// Returns true when the id was already present.
    fn check_and_insert(&mut self, message_id: &str) -> bool {
        if self.seen.contains(message_id) {
            return true;
        }

        if self.order.len() >= self.capacity {
            for _ in 0..self.capacity / 2 {
                if let Some(evicted) = self.order.pop_front() {
                    self.seen.remove(&evicted);
                }
            }
        }

        self.seen.insert(message_id.to_string());
        self.order.push_back(message_id.to_string());
        false
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use hembi_core::{ConversationStore, DialogueEngine, DialogueState, PartyId};

    use crate::delivery::{DeliveryError, MessageDelivery};
    use crate::webhook::WebhookPayload;

    use super::{DedupCache, InboundProcessor};

    #[derive(Default)]
    struct RecordingDelivery {
        sent: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl MessageDelivery for RecordingDelivery {
        async fn deliver(&self, party_id: &PartyId, text: &str) -> Result<(), DeliveryError> {
            self.sent
                .lock()
                .expect("lock")
                .push((party_id.as_str().to_string(), text.to_string()));
            Ok(())
        }
    }

    struct FailingDelivery;

    #[async_trait]
    impl MessageDelivery for FailingDelivery {
        async fn deliver(&self, _party_id: &PartyId, _text: &str) -> Result<(), DeliveryError> {
            Err(DeliveryError::Transport("connection reset".to_string()))
        }
    }

    fn processor_with(delivery: Arc<dyn MessageDelivery>) -> InboundProcessor {
        let engine = Arc::new(DialogueEngine::new(Arc::new(ConversationStore::default())));
        InboundProcessor::new(engine, delivery)
    }

    fn payload(raw: &str) -> WebhookPayload {
        serde_json::from_str(raw).expect("payload should parse")
    }

    fn text_message_payload(message_id: &str, body: &str) -> WebhookPayload {
        payload(&format!(
            r#"{{
                "object": "whatsapp_business_account",
                "entry": [{{
                    "id": "1",
                    "changes": [{{
                        "field": "messages",
                        "value": {{
                            "messages": [{{
                                "id": "{message_id}",
                                "from": "5215550001",
                                "type": "text",
                                "text": {{ "body": "{body}" }}
                            }}]
                        }}
                    }}]
                }}]
            }}"#
        ))
    }

    #[tokio::test]
    async fn text_message_drives_the_dialogue_and_replies() {
        let delivery = Arc::new(RecordingDelivery::default());
        let processor = processor_with(delivery.clone());

        let summary = processor.process_payload(&text_message_payload("m1", "2 garrafones")).await;
        assert_eq!(summary.text_messages, 1);
        assert_eq!(summary.failures, 0);

        let sent = delivery.sent.lock().expect("lock");
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "5215550001");
        assert!(sent[0].1.contains("Garrafón 20L x2"));

        let party = PartyId::from("5215550001");
        assert_eq!(
            processor.engine().store().state_of(&party).state,
            DialogueState::CollectingAddress
        );
    }

    #[tokio::test]
    async fn duplicate_message_ids_are_suppressed() {
        let delivery = Arc::new(RecordingDelivery::default());
        let processor = processor_with(delivery.clone());

        processor.process_payload(&text_message_payload("m1", "hola")).await;
        let summary = processor.process_payload(&text_message_payload("m1", "hola")).await;

        assert_eq!(summary.duplicates, 1);
        assert_eq!(summary.text_messages, 0);
        assert_eq!(delivery.sent.lock().expect("lock").len(), 1);
    }

    #[tokio::test]
    async fn media_message_gets_a_canned_acknowledgement() {
        let delivery = Arc::new(RecordingDelivery::default());
        let processor = processor_with(delivery.clone());

        let media = payload(
            r#"{
                "object": "whatsapp_business_account",
                "entry": [{
                    "id": "1",
                    "changes": [{
                        "field": "messages",
                        "value": { "messages": [{ "id": "m2", "from": "5215550002", "type": "image" }] }
                    }]
                }]
            }"#,
        );

        let summary = processor.process_payload(&media).await;
        assert_eq!(summary.media_messages, 1);

        let sent = delivery.sent.lock().expect("lock");
        assert!(sent[0].1.contains("imagen"));
    }

    #[tokio::test]
    async fn statuses_are_counted_not_replied_to() {
        let delivery = Arc::new(RecordingDelivery::default());
        let processor = processor_with(delivery.clone());

        let statuses = payload(
            r#"{
                "object": "whatsapp_business_account",
                "entry": [{
                    "id": "1",
                    "changes": [{
                        "field": "messages",
                        "value": { "statuses": [{ "id": "m1", "status": "delivered", "recipient_id": "52" }] }
                    }]
                }]
            }"#,
        );

        let summary = processor.process_payload(&statuses).await;
        assert_eq!(summary.statuses, 1);
        assert!(delivery.sent.lock().expect("lock").is_empty());
    }

    #[tokio::test]
    async fn delivery_failure_is_counted_not_fatal() {
        let processor = processor_with(Arc::new(FailingDelivery));
        let summary = processor.process_payload(&text_message_payload("m1", "hola")).await;
        assert_eq!(summary.text_messages, 1);
        assert_eq!(summary.failures, 1);
    }

    #[test]
    fn dedup_cache_evicts_oldest_half_when_full() {
        let mut cache = DedupCache::new(4);
        for id in ["a", "b", "c", "d"] {
            assert!(!cache.check_and_insert(id));
        }
        // full: inserting evicts "a" and "b"
        assert!(!cache.check_and_insert("e"));
        assert!(!cache.check_and_insert("a"));
        assert!(cache.check_and_insert("d"));
    }
}
