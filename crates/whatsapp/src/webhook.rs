use serde::{Deserialize, Serialize};

/// The `object` value Meta sends for business-account webhooks.
pub const WHATSAPP_BUSINESS_OBJECT: &str = "whatsapp_business_account";

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub object: String,
    #[serde(default)]
    pub entry: Vec<WebhookEntry>,
}

impl WebhookPayload {
    pub fn is_whatsapp_business(&self) -> bool {
        self.object == WHATSAPP_BUSINESS_OBJECT
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct WebhookEntry {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub changes: Vec<WebhookChange>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct WebhookChange {
    #[serde(default)]
    pub field: String,
    #[serde(default)]
    pub value: ChangeValue,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ChangeValue {
    #[serde(default)]
    pub metadata: Option<ChangeMetadata>,
    #[serde(default)]
    pub messages: Vec<InboundMessage>,
    #[serde(default)]
    pub statuses: Vec<MessageStatus>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ChangeMetadata {
    #[serde(default)]
    pub phone_number_id: String,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct InboundMessage {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(rename = "type", default)]
    pub message_type: String,
    #[serde(default)]
    pub text: Option<TextBody>,
}

impl InboundMessage {
    /// Text body when this is a text message; `None` for media and the
    /// occasional malformed payload, both routed to canned replies.
    pub fn text_body(&self) -> Option<&str> {
        if self.message_type != "text" {
            return None;
        }
        self.text.as_ref().map(|text| text.body.as_str())
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct TextBody {
    #[serde(default)]
    pub body: String,
}

/// Delivery receipt updates (sent/delivered/read/failed). Logged, never
/// acted on.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct MessageStatus {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub recipient_id: String,
}

/// Query parameters of Meta's GET verification handshake.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct VerificationQuery {
    #[serde(rename = "hub.mode", default)]
    pub mode: Option<String>,
    #[serde(rename = "hub.verify_token", default)]
    pub verify_token: Option<String>,
    #[serde(rename = "hub.challenge", default)]
    pub challenge: Option<String>,
}

/// Returns the challenge to echo back when the subscription request is
/// valid; `None` means the caller should answer 403.
pub fn verify_subscription<'a>(
    query: &'a VerificationQuery,
    expected_token: &str,
) -> Option<&'a str> {
    let mode_ok = query.mode.as_deref() == Some("subscribe");
    let token_ok =
        !expected_token.is_empty() && query.verify_token.as_deref() == Some(expected_token);

    if mode_ok && token_ok {
        query.challenge.as_deref()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::{verify_subscription, VerificationQuery, WebhookPayload};

    fn query(mode: &str, token: &str, challenge: &str) -> VerificationQuery {
        VerificationQuery {
            mode: Some(mode.to_string()),
            verify_token: Some(token.to_string()),
            challenge: Some(challenge.to_string()),
        }
    }

    #[test]
    fn valid_subscription_echoes_challenge() {
        let query = query("subscribe", "secret", "12345");
        let challenge = verify_subscription(&query, "secret");
        assert_eq!(challenge, Some("12345"));
    }

    #[test]
    fn wrong_token_or_mode_is_rejected() {
        assert!(verify_subscription(&query("subscribe", "wrong", "12345"), "secret").is_none());
        assert!(verify_subscription(&query("unsubscribe", "secret", "12345"), "secret").is_none());
        assert!(verify_subscription(&VerificationQuery::default(), "secret").is_none());
    }

    #[test]
    fn empty_configured_token_never_verifies() {
        assert!(verify_subscription(&query("subscribe", "", "12345"), "").is_none());
    }

    #[test]
    fn parses_a_realistic_cloud_api_payload() {
        let raw = r#"{
            "object": "whatsapp_business_account",
            "entry": [{
                "id": "102290129340398",
                "changes": [{
                    "field": "messages",
                    "value": {
                        "metadata": { "display_phone_number": "15550001111", "phone_number_id": "106540352242922" },
                        "messages": [{
                            "id": "wamid.HBgLNTIxNTU1MDAwMQ",
                            "from": "5215550001",
                            "timestamp": "1741953600",
                            "type": "text",
                            "text": { "body": "2 garrafones" }
                        }]
                    }
                }]
            }]
        }"#;

        let payload: WebhookPayload = serde_json::from_str(raw).expect("payload should parse");
        assert!(payload.is_whatsapp_business());
        let message = &payload.entry[0].changes[0].value.messages[0];
        assert_eq!(message.from, "5215550001");
        assert_eq!(message.text_body(), Some("2 garrafones"));
    }

    #[test]
    fn media_message_has_no_text_body() {
        let raw = r#"{
            "object": "whatsapp_business_account",
            "entry": [{
                "id": "1",
                "changes": [{
                    "field": "messages",
                    "value": { "messages": [{ "id": "m1", "from": "52", "type": "image" }] }
                }]
            }]
        }"#;

        let payload: WebhookPayload = serde_json::from_str(raw).expect("payload should parse");
        assert!(payload.entry[0].changes[0].value.messages[0].text_body().is_none());
    }
}
