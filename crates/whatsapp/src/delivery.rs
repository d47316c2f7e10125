use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, warn};

use hembi_core::PartyId;

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("access token rejected by the messaging API")]
    Unauthorized,
    #[error("message rejected ({status}): {detail}")]
    Rejected { status: u16, detail: String },
    #[error("transport failure: {0}")]
    Transport(String),
}

/// Best-effort outbound send to the external channel. The dialogue core
/// never depends on the result beyond logging.
#[async_trait]
pub trait MessageDelivery: Send + Sync {
    async fn deliver(&self, party_id: &PartyId, text: &str) -> Result<(), DeliveryError>;
}

/// Swallows every send; used in tests and the offline CLI.
#[derive(Clone, Debug, Default)]
pub struct NoopDelivery;

#[async_trait]
impl MessageDelivery for NoopDelivery {
    async fn deliver(&self, party_id: &PartyId, _text: &str) -> Result<(), DeliveryError> {
        debug!(event_name = "delivery.noop", party_id = %party_id, "dropping outbound message");
        Ok(())
    }
}

/// WhatsApp Cloud API client: POST
/// `{base_url}/{phone_number_id}/messages` with a Bearer token.
pub struct CloudApiClient {
    http: reqwest::Client,
    base_url: String,
    phone_number_id: String,
    access_token: SecretString,
}

impl CloudApiClient {
    pub fn new(base_url: String, phone_number_id: String, access_token: SecretString) -> Self {
        Self { http: reqwest::Client::new(), base_url, phone_number_id, access_token }
    }

    fn messages_url(&self) -> String {
        format!("{}/{}/messages", self.base_url.trim_end_matches('/'), self.phone_number_id)
    }
}

#[async_trait]
impl MessageDelivery for CloudApiClient {
    async fn deliver(&self, party_id: &PartyId, text: &str) -> Result<(), DeliveryError> {
        let body = json!({
            "messaging_product": "whatsapp",
            "to": party_id.as_str(),
            "type": "text",
            "text": { "body": text }
        });

        let response = self
            .http
            .post(self.messages_url())
            .bearer_auth(self.access_token.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|error| DeliveryError::Transport(error.to_string()))?;

        let status = response.status();
        if status.is_success() {
            debug!(event_name = "delivery.sent", party_id = %party_id, "outbound message accepted");
            return Ok(());
        }

        let detail = response.text().await.unwrap_or_default();
        warn!(
            event_name = "delivery.rejected",
            party_id = %party_id,
            status = status.as_u16(),
            detail = %detail,
            "outbound message rejected"
        );

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(DeliveryError::Unauthorized);
        }
        Err(DeliveryError::Rejected { status: status.as_u16(), detail })
    }
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;

    use hembi_core::PartyId;

    use super::{CloudApiClient, DeliveryError, MessageDelivery, NoopDelivery};

    #[test]
    fn messages_url_joins_base_and_phone_number_id() {
        let client = CloudApiClient::new(
            "https://graph.facebook.com/v18.0/".to_string(),
            "106540352242922".to_string(),
            SecretString::from("token"),
        );
        assert_eq!(
            client.messages_url(),
            "https://graph.facebook.com/v18.0/106540352242922/messages"
        );
    }

    #[tokio::test]
    async fn noop_delivery_always_succeeds() {
        let delivery = NoopDelivery;
        assert!(delivery.deliver(&PartyId::from("5215550001"), "hola").await.is_ok());
    }

    #[test]
    fn error_messages_stay_user_free() {
        assert_eq!(
            DeliveryError::Unauthorized.to_string(),
            "access token rejected by the messaging API"
        );
        let rejected = DeliveryError::Rejected { status: 400, detail: "bad number".to_string() };
        assert_eq!(rejected.to_string(), "message rejected (400): bad number");
    }
}
