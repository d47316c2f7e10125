use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;

use hembi_whatsapp::inbound::InboundProcessor;

#[derive(Clone)]
pub struct HealthState {
    pub processor: Arc<InboundProcessor>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub active_conversations: usize,
    pub checked_at: String,
}

pub fn router(processor: Arc<InboundProcessor>) -> Router {
    Router::new().route("/health", get(health)).with_state(HealthState { processor })
}

pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let payload = HealthResponse {
        status: "ready",
        service: "hembi-server",
        active_conversations: state.processor.engine().store().active_conversations(),
        checked_at: Utc::now().to_rfc3339(),
    };

    (StatusCode::OK, Json(payload))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::extract::State;
    use axum::http::StatusCode;
    use axum::Json;

    use hembi_core::{ConversationStore, DialogueEngine, PartyId};
    use hembi_whatsapp::delivery::NoopDelivery;
    use hembi_whatsapp::inbound::InboundProcessor;

    use super::{health, HealthState};

    #[tokio::test]
    async fn health_reports_active_conversation_count() {
        let engine = Arc::new(DialogueEngine::new(Arc::new(ConversationStore::default())));
        engine.handle_inbound_text(&PartyId::from("5215550001"), "2 garrafones");
        let processor = Arc::new(InboundProcessor::new(engine, Arc::new(NoopDelivery)));

        let (status, Json(payload)) = health(State(HealthState { processor })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload.status, "ready");
        assert_eq!(payload.active_conversations, 1);
    }
}
