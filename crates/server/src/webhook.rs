use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use hembi_whatsapp::inbound::InboundProcessor;
use hembi_whatsapp::webhook::{verify_subscription, VerificationQuery, WebhookPayload};

#[derive(Clone)]
pub struct WebhookState {
    pub processor: Arc<InboundProcessor>,
    pub verify_token: String,
}

pub fn router(state: WebhookState) -> Router {
    Router::new()
        .route("/webhook", get(verify).post(receive))
        .with_state(state)
}

/// Meta's subscription handshake: echo the challenge on a token match,
/// 403 otherwise.
pub async fn verify(
    State(state): State<WebhookState>,
    Query(query): Query<VerificationQuery>,
) -> impl IntoResponse {
    match verify_subscription(&query, &state.verify_token) {
        Some(challenge) => {
            info!(event_name = "webhook.verified", "webhook subscription verified");
            (StatusCode::OK, challenge.to_string()).into_response()
        }
        None => {
            warn!(
                event_name = "webhook.verification_rejected",
                mode = query.mode.as_deref().unwrap_or("-"),
                "webhook verification rejected"
            );
            (StatusCode::FORBIDDEN, Json(json!({ "error": "invalid verify token" })))
                .into_response()
        }
    }
}

/// Inbound event delivery. Always answers 200 so Meta does not retry:
/// per-message failures are counted in the summary, not surfaced as
/// HTTP errors.
pub async fn receive(
    State(state): State<WebhookState>,
    Json(payload): Json<WebhookPayload>,
) -> (StatusCode, Json<serde_json::Value>) {
    let correlation_id = Uuid::new_v4().to_string();

    if !payload.is_whatsapp_business() {
        warn!(
            event_name = "webhook.unknown_object",
            correlation_id = %correlation_id,
            object = %payload.object,
            "ignoring non-whatsapp webhook object"
        );
        return (
            StatusCode::OK,
            Json(json!({
                "message": "object is not a whatsapp_business_account, ignored",
                "received_object": payload.object,
            })),
        );
    }

    let summary = state.processor.process_payload(&payload).await;
    info!(
        event_name = "webhook.processed",
        correlation_id = %correlation_id,
        entries = summary.entries,
        failures = summary.failures,
        "webhook payload handled"
    );

    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "timestamp": Utc::now().to_rfc3339(),
            "processed": summary,
        })),
    )
}
