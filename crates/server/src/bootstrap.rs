use std::sync::Arc;

use chrono::Duration;
use secrecy::ExposeSecret;
use tracing::warn;

use hembi_core::config::AppConfig;
use hembi_core::{ConversationStore, DialogueEngine, SystemClock};
use hembi_whatsapp::delivery::{CloudApiClient, MessageDelivery, NoopDelivery};
use hembi_whatsapp::inbound::InboundProcessor;

pub struct App {
    pub config: AppConfig,
    pub processor: Arc<InboundProcessor>,
}

pub fn bootstrap_with_config(config: AppConfig) -> App {
    let store = Arc::new(ConversationStore::new(
        Arc::new(SystemClock),
        Duration::minutes(config.conversation.ttl_minutes),
    ));
    let engine = Arc::new(DialogueEngine::new(store));

    let delivery: Arc<dyn MessageDelivery> =
        if config.whatsapp.access_token.expose_secret().is_empty()
            || config.whatsapp.phone_number_id.is_empty()
        {
            warn!(
                event_name = "system.bootstrap.noop_delivery",
                "whatsapp credentials missing, outbound messages will be dropped"
            );
            Arc::new(NoopDelivery)
        } else {
            Arc::new(CloudApiClient::new(
                config.whatsapp.api_base_url.clone(),
                config.whatsapp.phone_number_id.clone(),
                config.whatsapp.access_token.clone(),
            ))
        };

    let processor = Arc::new(InboundProcessor::new(engine, delivery));

    App { config, processor }
}

#[cfg(test)]
mod tests {
    use hembi_core::config::AppConfig;

    use super::bootstrap_with_config;

    #[test]
    fn bootstrap_without_credentials_still_builds() {
        let app = bootstrap_with_config(AppConfig::default());
        assert_eq!(app.processor.engine().store().active_conversations(), 0);
    }
}
