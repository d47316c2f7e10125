use hembi_core::config::{AppConfig, LoadOptions, ValueSource};
use secrecy::ExposeSecret;

use crate::commands::CommandResult;

pub fn run() -> CommandResult {
    let (config, sources) = match AppConfig::load_with_sources(LoadOptions::default()) {
        Ok(loaded) => loaded,
        Err(error) => {
            return CommandResult {
                exit_code: 1,
                output: format!("config validation failed: {error}"),
            }
        }
    };

    let lines = vec![
        "effective config:".to_string(),
        render_line(
            "whatsapp.verify_token",
            &redact(&config.whatsapp.verify_token),
            sources.verify_token,
        ),
        render_line(
            "whatsapp.access_token",
            &redact(config.whatsapp.access_token.expose_secret()),
            sources.access_token,
        ),
        render_line(
            "whatsapp.phone_number_id",
            &config.whatsapp.phone_number_id,
            sources.phone_number_id,
        ),
        render_line("whatsapp.api_base_url", &config.whatsapp.api_base_url, sources.api_base_url),
        render_line("server.bind_address", &config.server.bind_address, sources.bind_address),
        render_line("server.port", &config.server.port.to_string(), sources.port),
        render_line(
            "conversation.ttl_minutes",
            &config.conversation.ttl_minutes.to_string(),
            sources.ttl_minutes,
        ),
        render_line(
            "conversation.sweep_interval_secs",
            &config.conversation.sweep_interval_secs.to_string(),
            sources.sweep_interval_secs,
        ),
        render_line("logging.level", &config.logging.level, sources.log_level),
        render_line("logging.format", &format!("{:?}", config.logging.format), sources.log_format),
    ];

    CommandResult { exit_code: 0, output: lines.join("\n") }
}

fn render_line(key: &str, value: &str, source: ValueSource) -> String {
    format!("  {key} = {value} ({})", source.label())
}

fn redact(secret: &str) -> String {
    if secret.is_empty() {
        return "<unset>".to_string();
    }
    let visible: String = secret.chars().take(4).collect();
    format!("{visible}***")
}
