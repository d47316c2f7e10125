use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub whatsapp: WhatsAppConfig,
    pub server: ServerConfig,
    pub conversation: ConversationConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct WhatsAppConfig {
    pub verify_token: String,
    pub access_token: SecretString,
    pub phone_number_id: String,
    pub api_base_url: String,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub graceful_shutdown_secs: u64,
}

#[derive(Clone, Debug)]
pub struct ConversationConfig {
    pub ttl_minutes: i64,
    pub sweep_interval_secs: u64,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            whatsapp: WhatsAppConfig {
                verify_token: String::new(),
                access_token: String::new().into(),
                phone_number_id: String::new(),
                api_base_url: "https://graph.facebook.com/v18.0".to_string(),
            },
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                port: 8080,
                graceful_shutdown_secs: 15,
            },
            conversation: ConversationConfig { ttl_minutes: 30, sweep_interval_secs: 300 },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

/// Where an effective config value came from, for operator display.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ValueSource {
    #[default]
    Default,
    File,
    Env,
    Override,
}

impl ValueSource {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::File => "file",
            Self::Env => "env",
            Self::Override => "override",
        }
    }
}

/// Per-field provenance, filled in as each layer lands during `load`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConfigSources {
    pub verify_token: ValueSource,
    pub access_token: ValueSource,
    pub phone_number_id: ValueSource,
    pub api_base_url: ValueSource,
    pub bind_address: ValueSource,
    pub port: ValueSource,
    pub graceful_shutdown_secs: ValueSource,
    pub ttl_minutes: ValueSource,
    pub sweep_interval_secs: ValueSource,
    pub log_level: ValueSource,
    pub log_format: ValueSource,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub verify_token: Option<String>,
    pub access_token: Option<String>,
    pub phone_number_id: Option<String>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    whatsapp: Option<WhatsAppPatch>,
    server: Option<ServerPatch>,
    conversation: Option<ConversationPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct WhatsAppPatch {
    verify_token: Option<String>,
    access_token: Option<String>,
    phone_number_id: Option<String>,
    api_base_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    graceful_shutdown_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct ConversationPatch {
    ttl_minutes: Option<i64>,
    sweep_interval_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    /// Precedence: defaults < `hembi.toml` < `HEMBI_*` env < overrides.
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        Ok(Self::load_with_sources(options)?.0)
    }

    /// Same as `load`, also reporting where each effective value came
    /// from, for the operator-facing config listing.
    pub fn load_with_sources(options: LoadOptions) -> Result<(Self, ConfigSources), ConfigError> {
        let mut config = Self::default();
        let mut sources = ConfigSources::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch, &mut sources);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("hembi.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides(&mut sources)?;
        config.apply_overrides(options.overrides, &mut sources);
        config.validate()?;

        Ok((config, sources))
    }

    fn apply_patch(&mut self, patch: ConfigPatch, sources: &mut ConfigSources) {
        if let Some(whatsapp) = patch.whatsapp {
            if let Some(verify_token) = whatsapp.verify_token {
                self.whatsapp.verify_token = verify_token;
                sources.verify_token = ValueSource::File;
            }
            if let Some(access_token_value) = whatsapp.access_token {
                self.whatsapp.access_token = access_token_value.into();
                sources.access_token = ValueSource::File;
            }
            if let Some(phone_number_id) = whatsapp.phone_number_id {
                self.whatsapp.phone_number_id = phone_number_id;
                sources.phone_number_id = ValueSource::File;
            }
            if let Some(api_base_url) = whatsapp.api_base_url {
                self.whatsapp.api_base_url = api_base_url;
                sources.api_base_url = ValueSource::File;
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
                sources.bind_address = ValueSource::File;
            }
            if let Some(port) = server.port {
                self.server.port = port;
                sources.port = ValueSource::File;
            }
            if let Some(graceful_shutdown_secs) = server.graceful_shutdown_secs {
                self.server.graceful_shutdown_secs = graceful_shutdown_secs;
                sources.graceful_shutdown_secs = ValueSource::File;
            }
        }

        if let Some(conversation) = patch.conversation {
            if let Some(ttl_minutes) = conversation.ttl_minutes {
                self.conversation.ttl_minutes = ttl_minutes;
                sources.ttl_minutes = ValueSource::File;
            }
            if let Some(sweep_interval_secs) = conversation.sweep_interval_secs {
                self.conversation.sweep_interval_secs = sweep_interval_secs;
                sources.sweep_interval_secs = ValueSource::File;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
                sources.log_level = ValueSource::File;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
                sources.log_format = ValueSource::File;
            }
        }
    }

    fn apply_env_overrides(&mut self, sources: &mut ConfigSources) -> Result<(), ConfigError> {
        if let Some(value) = read_env("HEMBI_VERIFY_TOKEN") {
            self.whatsapp.verify_token = value;
            sources.verify_token = ValueSource::Env;
        }
        if let Some(value) = read_env("HEMBI_WHATSAPP_TOKEN") {
            self.whatsapp.access_token = value.into();
            sources.access_token = ValueSource::Env;
        }
        if let Some(value) = read_env("HEMBI_PHONE_NUMBER_ID") {
            self.whatsapp.phone_number_id = value;
            sources.phone_number_id = ValueSource::Env;
        }
        if let Some(value) = read_env("HEMBI_WHATSAPP_API_BASE_URL") {
            self.whatsapp.api_base_url = value;
            sources.api_base_url = ValueSource::Env;
        }
        if let Some(value) = read_env("HEMBI_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
            sources.bind_address = ValueSource::Env;
        }
        if let Some(value) = read_env("HEMBI_SERVER_PORT") {
            self.server.port = parse_u16("HEMBI_SERVER_PORT", &value)?;
            sources.port = ValueSource::Env;
        }
        if let Some(value) = read_env("HEMBI_CONVERSATION_TTL_MINUTES") {
            self.conversation.ttl_minutes = parse_i64("HEMBI_CONVERSATION_TTL_MINUTES", &value)?;
            sources.ttl_minutes = ValueSource::Env;
        }
        if let Some(value) = read_env("HEMBI_SWEEP_INTERVAL_SECS") {
            self.conversation.sweep_interval_secs =
                parse_u64("HEMBI_SWEEP_INTERVAL_SECS", &value)?;
            sources.sweep_interval_secs = ValueSource::Env;
        }
        if let Some(value) = read_env("HEMBI_LOG_LEVEL") {
            self.logging.level = value;
            sources.log_level = ValueSource::Env;
        }
        if let Some(value) = read_env("HEMBI_LOG_FORMAT") {
            self.logging.format = value.parse()?;
            sources.log_format = ValueSource::Env;
        }
        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides, sources: &mut ConfigSources) {
        if let Some(verify_token) = overrides.verify_token {
            self.whatsapp.verify_token = verify_token;
            sources.verify_token = ValueSource::Override;
        }
        if let Some(access_token_value) = overrides.access_token {
            self.whatsapp.access_token = access_token_value.into();
            sources.access_token = ValueSource::Override;
        }
        if let Some(phone_number_id) = overrides.phone_number_id {
            self.whatsapp.phone_number_id = phone_number_id;
            sources.phone_number_id = ValueSource::Override;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
            sources.log_level = ValueSource::Override;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.conversation.ttl_minutes <= 0 {
            return Err(ConfigError::Validation(
                "conversation.ttl_minutes must be positive".to_string(),
            ));
        }
        if self.conversation.sweep_interval_secs == 0 {
            return Err(ConfigError::Validation(
                "conversation.sweep_interval_secs must be positive".to_string(),
            ));
        }
        if self.whatsapp.api_base_url.is_empty() {
            return Err(ConfigError::Validation(
                "whatsapp.api_base_url must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return path.exists().then(|| path.to_path_buf());
    }
    if let Some(env_path) = read_env("HEMBI_CONFIG") {
        let path = PathBuf::from(env_path);
        return path.exists().then_some(path);
    }
    let default = PathBuf::from("hembi.toml");
    default.exists().then_some(default)
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;
    toml::from_str(&raw)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_i64(key: &str, value: &str) -> Result<i64, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}
