use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::webhook::DEFAULT_FULFILLMENT_TEXT;

pub const DEFAULT_CONFIG_FILE: &str = "intent-relay.toml";
pub const NESTED_CONFIG_FILE: &str = "config/intent-relay.toml";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub nlu: NluConfig,
    pub server: ServerConfig,
    pub webhook: WebhookConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct NluConfig {
    pub project_id: String,
    pub credentials_path: PathBuf,
    pub access_token: Option<SecretString>,
    pub language_code: String,
    pub time_zone: String,
    pub base_url: String,
    pub timeout_secs: u64,
    pub default_session_id: String,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub graceful_shutdown_secs: u64,
}

#[derive(Clone, Debug)]
pub struct WebhookConfig {
    pub fulfillment_text: String,
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

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub project_id: Option<String>,
    pub credentials_path: Option<PathBuf>,
    pub access_token: Option<String>,
    pub nlu_base_url: Option<String>,
    pub bind_address: Option<String>,
    pub port: Option<u16>,
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
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            nlu: NluConfig {
                project_id: String::new(),
                credentials_path: PathBuf::from("credentials.json"),
                access_token: None,
                language_code: "en".to_string(),
                time_zone: "Europe/Amsterdam".to_string(),
                base_url: "https://dialogflow.googleapis.com".to_string(),
                timeout_secs: 30,
                default_session_id: "testUser".to_string(),
            },
            server: ServerConfig {
                bind_address: "0.0.0.0".to_string(),
                port: 8080,
                graceful_shutdown_secs: 15,
            },
            webhook: WebhookConfig { fulfillment_text: DEFAULT_FULFILLMENT_TEXT.to_string() },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
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

impl NluConfig {
    /// The configured access token, ignoring a blank value.
    pub fn configured_access_token(&self) -> Option<&SecretString> {
        self.access_token.as_ref().filter(|token| !token.expose_secret().trim().is_empty())
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected =
                options.config_path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.server.bind_address, self.server.port)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(nlu) = patch.nlu {
            if let Some(project_id) = nlu.project_id {
                self.nlu.project_id = project_id;
            }
            if let Some(credentials_path) = nlu.credentials_path {
                self.nlu.credentials_path = credentials_path;
            }
            if let Some(access_token_value) = nlu.access_token {
                self.nlu.access_token = Some(secret_value(access_token_value));
            }
            if let Some(language_code) = nlu.language_code {
                self.nlu.language_code = language_code;
            }
            if let Some(time_zone) = nlu.time_zone {
                self.nlu.time_zone = time_zone;
            }
            if let Some(base_url) = nlu.base_url {
                self.nlu.base_url = base_url;
            }
            if let Some(timeout_secs) = nlu.timeout_secs {
                self.nlu.timeout_secs = timeout_secs;
            }
            if let Some(default_session_id) = nlu.default_session_id {
                self.nlu.default_session_id = default_session_id;
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(graceful_shutdown_secs) = server.graceful_shutdown_secs {
                self.server.graceful_shutdown_secs = graceful_shutdown_secs;
            }
        }

        if let Some(webhook) = patch.webhook {
            if let Some(fulfillment_text) = webhook.fulfillment_text {
                self.webhook.fulfillment_text = fulfillment_text;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("INTENT_RELAY_NLU_PROJECT_ID") {
            self.nlu.project_id = value;
        }
        if let Some(value) = read_env("INTENT_RELAY_NLU_CREDENTIALS_PATH") {
            self.nlu.credentials_path = PathBuf::from(value);
        }
        if let Some(value) = read_env("INTENT_RELAY_NLU_ACCESS_TOKEN") {
            self.nlu.access_token = Some(secret_value(value));
        }
        if let Some(value) = read_env("INTENT_RELAY_NLU_LANGUAGE_CODE") {
            self.nlu.language_code = value;
        }
        if let Some(value) = read_env("INTENT_RELAY_NLU_TIME_ZONE") {
            self.nlu.time_zone = value;
        }
        if let Some(value) = read_env("INTENT_RELAY_NLU_BASE_URL") {
            self.nlu.base_url = value;
        }
        if let Some(value) = read_env("INTENT_RELAY_NLU_TIMEOUT_SECS") {
            self.nlu.timeout_secs = parse_u64("INTENT_RELAY_NLU_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = read_env("INTENT_RELAY_NLU_DEFAULT_SESSION_ID") {
            self.nlu.default_session_id = value;
        }

        if let Some(value) = read_env("INTENT_RELAY_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        // `PORT` is the hosting platform convention; the prefixed variable wins.
        if let Some(value) = read_env("INTENT_RELAY_SERVER_PORT") {
            self.server.port = parse_u16("INTENT_RELAY_SERVER_PORT", &value)?;
        } else if let Some(value) = read_env("PORT") {
            self.server.port = parse_u16("PORT", &value)?;
        }
        if let Some(value) = read_env("INTENT_RELAY_SERVER_GRACEFUL_SHUTDOWN_SECS") {
            self.server.graceful_shutdown_secs =
                parse_u64("INTENT_RELAY_SERVER_GRACEFUL_SHUTDOWN_SECS", &value)?;
        }

        if let Some(value) = read_env("INTENT_RELAY_WEBHOOK_FULFILLMENT_TEXT") {
            self.webhook.fulfillment_text = value;
        }

        let log_level = read_env("INTENT_RELAY_LOGGING_LEVEL")
            .or_else(|| read_env("INTENT_RELAY_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format = read_env("INTENT_RELAY_LOGGING_FORMAT")
            .or_else(|| read_env("INTENT_RELAY_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(project_id) = overrides.project_id {
            self.nlu.project_id = project_id;
        }
        if let Some(credentials_path) = overrides.credentials_path {
            self.nlu.credentials_path = credentials_path;
        }
        if let Some(access_token) = overrides.access_token {
            self.nlu.access_token = Some(secret_value(access_token));
        }
        if let Some(base_url) = overrides.nlu_base_url {
            self.nlu.base_url = base_url;
        }
        if let Some(bind_address) = overrides.bind_address {
            self.server.bind_address = bind_address;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_nlu(&self.nlu)?;
        validate_server(&self.server)?;
        validate_webhook(&self.webhook)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from(DEFAULT_CONFIG_FILE), PathBuf::from(NESTED_CONFIG_FILE)]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_nlu(nlu: &NluConfig) -> Result<(), ConfigError> {
    let project_id = nlu.project_id.trim();
    if project_id.is_empty() {
        return Err(ConfigError::Validation(
            "nlu.project_id is required. Find it in the agent settings of your Dialogflow console"
                .to_string(),
        ));
    }
    if project_id.contains('/') {
        return Err(ConfigError::Validation(
            "nlu.project_id must be a bare project id, not a resource path".to_string(),
        ));
    }

    if nlu.language_code.trim().is_empty() {
        return Err(ConfigError::Validation("nlu.language_code must not be empty".to_string()));
    }
    if nlu.time_zone.trim().is_empty() {
        return Err(ConfigError::Validation("nlu.time_zone must not be empty".to_string()));
    }

    if !nlu.base_url.starts_with("http://") && !nlu.base_url.starts_with("https://") {
        return Err(ConfigError::Validation(
            "nlu.base_url must start with http:// or https://".to_string(),
        ));
    }

    if nlu.timeout_secs == 0 || nlu.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "nlu.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    if nlu.default_session_id.trim().is_empty() {
        return Err(ConfigError::Validation(
            "nlu.default_session_id must not be empty".to_string(),
        ));
    }

    if nlu.configured_access_token().is_none() && nlu.credentials_path.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "nlu.credentials_path is required when nlu.access_token is not set".to_string(),
        ));
    }

    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.bind_address.trim().is_empty() {
        return Err(ConfigError::Validation("server.bind_address must not be empty".to_string()));
    }

    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }

    if server.graceful_shutdown_secs == 0 {
        return Err(ConfigError::Validation(
            "server.graceful_shutdown_secs must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_webhook(webhook: &WebhookConfig) -> Result<(), ConfigError> {
    if webhook.fulfillment_text.trim().is_empty() {
        return Err(ConfigError::Validation(
            "webhook.fulfillment_text must not be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    nlu: Option<NluPatch>,
    server: Option<ServerPatch>,
    webhook: Option<WebhookPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct NluPatch {
    project_id: Option<String>,
    credentials_path: Option<PathBuf>,
    access_token: Option<String>,
    language_code: Option<String>,
    time_zone: Option<String>,
    base_url: Option<String>,
    timeout_secs: Option<u64>,
    default_session_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    graceful_shutdown_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct WebhookPatch {
    fulfillment_text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
