use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use intent_relay_core::config::{AppConfig, LoadOptions, DEFAULT_CONFIG_FILE, NESTED_CONFIG_FILE};
use secrecy::ExposeSecret;
use toml::Value;

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, env_key: &str| {
        field_source(key_path, Some(env_key), config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];

    lines.push(render_line(
        "nlu.project_id",
        &config.nlu.project_id,
        source("nlu.project_id", "INTENT_RELAY_NLU_PROJECT_ID"),
    ));
    lines.push(render_line(
        "nlu.credentials_path",
        &config.nlu.credentials_path.display().to_string(),
        source("nlu.credentials_path", "INTENT_RELAY_NLU_CREDENTIALS_PATH"),
    ));

    let access_token = config
        .nlu
        .access_token
        .as_ref()
        .map(|token| redact_token(token.expose_secret()))
        .unwrap_or_else(|| "<unset>".to_string());
    lines.push(render_line(
        "nlu.access_token",
        &access_token,
        source("nlu.access_token", "INTENT_RELAY_NLU_ACCESS_TOKEN"),
    ));
    lines.push(render_line(
        "nlu.language_code",
        &config.nlu.language_code,
        source("nlu.language_code", "INTENT_RELAY_NLU_LANGUAGE_CODE"),
    ));
    lines.push(render_line(
        "nlu.time_zone",
        &config.nlu.time_zone,
        source("nlu.time_zone", "INTENT_RELAY_NLU_TIME_ZONE"),
    ));
    lines.push(render_line(
        "nlu.base_url",
        &config.nlu.base_url,
        source("nlu.base_url", "INTENT_RELAY_NLU_BASE_URL"),
    ));
    lines.push(render_line(
        "nlu.timeout_secs",
        &config.nlu.timeout_secs.to_string(),
        source("nlu.timeout_secs", "INTENT_RELAY_NLU_TIMEOUT_SECS"),
    ));
    lines.push(render_line(
        "nlu.default_session_id",
        &config.nlu.default_session_id,
        source("nlu.default_session_id", "INTENT_RELAY_NLU_DEFAULT_SESSION_ID"),
    ));

    lines.push(render_line(
        "server.bind_address",
        &config.server.bind_address,
        source("server.bind_address", "INTENT_RELAY_SERVER_BIND_ADDRESS"),
    ));
    let port_env =
        if env::var_os("INTENT_RELAY_SERVER_PORT").is_none() && env::var_os("PORT").is_some() {
            "PORT"
        } else {
            "INTENT_RELAY_SERVER_PORT"
        };
    lines.push(render_line(
        "server.port",
        &config.server.port.to_string(),
        source("server.port", port_env),
    ));
    lines.push(render_line(
        "server.graceful_shutdown_secs",
        &config.server.graceful_shutdown_secs.to_string(),
        source("server.graceful_shutdown_secs", "INTENT_RELAY_SERVER_GRACEFUL_SHUTDOWN_SECS"),
    ));

    lines.push(render_line(
        "webhook.fulfillment_text",
        &config.webhook.fulfillment_text,
        source("webhook.fulfillment_text", "INTENT_RELAY_WEBHOOK_FULFILLMENT_TEXT"),
    ));

    lines.push(render_line(
        "logging.level",
        &config.logging.level,
        source("logging.level", "INTENT_RELAY_LOGGING_LEVEL"),
    ));
    lines.push(render_line(
        "logging.format",
        &format!("{:?}", config.logging.format),
        source("logging.format", "INTENT_RELAY_LOGGING_FORMAT"),
    ));

    lines.join("\n")
}

fn detect_config_path() -> Option<PathBuf> {
    [PathBuf::from(DEFAULT_CONFIG_FILE), PathBuf::from(NESTED_CONFIG_FILE)]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_key: Option<&str>,
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_key {
        if env::var_os(env_key).is_some() {
            return format!("env ({env_key})");
        }
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

fn redact_token(token: &str) -> String {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    if let Some((prefix, _)) = trimmed.split_once('.') {
        return format!("{prefix}.***");
    }

    "<redacted>".to_string()
}
