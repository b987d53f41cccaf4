use std::fs;
use std::path::Path;

use intent_relay_core::config::NluConfig;
use reqwest::RequestBuilder;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::error::NluError;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// How outbound provider requests authenticate.
#[derive(Clone, Debug)]
pub enum Credentials {
    AccessToken(SecretString),
    ApiKey(SecretString),
}

#[derive(Debug, Deserialize)]
struct CredentialFile {
    #[serde(rename = "type")]
    kind: Option<String>,
    access_token: Option<String>,
    api_key: Option<String>,
}

impl Credentials {
    /// A configured access token wins over the credentials file.
    pub fn resolve(config: &NluConfig) -> Result<Self, NluError> {
        if let Some(token) = config.configured_access_token() {
            return Ok(Self::AccessToken(token.clone()));
        }

        Self::from_file(&config.credentials_path)
    }

    pub fn from_file(path: &Path) -> Result<Self, NluError> {
        let display = path.display().to_string();
        let raw = fs::read_to_string(path).map_err(|error| NluError::Credentials {
            path: display.clone(),
            reason: error.to_string(),
        })?;
        let file: CredentialFile = serde_json::from_str(&raw).map_err(|error| {
            NluError::Credentials { path: display.clone(), reason: error.to_string() }
        })?;

        if let Some(token) = non_blank(file.access_token) {
            return Ok(Self::AccessToken(token.into()));
        }
        if let Some(key) = non_blank(file.api_key) {
            return Ok(Self::ApiKey(key.into()));
        }

        let reason = if file.kind.as_deref() == Some("service_account") {
            "service account keys must be exchanged for an access token first; \
             set `access_token` in the file or INTENT_RELAY_NLU_ACCESS_TOKEN"
                .to_string()
        } else {
            "expected an `access_token` or `api_key` field".to_string()
        };
        Err(NluError::Credentials { path: display, reason })
    }

    pub fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self {
            Self::AccessToken(token) => request.bearer_auth(token.expose_secret()),
            Self::ApiKey(key) => request.header(API_KEY_HEADER, key.expose_secret()),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::AccessToken(_) => "access_token",
            Self::ApiKey(_) => "api_key",
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}
