use std::time::Duration;

use async_trait::async_trait;
use intent_relay_core::config::NluConfig;
use intent_relay_core::{DetectionResult, Query};
use reqwest::Client;
use tracing::debug;

use crate::credentials::Credentials;
use crate::error::NluError;
use crate::protocol::{DetectIntentRequest, DetectIntentResponse};

/// Upper bound on how much of an error body is kept for diagnostics.
const MAX_ERROR_BODY_CHARS: usize = 512;

#[async_trait]
pub trait IntentDetector: Send + Sync {
    async fn detect_intent(&self, query: &Query) -> Result<DetectionResult, NluError>;
}

pub fn session_path(project_id: &str, session_id: &str) -> String {
    format!("projects/{project_id}/agent/sessions/{session_id}")
}

/// Long-lived provider client. Cloning shares the underlying connection pool.
#[derive(Clone, Debug)]
pub struct DialogflowClient {
    http: Client,
    base_url: String,
    project_id: String,
    language_code: String,
    time_zone: String,
    timeout_secs: u64,
    credentials: Credentials,
}

impl DialogflowClient {
    pub fn from_config(config: &NluConfig) -> Result<Self, NluError> {
        let credentials = Credentials::resolve(config)?;
        Self::new(config, credentials)
    }

    pub fn new(config: &NluConfig, credentials: Credentials) -> Result<Self, NluError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|error| NluError::ClientBuild(error.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            project_id: config.project_id.clone(),
            language_code: config.language_code.clone(),
            time_zone: config.time_zone.clone(),
            timeout_secs: config.timeout_secs,
            credentials,
        })
    }

    pub fn credentials_kind(&self) -> &'static str {
        self.credentials.kind()
    }

    fn detect_url(&self, session_id: &str) -> String {
        format!(
            "{}/v2/{}:detectIntent",
            self.base_url,
            session_path(&self.project_id, session_id)
        )
    }

    fn transport_error(&self, error: reqwest::Error) -> NluError {
        if error.is_timeout() {
            NluError::Timeout(self.timeout_secs)
        } else {
            NluError::Transport(error.to_string())
        }
    }
}

#[async_trait]
impl IntentDetector for DialogflowClient {
    async fn detect_intent(&self, query: &Query) -> Result<DetectionResult, NluError> {
        let url = self.detect_url(query.session_id.as_str());
        let body = DetectIntentRequest::text(&query.text, &self.language_code, &self.time_zone);

        debug!(
            event_name = "nlu.detect_intent.request",
            session_id = %query.session_id,
            url = %url,
            "sending detect intent request"
        );

        let response = self
            .credentials
            .apply(self.http.post(&url).json(&body))
            .send()
            .await
            .map_err(|error| self.transport_error(error))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NluError::Status {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        let bytes = response.bytes().await.map_err(|error| self.transport_error(error))?;
        let decoded: DetectIntentResponse = serde_json::from_slice(&bytes)
            .map_err(|error| NluError::MalformedResponse(error.to_string()))?;

        Ok(decoded.into_detection())
    }
}
