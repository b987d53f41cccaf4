use std::sync::Arc;

use intent_relay_core::config::{AppConfig, ConfigError};
use intent_relay_core::{ApplicationError, SessionId};
use intent_relay_nlu::{DialogflowClient, IntentDetector, NluError};
use thiserror::Error;
use tracing::info;

use crate::routes::AppState;

pub struct Application {
    pub config: AppConfig,
    pub detector: Arc<dyn IntentDetector>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("nlu client initialization failed: {0}")]
    Nlu(#[source] NluError),
    #[error("nlu.default_session_id is not usable: {0}")]
    DefaultSession(#[source] ApplicationError),
}

pub fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        project_id = %config.nlu.project_id,
        "starting application bootstrap"
    );

    let client = DialogflowClient::from_config(&config.nlu).map_err(BootstrapError::Nlu)?;
    info!(
        event_name = "system.bootstrap.nlu_ready",
        correlation_id = "bootstrap",
        credentials = client.credentials_kind(),
        language_code = %config.nlu.language_code,
        time_zone = %config.nlu.time_zone,
        "nlu client initialized"
    );

    Ok(Application { config, detector: Arc::new(client) })
}

impl Application {
    pub fn state(&self) -> Result<AppState, BootstrapError> {
        let default_session = SessionId::parse(&self.config.nlu.default_session_id)
            .map_err(BootstrapError::DefaultSession)?;

        Ok(AppState {
            detector: Arc::clone(&self.detector),
            default_session,
            fulfillment_text: Arc::from(self.config.webhook.fulfillment_text.as_str()),
        })
    }
}
