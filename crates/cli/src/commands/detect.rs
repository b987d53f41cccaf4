use intent_relay_core::config::{AppConfig, LoadOptions};
use intent_relay_core::{Query, SessionId};
use intent_relay_nlu::{DialogflowClient, IntentDetector};

use crate::commands::{CommandResult, EXIT_CONFIG, EXIT_CREDENTIALS, EXIT_INVALID, EXIT_REMOTE};

const COMMAND: &str = "detect";

pub fn run(message: &str, session_id: Option<&str>) -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(COMMAND, "config_validation", error.to_string(), EXIT_CONFIG)
        }
    };

    if message.trim().is_empty() {
        return CommandResult::failure(COMMAND, "invalid_input", "message is required", EXIT_INVALID);
    }

    let session = match SessionId::parse(session_id.unwrap_or(&config.nlu.default_session_id)) {
        Ok(session) => session,
        Err(error) => {
            return CommandResult::failure(COMMAND, "invalid_input", error.to_string(), EXIT_INVALID)
        }
    };

    let client = match DialogflowClient::from_config(&config.nlu) {
        Ok(client) => client,
        Err(error) => {
            return CommandResult::failure(COMMAND, "nlu_credentials", error.to_string(), EXIT_CREDENTIALS)
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                COMMAND,
                "runtime",
                format!("failed to initialize async runtime: {error}"),
                1,
            )
        }
    };

    let query = Query { text: message.to_string(), session_id: session };
    match runtime.block_on(client.detect_intent(&query)) {
        Ok(result) => {
            let summary = if result.is_matched() {
                format!("matched `{}` with confidence {:.2}", result.intent, result.confidence)
            } else {
                "no intent matched".to_string()
            };
            let data = serde_json::to_value(&result).ok();
            CommandResult::success_with_data(COMMAND, summary, data)
        }
        Err(error) if error.is_remote_unavailable() => {
            CommandResult::failure(COMMAND, "remote_unavailable", error.to_string(), EXIT_REMOTE)
        }
        Err(error) => {
            CommandResult::failure(COMMAND, "malformed_response", error.to_string(), EXIT_INVALID)
        }
    }
}
