use axum::{
    extract::{rejection::FormRejection, State},
    http::HeaderMap,
    Form, Json,
};
use intent_relay_core::{ApplicationError, DetectionResult, InterfaceError, Query, SessionId};
use serde::Deserialize;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::error::ApiError;
use crate::routes::AppState;

pub const SESSION_HEADER: &str = "x-session-id";

#[derive(Debug, Default, Deserialize)]
pub struct EndpointForm {
    pub message: Option<String>,
    pub session_id: Option<String>,
}

pub async fn handle_endpoint(
    State(state): State<AppState>,
    headers: HeaderMap,
    form: Result<Form<EndpointForm>, FormRejection>,
) -> Result<Json<DetectionResult>, ApiError> {
    let correlation_id = Uuid::new_v4().to_string();

    let Form(form) = form.map_err(|rejection| {
        warn!(
            event_name = "relay.endpoint.rejected",
            correlation_id = %correlation_id,
            error = %rejection,
            "endpoint form could not be decoded"
        );
        InterfaceError::bad_request(rejection.body_text(), correlation_id.clone())
    })?;

    let query = build_query(&state, &headers, form)
        .map_err(|error| reject(error, &correlation_id))?;

    info!(
        event_name = "relay.endpoint.received",
        correlation_id = %correlation_id,
        session_id = %query.session_id,
        message_chars = query.text.chars().count(),
        "detect intent requested"
    );
    debug!(correlation_id = %correlation_id, message = %query.text, "endpoint message");

    match state.detector.detect_intent(&query).await {
        Ok(result) => {
            info!(
                event_name = "relay.endpoint.detected",
                correlation_id = %correlation_id,
                session_id = %query.session_id,
                intent = %result.intent,
                confidence = result.confidence,
                entity_count = result.entities.len(),
                "intent detected"
            );
            Ok(Json(result))
        }
        Err(nlu_error) => {
            let remote = nlu_error.is_remote_unavailable();
            let application = ApplicationError::from(nlu_error);
            if remote {
                warn!(
                    event_name = "relay.endpoint.remote_unavailable",
                    correlation_id = %correlation_id,
                    session_id = %query.session_id,
                    error = %application,
                    "nlu provider call failed"
                );
            } else {
                error!(
                    event_name = "relay.endpoint.failed",
                    correlation_id = %correlation_id,
                    session_id = %query.session_id,
                    error = %application,
                    "detect intent failed"
                );
            }
            Err(ApiError(application.into_interface(correlation_id)))
        }
    }
}

/// Resolves the session from the form, then the session header, then the
/// configured default.
fn build_query(
    state: &AppState,
    headers: &HeaderMap,
    form: EndpointForm,
) -> Result<Query, ApplicationError> {
    let message = form
        .message
        .filter(|message| !message.trim().is_empty())
        .ok_or_else(|| ApplicationError::InvalidInput("`message` is required".to_string()))?;

    let header_session = headers.get(SESSION_HEADER).map(|value| {
        value.to_str().map(str::to_string).map_err(|_| {
            ApplicationError::InvalidInput("session header must be visible ASCII".to_string())
        })
    });

    let session_id = match (form.session_id, header_session) {
        (Some(raw), _) => SessionId::parse(&raw)?,
        (None, Some(raw)) => SessionId::parse(&raw?)?,
        (None, None) => state.default_session.clone(),
    };

    Ok(Query { text: message, session_id })
}

fn reject(error: ApplicationError, correlation_id: &str) -> ApiError {
    warn!(
        event_name = "relay.endpoint.rejected",
        correlation_id = %correlation_id,
        error = %error,
        "endpoint input rejected"
    );
    ApiError(error.into_interface(correlation_id))
}
