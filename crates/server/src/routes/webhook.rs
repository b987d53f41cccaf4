use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use intent_relay_core::{WebhookRequest, WebhookResponse};
use tracing::{info, warn};

use crate::routes::AppState;

/// Fulfillment callback. The response is the same for every well-formed
/// payload; undecodable payloads get a bare 400.
pub async fn handle_webhook(State(state): State<AppState>, body: Bytes) -> Response {
    let request = match serde_json::from_slice::<WebhookRequest>(&body) {
        Ok(request) => request,
        Err(error) => {
            warn!(
                event_name = "relay.webhook.rejected",
                error = %error,
                body_bytes = body.len(),
                "webhook payload could not be decoded"
            );
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    info!(
        event_name = "relay.webhook.received",
        response_id = %request.response_id,
        session = %request.session,
        query_text = %request.query_text(),
        "webhook fulfillment requested"
    );

    (StatusCode::OK, Json(WebhookResponse::canned(&*state.fulfillment_text)))
        .into_response()
}
