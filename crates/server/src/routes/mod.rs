pub mod endpoint;
pub mod webhook;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Json, Router,
};
use intent_relay_core::SessionId;
use intent_relay_nlu::IntentDetector;
use serde::Serialize;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub detector: Arc<dyn IntentDetector>,
    pub default_session: SessionId,
    pub fulfillment_text: Arc<str>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PingResponse {
    pub message: &'static str,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(hello))
        .route("/ping", get(ping_text).post(ping_json))
        .route("/endpoint", post(endpoint::handle_endpoint))
        .route("/webhook", post(webhook::handle_webhook))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn hello() -> &'static str {
    "Hello World!"
}

async fn ping_text() -> &'static str {
    "pong"
}

async fn ping_json() -> Json<PingResponse> {
    Json(PingResponse { message: "pong" })
}
