//! Fulfillment webhook contract shared with the NLU provider.
//!
//! Inbound payloads are decoded leniently: every field is optional and unknown
//! fields are ignored, so provider-side schema additions never break parsing.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::lenient::null_as_default;

pub const DEFAULT_FULFILLMENT_TEXT: &str = "How should I know?!";
pub const SIMPLE_RESPONSE_TEXT: &str = "this is a simple response";

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WebhookRequest {
    #[serde(deserialize_with = "null_as_default")]
    pub response_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub session: String,
    #[serde(deserialize_with = "null_as_default")]
    pub query_result: WebhookQueryResult,
    pub original_detect_intent_request: Option<Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WebhookQueryResult {
    #[serde(deserialize_with = "null_as_default")]
    pub query_text: String,
    #[serde(deserialize_with = "null_as_default")]
    pub language_code: String,
    #[serde(deserialize_with = "null_as_default")]
    pub parameters: Map<String, Value>,
    pub intent: Option<WebhookIntent>,
    #[serde(deserialize_with = "null_as_default")]
    pub intent_detection_confidence: f32,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WebhookIntent {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub display_name: String,
}

impl WebhookRequest {
    pub fn query_text(&self) -> &str {
        &self.query_result.query_text
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookResponse {
    pub fulfillment_text: String,
    pub payload: WebhookPayload,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WebhookPayload {
    pub google: GooglePayload,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GooglePayload {
    pub expect_user_response: bool,
    pub rich_response: RichResponse,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RichResponse {
    pub items: Vec<RichResponseItem>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RichResponseItem {
    pub simple_response: SimpleResponse,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleResponse {
    pub text_to_speech: String,
}

impl WebhookResponse {
    /// Fixed fulfillment returned for every webhook call, independent of the request.
    pub fn canned(fulfillment_text: impl Into<String>) -> Self {
        Self {
            fulfillment_text: fulfillment_text.into(),
            payload: WebhookPayload {
                google: GooglePayload {
                    expect_user_response: true,
                    rich_response: RichResponse {
                        items: vec![RichResponseItem {
                            simple_response: SimpleResponse {
                                text_to_speech: SIMPLE_RESPONSE_TEXT.to_string(),
                            },
                        }],
                    },
                },
            },
        }
    }
}

impl Default for WebhookResponse {
    fn default() -> Self {
        Self::canned(DEFAULT_FULFILLMENT_TEXT)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{WebhookRequest, WebhookResponse};

    #[test]
    fn request_ignores_unknown_fields() {
        let request: WebhookRequest = serde_json::from_value(json!({
            "responseId": "resp-1",
            "queryResult": {
                "queryText": "book a table",
                "parameters": { "guests": 4 },
                "fulfillmentMessages": [{ "text": { "text": [""] } }],
                "intent": { "name": "projects/p/agent/intents/1", "displayName": "book" }
            },
            "somethingNew": { "nested": true }
        }))
        .expect("unknown fields should be ignored");

        assert_eq!(request.query_text(), "book a table");
        assert_eq!(request.response_id, "resp-1");
        assert_eq!(
            request.query_result.intent.as_ref().map(|intent| intent.display_name.as_str()),
            Some("book")
        );
    }

    #[test]
    fn empty_object_decodes_to_defaults() {
        let request: WebhookRequest = serde_json::from_str("{}").expect("empty payload");
        assert_eq!(request.query_text(), "");
        assert!(request.query_result.intent.is_none());
    }

    #[test]
    fn null_known_fields_decode_as_defaults() {
        let request: WebhookRequest =
            serde_json::from_value(json!({ "queryResult": null })).expect("null query result");
        assert_eq!(request.query_text(), "");

        let request: WebhookRequest = serde_json::from_value(json!({
            "responseId": null,
            "session": null,
            "queryResult": {
                "queryText": "hi",
                "languageCode": null,
                "parameters": null,
                "intent": { "name": null, "displayName": null },
                "intentDetectionConfidence": null
            },
            "originalDetectIntentRequest": null
        }))
        .expect("null fields should read as defaults");

        assert_eq!(request.query_text(), "hi");
        assert_eq!(request.response_id, "");
        assert!(request.query_result.parameters.is_empty());
        assert_eq!(request.query_result.intent_detection_confidence, 0.0);
        assert_eq!(
            request.query_result.intent.as_ref().map(|intent| intent.display_name.as_str()),
            Some("")
        );
        assert!(request.original_detect_intent_request.is_none());
    }

    #[test]
    fn malformed_json_is_rejected() {
        assert!(serde_json::from_str::<WebhookRequest>("{\"queryResult\":").is_err());
        assert!(serde_json::from_str::<WebhookRequest>("\"not an object\"").is_err());
    }

    #[test]
    fn canned_response_has_provider_shape() {
        let payload = serde_json::to_value(WebhookResponse::canned("sure thing")).expect("json");

        assert_eq!(
            payload,
            json!({
                "fulfillmentText": "sure thing",
                "payload": {
                    "google": {
                        "expectUserResponse": true,
                        "richResponse": {
                            "items": [
                                { "simpleResponse": { "textToSpeech": "this is a simple response" } }
                            ]
                        }
                    }
                }
            })
        );
    }
}
