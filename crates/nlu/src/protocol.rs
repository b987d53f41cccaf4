//! Wire types for the provider's `detectIntent` REST call.

use intent_relay_core::domain::lenient::null_as_default;
use intent_relay_core::{entities::flatten, DetectionResult, DynamicValue};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectIntentRequest {
    pub query_input: QueryInput,
    pub query_params: QueryParameters,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct QueryInput {
    pub text: TextInput,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextInput {
    pub text: String,
    pub language_code: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryParameters {
    pub time_zone: String,
}

impl DetectIntentRequest {
    pub fn text(
        text: impl Into<String>,
        language_code: impl Into<String>,
        time_zone: impl Into<String>,
    ) -> Self {
        Self {
            query_input: QueryInput {
                text: TextInput { text: text.into(), language_code: language_code.into() },
            },
            query_params: QueryParameters { time_zone: time_zone.into() },
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DetectIntentResponse {
    #[serde(deserialize_with = "null_as_default")]
    pub response_id: String,
    pub query_result: Option<QueryResult>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QueryResult {
    #[serde(deserialize_with = "null_as_default")]
    pub query_text: String,
    #[serde(deserialize_with = "null_as_default")]
    pub parameters: Map<String, Value>,
    pub intent: Option<MatchedIntent>,
    #[serde(deserialize_with = "null_as_default")]
    pub intent_detection_confidence: f32,
    #[serde(deserialize_with = "null_as_default")]
    pub fulfillment_text: String,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MatchedIntent {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub display_name: String,
}

impl DetectIntentResponse {
    /// Collapses the provider response into the relay's summary shape. Every
    /// returned parameter yields exactly one entity entry.
    pub fn into_detection(self) -> DetectionResult {
        let mut result = DetectionResult::default();
        let Some(query_result) = self.query_result else {
            return result;
        };

        if let Some(intent) = query_result.intent {
            result.intent = intent.display_name;
            result.confidence = query_result.intent_detection_confidence;
        }

        for (name, raw) in query_result.parameters {
            let value = DynamicValue::from(raw);
            let flattened = flatten(&value);
            debug!(
                event_name = "nlu.parameter.flattened",
                parameter = %name,
                kind = value.kind(),
                value = %flattened,
                "flattened detection parameter"
            );
            result.entities.insert(name, flattened);
        }

        result
    }
}
