use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::ApplicationError;

/// Provider limit on session identifier length.
pub const MAX_SESSION_ID_LEN: usize = 36;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    /// Accepts caller-supplied identifiers that are safe to embed in a
    /// provider resource path.
    pub fn parse(raw: &str) -> Result<Self, ApplicationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ApplicationError::InvalidInput("session id must not be empty".to_string()));
        }
        if trimmed.len() > MAX_SESSION_ID_LEN {
            return Err(ApplicationError::InvalidInput(format!(
                "session id must be at most {MAX_SESSION_ID_LEN} characters"
            )));
        }
        let allowed =
            trimmed.chars().all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.'));
        if !allowed {
            return Err(ApplicationError::InvalidInput(
                "session id may only contain ASCII letters, digits, `-`, `_` and `.`".to_string(),
            ));
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One free-text query bound to the conversational session it belongs to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Query {
    pub text: String,
    pub session_id: SessionId,
}

impl Query {
    pub fn new(text: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self { text: text.into(), session_id: SessionId(session_id.into()) }
    }
}

/// Simplified view of a provider detection: the matched intent plus every
/// returned parameter flattened to a display string.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    pub intent: String,
    pub confidence: f32,
    pub entities: BTreeMap<String, String>,
}

impl DetectionResult {
    pub fn is_matched(&self) -> bool {
        !self.intent.is_empty()
    }
}
