use intent_relay_core::ApplicationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NluError {
    #[error("could not read credentials file `{path}`: {reason}")]
    Credentials { path: String, reason: String },
    #[error("could not build http client: {0}")]
    ClientBuild(String),
    #[error("request to nlu provider failed: {0}")]
    Transport(String),
    #[error("request to nlu provider timed out after {0}s")]
    Timeout(u64),
    #[error("nlu provider rejected the request with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("nlu provider response could not be decoded: {0}")]
    MalformedResponse(String),
}

impl NluError {
    /// Whether the provider could not be reached or refused to answer.
    pub fn is_remote_unavailable(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Timeout(_) | Self::Status { .. })
    }
}

impl From<NluError> for ApplicationError {
    fn from(value: NluError) -> Self {
        match value {
            NluError::Transport(_) | NluError::Timeout(_) | NluError::Status { .. } => {
                Self::RemoteUnavailable(value.to_string())
            }
            NluError::MalformedResponse(_) => Self::MalformedResponse(value.to_string()),
            NluError::Credentials { .. } | NluError::ClientBuild(_) => {
                Self::Configuration(value.to_string())
            }
        }
    }
}
