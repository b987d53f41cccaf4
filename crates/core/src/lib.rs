pub mod config;
pub mod domain;
pub mod entities;
pub mod errors;

pub use domain::detection::{DetectionResult, Query, SessionId};
pub use domain::value::DynamicValue;
pub use domain::webhook::{WebhookRequest, WebhookResponse};
pub use entities::flatten;
pub use errors::{ApplicationError, InterfaceError};
