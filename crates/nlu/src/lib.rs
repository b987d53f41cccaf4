//! NLU adapter - one intent detection per inbound query
//!
//! This crate owns the conversation with the hosted NLU provider (Dialogflow v2):
//! - Resolves credentials once at startup (`credentials`)
//! - Builds `detectIntent` requests for a session (`protocol`)
//! - Maps provider responses into a [`DetectionResult`] with every parameter
//!   flattened to a display string (`client`)
//!
//! # Key Types
//!
//! - `IntentDetector` - the seam handlers depend on; tests substitute doubles
//! - `DialogflowClient` - the production implementation over `reqwest`
//! - `NluError` - recoverable per-request failures, never process-fatal
//!
//! [`DetectionResult`]: intent_relay_core::DetectionResult

pub mod client;
pub mod credentials;
pub mod error;
pub mod protocol;

pub use client::{session_path, DialogflowClient, IntentDetector};
pub use credentials::Credentials;
pub use error::NluError;
