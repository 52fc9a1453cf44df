//! Error types for the Magenta application.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the entire Magenta application.
///
/// This provides typed, structured error variants with automatic conversion
/// from common error types via the `From` trait. No variant is fatal to the
/// process: the worst outcome of any of these is a warning message in the
/// conversation and an un-advanced document state.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum MagentaError {
    /// The remote chat service could not be reached or returned a
    /// non-success status. Recovered locally by the configured
    /// gateway-failure policy.
    #[error("Chat backend unavailable: {message}")]
    GatewayUnavailable { message: String },

    /// The publish call failed (transport error or non-success status).
    /// Leaves the publish guard clear so a later response may retry.
    #[error("Publish failed: {message}")]
    PublishFailed { message: String },

    /// User input was rejected before a turn was started.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A chat turn is already in flight for this session.
    #[error("A turn is already in progress for this session")]
    TurnInFlight,
}

impl MagentaError {
    /// Creates a GatewayUnavailable error
    pub fn gateway_unavailable(message: impl Into<String>) -> Self {
        Self::GatewayUnavailable {
            message: message.into(),
        }
    }

    /// Creates a PublishFailed error
    pub fn publish_failed(message: impl Into<String>) -> Self {
        Self::PublishFailed {
            message: message.into(),
        }
    }

    /// Creates an InvalidInput error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Check if this is a GatewayUnavailable error
    pub fn is_gateway_unavailable(&self) -> bool {
        matches!(self, Self::GatewayUnavailable { .. })
    }
}

/// A type alias for `Result<T, MagentaError>`.
pub type Result<T> = std::result::Result<T, MagentaError>;
