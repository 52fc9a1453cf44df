//! Remote-service traits.
//!
//! These traits decouple the application's core logic from the concrete
//! HTTP implementations (see `magenta-interaction`) and let tests inject
//! deterministic fakes.

use crate::document::RequirementsDocument;
use crate::error::Result;
use crate::turn::{ChatTurnRequest, ChatTurnResponse, PublishResult};
use async_trait::async_trait;

/// Sends one chat turn to the remote service.
///
/// # Implementation Notes
///
/// Implementations make exactly one attempt per call — no internal retry.
/// A transport error or a non-success status must surface as
/// `MagentaError::GatewayUnavailable`, a distinct signal the caller
/// recovers from, not a crash.
#[async_trait]
pub trait ChatGateway: Send + Sync {
    /// Sends a chat turn and returns the backend's structured response.
    async fn send_turn(&self, request: &ChatTurnRequest) -> Result<ChatTurnResponse>;
}

/// Produces a canned, deterministic response when the gateway fails.
///
/// The synthesized response flows through the same downstream path as a
/// real one — mapping, publish check, reveal — so the pipeline never
/// learns which source produced it.
#[async_trait]
pub trait FallbackProvider: Send + Sync {
    /// Synthesizes a demo response for the given user input.
    async fn synthesize(&self, original_input: &str) -> ChatTurnResponse;
}

/// Publishes a completed requirements document to the external destination.
#[async_trait]
pub trait DocumentPublisher: Send + Sync {
    /// Publishes the document for a session.
    ///
    /// # Arguments
    ///
    /// * `session_id` - The session the document belongs to
    /// * `doc` - The current requirements snapshot
    /// * `idempotency_key` - Deduplication key (`{session_id}:{version}`)
    ///   forwarded to the destination so duplicate client-side triggers
    ///   collapse server-side
    async fn publish(
        &self,
        session_id: &str,
        doc: &RequirementsDocument,
        idempotency_key: &str,
    ) -> Result<PublishResult>;
}
