//! At-most-once publish workflow.
//!
//! Watches completion signals on incoming chat responses and fires the
//! publish call at most once per session. The state machine is
//! `NotPublished -> Publishing -> Published`, with a failed publish looping
//! back to `NotPublished` so the next qualifying response may retry.
//!
//! Holding the `Publishing` state while the call is in flight gives the
//! trigger request-level mutual exclusion: two completed responses arriving
//! back to back issue exactly one publish call. The idempotency key
//! (`{session_id}:{document_version}`) additionally lets the server
//! deduplicate anything that slips through.

use std::sync::Arc;

use magenta_core::error::MagentaError;
use magenta_core::gateway::DocumentPublisher;
use magenta_core::turn::{ChatTurnResponse, PublishResult};
use tokio::sync::Mutex;

/// Publish lifecycle for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishState {
    /// Nothing published yet; a qualifying response may trigger a publish.
    NotPublished,
    /// A publish call is in flight; further triggers are ignored.
    Publishing,
    /// The document has been published; terminal for this session.
    Published,
}

/// What a trigger evaluation resulted in.
#[derive(Debug)]
pub enum PublishOutcome {
    /// The response did not qualify, or a publish is already in flight
    /// or done.
    NotTriggered,
    /// The document was published.
    Published { result: PublishResult },
    /// The publish call failed; the guard was released for a later retry.
    Failed { error: MagentaError },
}

/// Watches chat responses and publishes the document at most once.
pub struct PublishOrchestrator {
    publisher: Arc<dyn DocumentPublisher>,
    state: Mutex<PublishState>,
}

impl PublishOrchestrator {
    /// Creates an orchestrator in the `NotPublished` state.
    pub fn new(publisher: Arc<dyn DocumentPublisher>) -> Self {
        Self {
            publisher,
            state: Mutex::new(PublishState::NotPublished),
        }
    }

    /// Returns the current publish state.
    pub async fn state(&self) -> PublishState {
        *self.state.lock().await
    }

    /// Returns the state machine to `NotPublished` (session reset).
    pub async fn reset(&self) {
        *self.state.lock().await = PublishState::NotPublished;
    }

    /// Evaluates the trigger condition for one successfully processed
    /// response and, when it qualifies, issues the publish call.
    ///
    /// Trigger condition: `is_completed` and a requirements document is
    /// present and nothing has been published (or is being published) for
    /// this session yet.
    pub async fn evaluate(&self, session_id: &str, response: &ChatTurnResponse) -> PublishOutcome {
        let Some(doc) = response.requirements.as_ref() else {
            return PublishOutcome::NotTriggered;
        };
        if !response.is_completed {
            return PublishOutcome::NotTriggered;
        }

        // Claim the guard before suspending; released only on failure.
        {
            let mut state = self.state.lock().await;
            match *state {
                PublishState::Published | PublishState::Publishing => {
                    return PublishOutcome::NotTriggered;
                }
                PublishState::NotPublished => *state = PublishState::Publishing,
            }
        }

        let idempotency_key = format!("{}:{}", session_id, doc.version);
        match self
            .publisher
            .publish(session_id, doc, &idempotency_key)
            .await
        {
            Ok(result) => {
                *self.state.lock().await = PublishState::Published;
                tracing::info!(
                    session_id = %session_id,
                    url = %result.confluence_url,
                    status = %result.status,
                    "Document published"
                );
                PublishOutcome::Published { result }
            }
            Err(error) => {
                *self.state.lock().await = PublishState::NotPublished;
                tracing::warn!(session_id = %session_id, %error, "Publish failed");
                PublishOutcome::Failed { error }
            }
        }
    }
}
