//! Session domain model.
//!
//! This module contains the core Session entity that represents
//! one bounded conversation in the application's domain layer.

use super::message::{ConversationMessage, MessageRole};
use serde::{Deserialize, Serialize};

/// Represents one bounded conversation instance in the domain layer.
///
/// A session contains:
/// - An append-only log of user/assistant messages
/// - A single-flight gate (`is_generating`) read before a new turn is accepted
/// - A one-shot publish guard (`has_published`)
/// - Timestamps for creation and last update
///
/// This is the "pure" domain model that business logic operates on. The
/// message log is append-only: no edits, no deletions. The log and the
/// derived artifacts are always consistent with the last successfully
/// processed chat turn — there is no partially-applied state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Unique session identifier (UUID format), stable for the lifetime
    /// of one conversation.
    pub id: String,
    /// Append-only conversation log, insertion order preserved.
    pub messages: Vec<ConversationMessage>,
    /// True while a chat turn is in flight for this session.
    pub is_generating: bool,
    /// True once the document has been published for this session.
    /// Transitions false -> true at most once per session lifetime.
    pub has_published: bool,
    /// Timestamp when the session was created (ISO 8601 format).
    pub created_at: String,
    /// Timestamp when the session was last updated (ISO 8601 format).
    pub updated_at: String,
}

impl Session {
    /// Creates a fresh session with a new UUID and an empty log.
    pub fn new() -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            messages: Vec::new(),
            is_generating: false,
            has_published: false,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Appends a message to the log and bumps the update timestamp.
    pub fn append(&mut self, message: ConversationMessage) {
        self.messages.push(message);
        self.updated_at = chrono::Utc::now().to_rfc3339();
    }

    /// Returns true if no turn has happened yet in this session.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Returns the number of assistant messages in the log.
    pub fn assistant_message_count(&self) -> usize {
        self.messages
            .iter()
            .filter(|m| m.role == MessageRole::Assistant)
            .count()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
