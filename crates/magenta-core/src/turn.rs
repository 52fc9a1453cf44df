//! Chat turn request/response contract with the remote service.
//!
//! These types mirror the backend's `/api/v1/chat` and `/api/v1/publish`
//! DTOs one-to-one. A `ChatTurnResponse` is owned transiently by the
//! pipeline: it is consumed to derive session state and never persisted.

use crate::document::RequirementsDocument;
use crate::session::ConversationMessage;
use serde::{Deserialize, Serialize};

/// The conversation stage the interview is currently at.
///
/// Closed set dictated by the backend's interview FSM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CurrentStep {
    Intro,
    Goal,
    Scope,
    Stakeholders,
    Rules,
    Kpi,
    Flows,
    Constraints,
    Final,
}

/// One chat turn sent to the backend.
///
/// Constructed once per send and never retried automatically.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurnRequest {
    pub session_id: String,
    pub message: String,
    /// Prior turns, optional. Omitted from the wire when not supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history: Option<Vec<ConversationMessage>>,
}

impl ChatTurnRequest {
    /// Builds a request for the latest user text without history.
    pub fn new(session_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            message: message.into(),
            history: None,
        }
    }
}

/// The backend's answer to one chat turn.
///
/// Absence of `requirements` means a conversational turn with no document
/// update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurnResponse {
    pub assistant_message: String,
    #[serde(default)]
    pub requirements: Option<RequirementsDocument>,
    pub current_step: CurrentStep,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub diagram_mermaid: Option<String>,
    #[serde(default)]
    pub final_report_html: Option<String>,
}

/// Whether the publish destination created a new page or updated one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PublishStatus {
    Created,
    Updated,
}

/// The result of one publish call.
///
/// Consumed once to produce a confirmation message; not stored beyond that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishResult {
    pub confluence_url: String,
    pub page_id: String,
    pub status: PublishStatus,
}
