//! Session controller: the single entry point for the view layer.
//!
//! Owns the session identity, the append-only message log, the derived
//! artifacts, and the single-flight gate. Composes the chat gateway, the
//! fallback provider, and the publish orchestrator; the view layer never
//! talks to those directly.

use std::sync::Arc;

use magenta_core::document::{Artifacts, map_to_sections};
use magenta_core::error::{MagentaError, Result};
use magenta_core::gateway::{ChatGateway, DocumentPublisher, FallbackProvider};
use magenta_core::session::{ConversationMessage, Session};
use magenta_core::turn::{ChatTurnRequest, ChatTurnResponse};
use tokio::sync::RwLock;

use crate::publish_orchestrator::{PublishOrchestrator, PublishOutcome};

/// What to do when the chat gateway fails.
///
/// The two observed behaviors are reconciled into one explicit policy
/// point, chosen at construction time rather than scattered through the
/// call sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GatewayFailurePolicy {
    /// Invoke the fallback provider; the synthesized response flows through
    /// the normal pipeline.
    #[default]
    FallbackDemo,
    /// Surface a warning assistant message; no document update.
    SurfaceWarning,
}

/// Shown when the backend returns an empty assistant message.
const EMPTY_REPLY_PLACEHOLDER: &str =
    "The assistant returned an empty reply. Please rephrase and try again.";

/// Shown under the `SurfaceWarning` policy when the gateway fails.
const GATEWAY_WARNING: &str = "The analysis backend is unreachable right now. \
     Your message stays in the conversation; please try again in a moment.";

/// Composes the chat pipeline for one session.
///
/// `send` is single-flight per session: while a turn is in flight, further
/// sends are rejected with `MagentaError::TurnInFlight`. This keeps message
/// log appends from interleaving — each user message is strictly followed
/// by exactly one assistant message for that turn.
pub struct SessionController {
    session: RwLock<Session>,
    artifacts: RwLock<Artifacts>,
    gateway: Arc<dyn ChatGateway>,
    fallback: Arc<dyn FallbackProvider>,
    orchestrator: PublishOrchestrator,
    policy: GatewayFailurePolicy,
}

impl SessionController {
    /// Creates a controller for a fresh session with injected dependencies.
    pub fn new(
        gateway: Arc<dyn ChatGateway>,
        fallback: Arc<dyn FallbackProvider>,
        publisher: Arc<dyn DocumentPublisher>,
    ) -> Self {
        Self {
            session: RwLock::new(Session::new()),
            artifacts: RwLock::new(Artifacts::default()),
            gateway,
            fallback,
            orchestrator: PublishOrchestrator::new(publisher),
            policy: GatewayFailurePolicy::default(),
        }
    }

    /// Overrides the gateway-failure policy.
    pub fn with_policy(mut self, policy: GatewayFailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sends one user turn through the pipeline.
    ///
    /// Appends the user message, resolves the turn against the gateway (or
    /// the fallback, per policy), applies the response to the artifacts,
    /// runs the publish check, and appends the resulting assistant
    /// message(s). Returns the messages appended by this turn, user message
    /// first.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` for empty or whitespace-only text
    /// - `TurnInFlight` while a previous turn has not resolved
    pub async fn send(&self, text: &str) -> Result<Vec<ConversationMessage>> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(MagentaError::invalid_input(
                "message must not be empty or whitespace-only",
            ));
        }

        let session_id;
        let first_turn;
        let user_message = ConversationMessage::user(trimmed);
        {
            let mut session = self.session.write().await;
            if session.is_generating {
                return Err(MagentaError::TurnInFlight);
            }
            session.is_generating = true;
            first_turn = session.is_empty();
            session_id = session.id.clone();
            session.append(user_message.clone());
        }

        // Any artifacts still displayed from before belong to no turn of
        // this session; the first send clears them.
        if first_turn {
            *self.artifacts.write().await = Artifacts::default();
        }

        tracing::info!(session_id = %session_id, "Chat turn started");
        let result = self.run_turn(&session_id, trimmed).await;

        // The gate is cleared on every exit path, success or failure. A
        // reset while the turn was in flight replaced the session entirely;
        // the stale result is dropped without touching the new one.
        {
            let mut session = self.session.write().await;
            if session.id != session_id {
                tracing::debug!(session_id = %session_id, "Turn resolved after reset, discarding");
                return Ok(Vec::new());
            }
            session.is_generating = false;
        }

        match result {
            Ok(mut appended) => {
                appended.insert(0, user_message);
                Ok(appended)
            }
            Err(e) => Err(e),
        }
    }

    /// Starts a new analysis: clears the log, artifacts, and publish state,
    /// and issues a new session identifier, which is returned.
    pub async fn reset(&self) -> String {
        let new_id;
        {
            let mut session = self.session.write().await;
            *session = Session::new();
            new_id = session.id.clone();
        }
        *self.artifacts.write().await = Artifacts::default();
        self.orchestrator.reset().await;
        tracing::info!(session_id = %new_id, "Session reset");
        new_id
    }

    /// Snapshot of the message log.
    pub async fn messages(&self) -> Vec<ConversationMessage> {
        self.session.read().await.messages.clone()
    }

    /// Snapshot of the derived document artifacts.
    pub async fn artifacts(&self) -> Artifacts {
        self.artifacts.read().await.clone()
    }

    /// The current session identifier.
    pub async fn session_id(&self) -> String {
        self.session.read().await.id.clone()
    }

    /// True while a turn is in flight.
    pub async fn is_generating(&self) -> bool {
        self.session.read().await.is_generating
    }

    /// True once this session's document has been published.
    pub async fn has_published(&self) -> bool {
        self.session.read().await.has_published
    }

    async fn run_turn(&self, session_id: &str, text: &str) -> Result<Vec<ConversationMessage>> {
        let request = ChatTurnRequest::new(session_id, text);

        let response = match self.gateway.send_turn(&request).await {
            Ok(response) => response,
            Err(error) if error.is_gateway_unavailable() => match self.policy {
                GatewayFailurePolicy::FallbackDemo => self.fallback.synthesize(text).await,
                GatewayFailurePolicy::SurfaceWarning => {
                    tracing::warn!(session_id = %session_id, %error, "Gateway failed, surfacing warning");
                    let warning = ConversationMessage::assistant(GATEWAY_WARNING);
                    if !self.append_if_current(session_id, &warning).await {
                        return Ok(Vec::new());
                    }
                    return Ok(vec![warning]);
                }
            },
            Err(error) => return Err(error),
        };

        self.apply_response(session_id, response).await
    }

    /// Appends a message only while `session_id` is still the current
    /// session. Returns false when a reset has replaced the session, in
    /// which case nothing is appended.
    async fn append_if_current(&self, session_id: &str, message: &ConversationMessage) -> bool {
        let mut session = self.session.write().await;
        if session.id != session_id {
            return false;
        }
        session.append(message.clone());
        true
    }

    /// Applies one successfully obtained response: artifacts first, then the
    /// assistant message, then the publish check. The response is the same
    /// whether it came from the gateway or the fallback.
    ///
    /// Every mutation re-checks the session identity, so a response that
    /// resolves after a reset is discarded instead of leaking into the
    /// fresh session.
    async fn apply_response(
        &self,
        session_id: &str,
        response: ChatTurnResponse,
    ) -> Result<Vec<ConversationMessage>> {
        if let Some(doc) = &response.requirements {
            let sections = map_to_sections(doc);
            let diagram_code = response
                .diagram_mermaid
                .clone()
                .or_else(|| doc.diagram_mermaid.clone())
                .unwrap_or_default();
            // The session lock is held across the artifacts write so a
            // concurrent reset cannot slip between the identity check and
            // the update.
            let session = self.session.read().await;
            if session.id != session_id {
                return Ok(Vec::new());
            }
            *self.artifacts.write().await = Artifacts {
                doc_title: doc.project_name.clone(),
                doc_version: doc.display_version(),
                sections,
                diagram_code,
            };
            drop(session);
            tracing::debug!(
                session_id = %session_id,
                project = %doc.project_name,
                step = %response.current_step,
                "Artifacts updated"
            );
        }

        let content = if response.assistant_message.trim().is_empty() {
            EMPTY_REPLY_PLACEHOLDER.to_string()
        } else {
            response.assistant_message.clone()
        };
        let reply = ConversationMessage::assistant(content);
        if !self.append_if_current(session_id, &reply).await {
            return Ok(Vec::new());
        }
        let mut appended = vec![reply];

        if !self.session.read().await.has_published {
            match self.orchestrator.evaluate(session_id, &response).await {
                PublishOutcome::Published { result } => {
                    {
                        let mut session = self.session.write().await;
                        if session.id == session_id {
                            session.has_published = true;
                        }
                    }
                    let confirmation = ConversationMessage::assistant(format!(
                        "The requirements document has been {}: {}",
                        result.status, result.confluence_url
                    ));
                    if self.append_if_current(session_id, &confirmation).await {
                        appended.push(confirmation);
                    }
                }
                PublishOutcome::Failed { error } => {
                    let warning = ConversationMessage::assistant(format!(
                        "Publishing the document failed ({}). It will be retried \
                         when the next completed version arrives.",
                        error
                    ));
                    if self.append_if_current(session_id, &warning).await {
                        appended.push(warning);
                    }
                }
                PublishOutcome::NotTriggered => {}
            }
        }

        Ok(appended)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use magenta_core::document::{RequirementItem, RequirementsDocument};
    use magenta_core::session::MessageRole;
    use magenta_core::turn::{CurrentStep, PublishResult, PublishStatus};
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    const DEMO_PROJECT: &str = "Demo Cashback Project";

    fn demo_doc() -> RequirementsDocument {
        RequirementsDocument {
            project_name: DEMO_PROJECT.to_string(),
            goal: "Increase retention through a cashback program.".to_string(),
            scope: vec!["Mobile app".to_string()],
            stakeholders: vec!["Retail director".to_string()],
            business_rules: vec!["Verified clients only.".to_string()],
            kpi: vec!["Retention +15%".to_string()],
            requirements: vec![RequirementItem {
                id: "REQ-1".to_string(),
                title: "Cashback balance".to_string(),
                description: "Show the balance.".to_string(),
                priority: "HIGH".to_string(),
                status: "DRAFT".to_string(),
            }],
            diagram_mermaid: None,
            version: "1.0".to_string(),
            document_status: "DRAFT".to_string(),
            author: "AI Business Analyst".to_string(),
            updated_at: String::new(),
        }
    }

    fn conversational_response(text: &str) -> ChatTurnResponse {
        ChatTurnResponse {
            assistant_message: text.to_string(),
            requirements: None,
            current_step: CurrentStep::Goal,
            is_completed: false,
            diagram_mermaid: None,
            final_report_html: None,
        }
    }

    fn completed_response() -> ChatTurnResponse {
        ChatTurnResponse {
            assistant_message: "The document is complete.".to_string(),
            requirements: Some(demo_doc()),
            current_step: CurrentStep::Final,
            is_completed: true,
            diagram_mermaid: None,
            final_report_html: None,
        }
    }

    struct MockGateway {
        responses: Mutex<VecDeque<Result<ChatTurnResponse>>>,
        delay: Duration,
    }

    impl MockGateway {
        fn new() -> Self {
            Self {
                responses: Mutex::new(VecDeque::new()),
                delay: Duration::ZERO,
            }
        }

        fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        fn push(&self, response: Result<ChatTurnResponse>) {
            self.responses.lock().unwrap().push_back(response);
        }
    }

    #[async_trait]
    impl ChatGateway for MockGateway {
        async fn send_turn(&self, _request: &ChatTurnRequest) -> Result<ChatTurnResponse> {
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(MagentaError::gateway_unavailable("no scripted response")))
        }
    }

    struct MockFallback;

    #[async_trait]
    impl FallbackProvider for MockFallback {
        async fn synthesize(&self, _original_input: &str) -> ChatTurnResponse {
            ChatTurnResponse {
                assistant_message: "**Analysis complete (Demo Mode).**".to_string(),
                requirements: Some(demo_doc()),
                current_step: CurrentStep::Goal,
                is_completed: false,
                diagram_mermaid: None,
                final_report_html: None,
            }
        }
    }

    struct MockPublisher {
        calls: AtomicUsize,
        fail: Mutex<bool>,
    }

    impl MockPublisher {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail: Mutex::new(false),
            }
        }
    }

    #[async_trait]
    impl DocumentPublisher for MockPublisher {
        async fn publish(
            &self,
            _session_id: &str,
            _doc: &RequirementsDocument,
            _idempotency_key: &str,
        ) -> Result<PublishResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if *self.fail.lock().unwrap() {
                return Err(MagentaError::publish_failed("confluence returned 502"));
            }
            Ok(PublishResult {
                confluence_url: "https://wiki.example.com/pages/42".to_string(),
                page_id: "42".to_string(),
                status: PublishStatus::Created,
            })
        }
    }

    struct Harness {
        controller: SessionController,
        gateway: Arc<MockGateway>,
        publisher: Arc<MockPublisher>,
    }

    fn harness() -> Harness {
        harness_with(MockGateway::new(), GatewayFailurePolicy::FallbackDemo)
    }

    fn harness_with(gateway: MockGateway, policy: GatewayFailurePolicy) -> Harness {
        let gateway = Arc::new(gateway);
        let publisher = Arc::new(MockPublisher::new());
        let controller =
            SessionController::new(gateway.clone(), Arc::new(MockFallback), publisher.clone())
                .with_policy(policy);
        Harness {
            controller,
            gateway,
            publisher,
        }
    }

    #[tokio::test]
    async fn test_empty_input_is_rejected_without_a_turn() {
        let h = harness();
        assert!(matches!(
            h.controller.send("").await,
            Err(MagentaError::InvalidInput(_))
        ));
        assert!(matches!(
            h.controller.send("   \n\t").await,
            Err(MagentaError::InvalidInput(_))
        ));
        assert!(h.controller.messages().await.is_empty());
        assert!(!h.controller.is_generating().await);
    }

    #[tokio::test]
    async fn test_each_user_message_precedes_its_assistant_reply() {
        let h = harness();
        h.gateway.push(Ok(conversational_response("What is the goal?")));
        h.gateway.push(Ok(conversational_response("Who are the stakeholders?")));

        h.controller.send("I want a cashback program").await.unwrap();
        h.controller.send("Retention growth").await.unwrap();

        let messages = h.controller.messages().await;
        let roles: Vec<MessageRole> = messages.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![
                MessageRole::User,
                MessageRole::Assistant,
                MessageRole::User,
                MessageRole::Assistant,
            ]
        );
        assert_eq!(messages[0].content, "I want a cashback program");
        assert_eq!(messages[1].content, "What is the goal?");
    }

    #[tokio::test(start_paused = true)]
    async fn test_send_is_single_flight_per_session() {
        let gateway = MockGateway::new().with_delay(Duration::from_secs(1));
        let h = harness_with(gateway, GatewayFailurePolicy::FallbackDemo);
        h.gateway.push(Ok(conversational_response("Slow reply")));

        let controller = Arc::new(h.controller);
        let background = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.send("first").await })
        };
        tokio::task::yield_now().await;

        assert!(matches!(
            controller.send("second").await,
            Err(MagentaError::TurnInFlight)
        ));

        background.await.unwrap().unwrap();
        assert!(!controller.is_generating().await);

        // The rejected send left no trace in the log.
        let messages = controller.messages().await;
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, "first");
    }

    #[tokio::test]
    async fn test_gateway_failure_falls_back_to_demo_mode() {
        let h = harness();
        h.gateway
            .push(Err(MagentaError::gateway_unavailable("connection refused")));

        let appended = h.controller.send("Describe the loan process").await.unwrap();

        // Exactly one assistant message, carrying the demo-mode marker.
        assert_eq!(appended.len(), 2);
        assert!(appended[1].content.contains("Demo Mode"));

        let artifacts = h.controller.artifacts().await;
        assert_eq!(artifacts.doc_title, DEMO_PROJECT);
        assert!(!artifacts.sections.is_empty());
    }

    #[tokio::test]
    async fn test_surface_warning_policy_skips_document_update() {
        let h = harness_with(MockGateway::new(), GatewayFailurePolicy::SurfaceWarning);
        h.gateway
            .push(Err(MagentaError::gateway_unavailable("connection refused")));

        let appended = h.controller.send("Describe the loan process").await.unwrap();

        assert_eq!(appended.len(), 2);
        assert!(appended[1].content.contains("unreachable"));
        assert_eq!(h.controller.artifacts().await, Artifacts::default());
    }

    #[tokio::test]
    async fn test_completed_turn_publishes_exactly_once() {
        let h = harness();
        h.gateway.push(Ok(completed_response()));
        h.gateway.push(Ok(completed_response()));

        let appended = h.controller.send("Looks done to me").await.unwrap();
        assert_eq!(h.publisher.calls.load(Ordering::SeqCst), 1);
        assert!(h.controller.has_published().await);
        let confirmation = appended.last().unwrap();
        assert!(confirmation.content.contains("https://wiki.example.com/pages/42"));

        // A second completed response must not publish again.
        h.controller.send("And again").await.unwrap();
        assert_eq!(h.publisher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_publish_warns_and_retries_on_next_completion() {
        let h = harness();
        h.gateway.push(Ok(completed_response()));
        h.gateway.push(Ok(completed_response()));
        *h.publisher.fail.lock().unwrap() = true;

        let appended = h.controller.send("Finish it").await.unwrap();
        assert!(!h.controller.has_published().await);
        assert!(appended.last().unwrap().content.contains("failed"));

        *h.publisher.fail.lock().unwrap() = false;
        h.controller.send("Try again").await.unwrap();
        assert!(h.controller.has_published().await);
        assert_eq!(h.publisher.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_empty_assistant_message_becomes_placeholder() {
        let h = harness();
        h.gateway.push(Ok(conversational_response("   ")));

        let appended = h.controller.send("Hello").await.unwrap();
        assert_eq!(appended[1].content, EMPTY_REPLY_PLACEHOLDER);
    }

    #[tokio::test]
    async fn test_reset_clears_everything_and_issues_new_id() {
        let h = harness();
        h.gateway.push(Ok(completed_response()));

        let old_id = h.controller.session_id().await;
        h.controller.send("Finish it").await.unwrap();
        assert!(h.controller.has_published().await);

        let new_id = h.controller.reset().await;
        assert_ne!(old_id, new_id);
        assert!(h.controller.messages().await.is_empty());
        assert!(!h.controller.has_published().await);
        assert_eq!(h.controller.artifacts().await, Artifacts::default());

        // The publish guard is rearmed for the new session.
        h.gateway.push(Ok(completed_response()));
        h.controller.send("New analysis, finish it").await.unwrap();
        assert_eq!(h.publisher.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_during_inflight_turn_discards_the_stale_result() {
        let gateway = MockGateway::new().with_delay(Duration::from_secs(1));
        let h = harness_with(gateway, GatewayFailurePolicy::FallbackDemo);
        h.gateway.push(Ok(completed_response()));

        let controller = Arc::new(h.controller);
        let background = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.send("old turn").await })
        };
        tokio::task::yield_now().await;

        let new_id = controller.reset().await;
        let appended = background.await.unwrap().unwrap();

        // The stale turn resolved after the reset and left no trace in the
        // fresh session: no messages, no artifacts, no publish.
        assert!(appended.is_empty());
        assert!(controller.messages().await.is_empty());
        assert_eq!(controller.artifacts().await, Artifacts::default());
        assert!(!controller.has_published().await);
        assert_eq!(h.publisher.calls.load(Ordering::SeqCst), 0);
        assert!(!controller.is_generating().await);
        assert_eq!(controller.session_id().await, new_id);
    }

    #[tokio::test]
    async fn test_conversational_turn_leaves_artifacts_untouched() {
        let h = harness();
        h.gateway.push(Ok(completed_response()));
        h.gateway.push(Ok(conversational_response("Anything else?")));

        h.controller.send("Finish it").await.unwrap();
        let artifacts_after_doc = h.controller.artifacts().await;
        assert_eq!(artifacts_after_doc.doc_title, DEMO_PROJECT);

        h.controller.send("Just chatting").await.unwrap();
        assert_eq!(h.controller.artifacts().await, artifacts_after_doc);
    }
}
