//! Canned demo response for when the chat backend is unreachable.
//!
//! The provider returns a fixed assistant message and a fixed requirements
//! document after a bounded artificial delay, so the user-visible latency
//! profile resembles a real call and the downstream pipeline (mapping,
//! publish check, reveal) stays uniform regardless of the data source.

use std::time::Duration;

use async_trait::async_trait;
use magenta_core::document::{RequirementItem, RequirementsDocument};
use magenta_core::gateway::FallbackProvider;
use magenta_core::turn::{ChatTurnResponse, CurrentStep};

const DEFAULT_DELAY: Duration = Duration::from_secs(2);

const DEMO_PROJECT_NAME: &str = "Loyalty Program \"Black\"";

const DEMO_ASSISTANT_MESSAGE: &str = "**Analysis complete (Demo Mode).**\n\n\
The critic agent confirms the request is valid. The document was assembled \
from the bank's requirement templates.\n\n\
*Note: the backend is not connected; demo data is shown.*";

const DEMO_DIAGRAM: &str = "graph TD\n\
    A[Client] -->|Application| B(Scoring)\n\
    B -->|Approved| C[Card issuance]\n\
    B -->|Declined| D[Notification]\n\
    C --> E{Activation}\n\
    E -->|Yes| F[Bonus accrual]\n\
    E -->|No| G[Blocked]";

/// Fallback provider emitting a fixed demo interview turn.
#[derive(Debug, Clone)]
pub struct DemoFallbackProvider {
    delay: Duration,
}

impl DemoFallbackProvider {
    /// Creates a provider with the default two-second delay.
    pub fn new() -> Self {
        Self {
            delay: DEFAULT_DELAY,
        }
    }

    /// Overrides the artificial delay. Tests set this to zero.
    pub fn with_delay(self, delay: Duration) -> Self {
        Self { delay }
    }

    /// The fixed project name carried by every synthesized document.
    pub fn project_name() -> &'static str {
        DEMO_PROJECT_NAME
    }

    fn demo_document() -> RequirementsDocument {
        RequirementsDocument {
            project_name: DEMO_PROJECT_NAME.to_string(),
            goal: "Build an automated rewards engine for premium clients to lift \
                   retention by 15% within Q1."
                .to_string(),
            scope: vec![
                "Accrual module".to_string(),
                "Card processing integration".to_string(),
                "Mobile application".to_string(),
            ],
            stakeholders: vec![
                "Retail business director".to_string(),
                "Digital product team".to_string(),
                "Risk department".to_string(),
            ],
            business_rules: vec![
                "Cashback accrues only to verified clients.".to_string(),
                "Monthly payout cap is 50 000 KZT.".to_string(),
            ],
            kpi: vec![
                "Retention Rate +15%".to_string(),
                "NPS +10 points".to_string(),
            ],
            requirements: vec![
                RequirementItem {
                    id: "REQ-1".to_string(),
                    title: "Cashback balance in profile".to_string(),
                    description: "The client sees the current cashback balance in the \
                                  personal account."
                        .to_string(),
                    priority: "HIGH".to_string(),
                    status: "DRAFT".to_string(),
                },
                RequirementItem {
                    id: "REQ-2".to_string(),
                    title: "Accrual notification".to_string(),
                    description: "After a successful purchase the client receives a \
                                  push/SMS about the accrued cashback."
                        .to_string(),
                    priority: "MED".to_string(),
                    status: "DRAFT".to_string(),
                },
            ],
            diagram_mermaid: Some(DEMO_DIAGRAM.to_string()),
            version: "1.0".to_string(),
            document_status: "DRAFT".to_string(),
            author: "AI Business Analyst".to_string(),
            // Fixed snapshot date keeps the demo response fully deterministic.
            updated_at: "2025-11-28T00:00:00Z".to_string(),
        }
    }
}

impl Default for DemoFallbackProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FallbackProvider for DemoFallbackProvider {
    async fn synthesize(&self, original_input: &str) -> ChatTurnResponse {
        tracing::warn!(
            input = %original_input,
            "Chat backend unavailable, switching to demo mode"
        );

        tokio::time::sleep(self.delay).await;

        ChatTurnResponse {
            assistant_message: DEMO_ASSISTANT_MESSAGE.to_string(),
            requirements: Some(Self::demo_document()),
            current_step: CurrentStep::Goal,
            is_completed: false,
            diagram_mermaid: Some(DEMO_DIAGRAM.to_string()),
            final_report_html: None,
        }
    }
}
