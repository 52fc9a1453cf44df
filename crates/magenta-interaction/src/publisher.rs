//! HTTP implementation of the document publisher.
//!
//! Posts the completed requirements snapshot to
//! `POST {base}/api/v1/publish`, which renders the BRD and creates or
//! updates the Confluence page. The idempotency key supplied by the
//! orchestrator travels in the `X-Idempotency-Key` header so the server
//! can deduplicate publish triggers that slip past the client-side guard.

use async_trait::async_trait;
use magenta_core::document::RequirementsDocument;
use magenta_core::error::{MagentaError, Result};
use magenta_core::gateway::DocumentPublisher;
use magenta_core::turn::PublishResult;
use reqwest::Client;
use serde::Serialize;

use crate::config::BackendConfig;

/// Publisher backed by the backend's Confluence integration.
#[derive(Clone)]
pub struct ConfluencePublisher {
    client: Client,
    config: BackendConfig,
}

#[derive(Debug, Serialize)]
struct PublishRequestBody<'a> {
    session_id: &'a str,
    doc: &'a RequirementsDocument,
    /// Parent page is chosen server-side; the client always publishes to
    /// the space root.
    parent_title: Option<&'a str>,
}

impl ConfluencePublisher {
    /// Creates a publisher with the provided configuration.
    pub fn new(config: BackendConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Creates a publisher configured from the environment.
    pub fn from_env() -> Self {
        Self::new(BackendConfig::from_env())
    }
}

#[async_trait]
impl DocumentPublisher for ConfluencePublisher {
    async fn publish(
        &self,
        session_id: &str,
        doc: &RequirementsDocument,
        idempotency_key: &str,
    ) -> Result<PublishResult> {
        let body = PublishRequestBody {
            session_id,
            doc,
            parent_title: None,
        };

        tracing::info!(
            session_id = %session_id,
            project = %doc.project_name,
            "Publishing requirements document"
        );

        let response = self
            .client
            .post(self.config.publish_url())
            .header("X-Idempotency-Key", idempotency_key)
            .json(&body)
            .timeout(self.config.timeout)
            .send()
            .await
            .map_err(|e| MagentaError::publish_failed(format!("publish request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(MagentaError::publish_failed(format!(
                "publish endpoint returned {}: {}",
                status, error_text
            )));
        }

        response
            .json::<PublishResult>()
            .await
            .map_err(|e| MagentaError::publish_failed(format!("unparseable publish response: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_body_carries_null_parent_title() {
        let doc = RequirementsDocument {
            project_name: "Demo".to_string(),
            goal: String::new(),
            scope: Vec::new(),
            stakeholders: Vec::new(),
            business_rules: Vec::new(),
            kpi: Vec::new(),
            requirements: Vec::new(),
            diagram_mermaid: None,
            version: "1.0".to_string(),
            document_status: "DRAFT".to_string(),
            author: "AI Business Analyst".to_string(),
            updated_at: String::new(),
        };
        let body = PublishRequestBody {
            session_id: "session-1",
            doc: &doc,
            parent_title: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["parent_title"], serde_json::Value::Null);
        assert_eq!(json["doc"]["project_name"], "Demo");
    }
}
