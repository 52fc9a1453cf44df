//! HTTP implementation of the chat gateway.
//!
//! Sends one chat turn to `POST {base}/api/v1/chat` and maps every failure
//! mode — transport error, non-success status, unparseable body — onto
//! `MagentaError::GatewayUnavailable`. One attempt per call; the caller's
//! policy decides what happens after a failure.

use async_trait::async_trait;
use magenta_core::error::{MagentaError, Result};
use magenta_core::gateway::ChatGateway;
use magenta_core::turn::{ChatTurnRequest, ChatTurnResponse};
use reqwest::Client;
use serde::Serialize;

use crate::config::BackendConfig;

/// Chat gateway backed by the remote Magenta backend.
#[derive(Clone)]
pub struct BackendChatGateway {
    client: Client,
    config: BackendConfig,
}

/// Wire body of one chat turn. History is accepted by the endpoint but the
/// backend keeps its own session state, so only the latest text is sent.
#[derive(Debug, Serialize)]
struct ChatRequestBody<'a> {
    session_id: &'a str,
    message: &'a str,
}

impl BackendChatGateway {
    /// Creates a gateway with the provided configuration.
    pub fn new(config: BackendConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Creates a gateway configured from the environment.
    pub fn from_env() -> Self {
        Self::new(BackendConfig::from_env())
    }
}

#[async_trait]
impl ChatGateway for BackendChatGateway {
    async fn send_turn(&self, request: &ChatTurnRequest) -> Result<ChatTurnResponse> {
        let body = ChatRequestBody {
            session_id: &request.session_id,
            message: &request.message,
        };

        tracing::debug!(
            session_id = %request.session_id,
            url = %self.config.chat_url(),
            "Sending chat turn"
        );

        let response = self
            .client
            .post(self.config.chat_url())
            .json(&body)
            .timeout(self.config.timeout)
            .send()
            .await
            .map_err(|e| MagentaError::gateway_unavailable(format!("chat request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(MagentaError::gateway_unavailable(format!(
                "chat endpoint returned {}: {}",
                status, error_text
            )));
        }

        response
            .json::<ChatTurnResponse>()
            .await
            .map_err(|e| MagentaError::gateway_unavailable(format!("unparseable chat response: {}", e)))
    }
}
