//! Remote-service layer for Magenta.
//!
//! Concrete implementations of the `magenta-core` gateway traits:
//!
//! - [`BackendChatGateway`]: one chat turn over HTTP, no internal retry
//! - [`ConfluencePublisher`]: one-shot document publish with an idempotency key
//! - [`DemoFallbackProvider`]: deterministic canned response for demo mode
//! - [`BackendConfig`]: environment-provided endpoint configuration

mod chat_gateway;
mod config;
mod fallback;
mod publisher;

pub use chat_gateway::BackendChatGateway;
pub use config::BackendConfig;
pub use fallback::DemoFallbackProvider;
pub use publisher::ConfluencePublisher;
