//! Use-case layer for Magenta.
//!
//! Composes the domain layer (`magenta-core`) with the remote-service
//! implementations (`magenta-interaction`):
//!
//! - [`SessionController`]: the single entry point the view layer talks to
//! - [`PublishOrchestrator`]: the at-most-once publish workflow

mod publish_orchestrator;
mod session_controller;

pub use publish_orchestrator::{PublishOrchestrator, PublishOutcome, PublishState};
pub use session_controller::{GatewayFailurePolicy, SessionController};
