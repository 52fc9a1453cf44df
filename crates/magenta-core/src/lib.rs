//! Domain layer for Magenta: session and message models, the requirements
//! document and its mapper, the chat turn contract, remote-service traits,
//! and the progressive-reveal sequence.
//!
//! This crate performs no network I/O. Concrete gateway/publisher
//! implementations live in `magenta-interaction`; composition lives in
//! `magenta-application`.

pub mod document;
pub mod error;
pub mod gateway;
pub mod reveal;
pub mod session;
pub mod turn;

// Re-export common error type
pub use error::MagentaError;
