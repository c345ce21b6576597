//! Async SQS/SNS publishing layer for axum applications.
//!
//! One [`Publisher`] is created at startup and shared through the
//! application state; it exposes single and batched publish operations for
//! SQS queues and SNS topics, with typed message attributes and size-limited
//! concurrent batch dispatch.
//!
//! ## Architecture
//!
//! ```text
//! caller → OutboundMessage → dispatch (chunk + fan-out) → SQS / SNS
//! ```

pub mod config;
pub mod error;
pub mod message;
pub mod publish;
pub mod web;

// Re-export commonly used types
pub use config::{BackendConfig, Config};
pub use error::PublishError;
pub use message::{AttributeValue, Attributes, OutboundMessage};
pub use publish::{Publisher, MAX_BATCH_ENTRIES};
pub use web::AppState;
