//! Error types for the publisher layer.

use thiserror::Error;

/// Errors surfaced by message construction and publish operations.
///
/// Backend errors pass through unchanged; this layer performs no retry and
/// no reinterpretation. Attribute and serialization errors are raised while
/// building the request, before any network call is issued.
#[derive(Debug, Error)]
pub enum PublishError {
    /// An attribute value has no representation for the target backend.
    #[error("invalid data type for message attribute \"{0}\"")]
    InvalidAttributeType(String),

    /// A structured message body or list value could not be serialized.
    #[error("failed to serialize message content")]
    Serialization(#[from] serde_json::Error),

    /// A request entry was rejected by the SDK request builder.
    #[error("invalid publish request")]
    RequestBuild(#[from] aws_sdk_sqs::error::BuildError),

    /// SQS call failure, passed through from the SDK.
    #[error(transparent)]
    Sqs(#[from] aws_sdk_sqs::Error),

    /// SNS call failure, passed through from the SDK.
    #[error(transparent)]
    Sns(#[from] aws_sdk_sns::Error),
}
