//! Publish endpoint handlers.
//!
//! The handlers are thin: decode the request, hand it to the shared
//! [`Publisher`], map the outcome onto a status code. Attribute and
//! serialization problems are caller errors (400); backend failures are
//! reported as 502 and passed through the logs unchanged.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::error;

use crate::config::Config;
use crate::error::PublishError;
use crate::message::{Attributes, OutboundMessage};
use crate::publish::Publisher;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub publisher: Publisher,
}

impl AppState {
    pub fn new(config: Config, publisher: Publisher) -> Self {
        Self {
            config: Arc::new(config),
            publisher,
        }
    }
}

// =============================================================================
// Health Check
// =============================================================================

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

// =============================================================================
// Request / Response Shapes
// =============================================================================

/// One message payload: any JSON value as the body, plus optional typed
/// attributes and an optional delivery delay.
#[derive(Debug, Deserialize)]
pub struct MessagePayload {
    pub message: Value,
    #[serde(default)]
    pub attributes: Option<Attributes>,
    #[serde(default)]
    pub delay_seconds: Option<u32>,
}

impl MessagePayload {
    fn into_message(self) -> OutboundMessage {
        let mut message = OutboundMessage::from(self.message);
        if let Some(attributes) = self.attributes {
            message = message.with_attributes(attributes);
        }
        if self.delay_seconds.is_some() {
            message.set_delay_seconds(self.delay_seconds);
        }
        message
    }
}

/// Request body for single-message queue sends.
#[derive(Debug, Deserialize)]
pub struct QueuePublishRequest {
    pub queue: String,
    #[serde(flatten)]
    pub payload: MessagePayload,
}

/// Request body for queue batch sends. A request-level delay applies to
/// every message in the batch.
#[derive(Debug, Deserialize)]
pub struct QueueBatchRequest {
    pub queue: String,
    pub messages: Vec<MessagePayload>,
    #[serde(default)]
    pub delay_seconds: Option<u32>,
}

/// Request body for single-message topic publishes.
#[derive(Debug, Deserialize)]
pub struct TopicPublishRequest {
    pub topic_arn: String,
    #[serde(flatten)]
    pub payload: MessagePayload,
}

/// Request body for topic batch publishes.
#[derive(Debug, Deserialize)]
pub struct TopicBatchRequest {
    pub topic_arn: String,
    pub messages: Vec<MessagePayload>,
}

/// Publish response.
#[derive(Serialize)]
pub struct PublishResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
}

/// Batch publish response.
#[derive(Serialize)]
pub struct BatchPublishResponse {
    pub status: &'static str,
    pub messages: usize,
    pub chunks: usize,
}

fn error_status(error: &PublishError) -> StatusCode {
    match error {
        PublishError::InvalidAttributeType(_)
        | PublishError::Serialization(_)
        | PublishError::RequestBuild(_) => StatusCode::BAD_REQUEST,
        PublishError::Sqs(_) | PublishError::Sns(_) => StatusCode::BAD_GATEWAY,
    }
}

// =============================================================================
// Queue Endpoints
// =============================================================================

/// Send one message to a queue.
pub async fn queue_publish(
    State(state): State<AppState>,
    Json(request): Json<QueuePublishRequest>,
) -> impl IntoResponse {
    let queue = request.queue;
    match state
        .publisher
        .send_to_queue(request.payload.into_message(), &queue)
        .await
    {
        Ok(output) => (
            StatusCode::OK,
            Json(PublishResponse {
                status: "sent",
                message_id: output.message_id().map(str::to_string),
            }),
        ),
        Err(e) => {
            error!(queue = %queue, error = %e, "queue_publish_failed");
            (
                error_status(&e),
                Json(PublishResponse {
                    status: "error",
                    message_id: None,
                }),
            )
        }
    }
}

/// Send a batch of messages to a queue.
pub async fn queue_batch(
    State(state): State<AppState>,
    Json(request): Json<QueueBatchRequest>,
) -> impl IntoResponse {
    let queue = request.queue;
    let messages: Vec<OutboundMessage> = request
        .messages
        .into_iter()
        .map(MessagePayload::into_message)
        .collect();
    let total = messages.len();

    let result = match request.delay_seconds {
        Some(delay) => {
            state
                .publisher
                .batch_to_queue_delayed(messages, &queue, delay)
                .await
        }
        None => state.publisher.batch_to_queue(messages, &queue).await,
    };

    match result {
        Ok(outputs) => (
            StatusCode::OK,
            Json(BatchPublishResponse {
                status: "sent",
                messages: total,
                chunks: outputs.len(),
            }),
        ),
        Err(e) => {
            error!(queue = %queue, error = %e, "queue_batch_failed");
            (
                error_status(&e),
                Json(BatchPublishResponse {
                    status: "error",
                    messages: total,
                    chunks: 0,
                }),
            )
        }
    }
}

// =============================================================================
// Topic Endpoints
// =============================================================================

/// Publish one message to a topic.
pub async fn topic_publish(
    State(state): State<AppState>,
    Json(request): Json<TopicPublishRequest>,
) -> impl IntoResponse {
    let topic_arn = request.topic_arn;
    match state
        .publisher
        .publish_to_topic(request.payload.into_message(), &topic_arn)
        .await
    {
        Ok(output) => (
            StatusCode::OK,
            Json(PublishResponse {
                status: "published",
                message_id: output.message_id().map(str::to_string),
            }),
        ),
        Err(e) => {
            error!(topic = %topic_arn, error = %e, "topic_publish_failed");
            (
                error_status(&e),
                Json(PublishResponse {
                    status: "error",
                    message_id: None,
                }),
            )
        }
    }
}

/// Publish a batch of messages to a topic.
pub async fn topic_batch(
    State(state): State<AppState>,
    Json(request): Json<TopicBatchRequest>,
) -> impl IntoResponse {
    let topic_arn = request.topic_arn;
    let messages: Vec<OutboundMessage> = request
        .messages
        .into_iter()
        .map(MessagePayload::into_message)
        .collect();
    let total = messages.len();

    match state.publisher.batch_to_topic(messages, &topic_arn).await {
        Ok(outputs) => (
            StatusCode::OK,
            Json(BatchPublishResponse {
                status: "published",
                messages: total,
                chunks: outputs.len(),
            }),
        ),
        Err(e) => {
            error!(topic = %topic_arn, error = %e, "topic_batch_failed");
            (
                error_status(&e),
                Json(BatchPublishResponse {
                    status: "error",
                    messages: total,
                    chunks: 0,
                }),
            )
        }
    }
}
