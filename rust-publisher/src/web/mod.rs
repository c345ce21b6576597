//! Web layer: attaches the publish operations to an axum application.
//!
//! The router carries a shared [`AppState`] with the publisher handle
//! built once at startup; handlers never construct clients of their own.

pub mod handlers;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub use handlers::{
    health, queue_batch, queue_publish, topic_batch, topic_publish, AppState,
    BatchPublishResponse, HealthResponse, MessagePayload, PublishResponse, QueueBatchRequest,
    QueuePublishRequest, TopicBatchRequest, TopicPublishRequest,
};

/// Build the application router with all publish routes registered.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/publish/queue", post(queue_publish))
        .route("/publish/queue/batch", post(queue_batch))
        .route("/publish/topic", post(topic_publish))
        .route("/publish/topic/batch", post(topic_batch))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
