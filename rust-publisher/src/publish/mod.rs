//! Publishing layer over the AWS SQS and SNS clients.
//!
//! One [`Publisher`] is built at startup and shared across the application.
//! It owns both SDK clients and the queue base address, and exposes the
//! publish operations as fire-and-forget calls: failures surface to the
//! caller unchanged and nothing is retried here.

pub mod sns;
pub mod sqs;

use std::sync::Arc;

use aws_config::{BehaviorVersion, Region};
use aws_sdk_sns::operation::publish::PublishOutput;
use aws_sdk_sns::operation::publish_batch::PublishBatchOutput;
use aws_sdk_sqs::operation::send_message::SendMessageOutput;
use aws_sdk_sqs::operation::send_message_batch::SendMessageBatchOutput;
use tracing::info;

use crate::config::Config;
use crate::error::PublishError;
use crate::message::OutboundMessage;

/// Maximum entries per batch call, imposed by both backends.
pub const MAX_BATCH_ENTRIES: usize = 10;

/// Shared SQS/SNS publishing handle.
///
/// Cheap to clone; the SDK clients pool their HTTP connections internally
/// and hold no reference back to any message.
#[derive(Clone)]
pub struct Publisher {
    inner: Arc<PublisherInner>,
}

struct PublisherInner {
    sqs: aws_sdk_sqs::Client,
    sns: aws_sdk_sns::Client,
    queue_base_url: String,
}

impl Publisher {
    /// Build both SDK clients from the configuration.
    ///
    /// Credentials come from the default provider chain; per-family region
    /// and endpoint overrides come from [`Config`].
    pub async fn new(config: &Config) -> Self {
        let base = aws_config::load_defaults(BehaviorVersion::latest()).await;

        let mut sqs_config = aws_sdk_sqs::config::Builder::from(&base)
            .region(Region::new(config.sqs.region.clone()));
        if let Some(endpoint) = config.sqs.endpoint.as_deref() {
            sqs_config = sqs_config.endpoint_url(endpoint);
        }

        let mut sns_config = aws_sdk_sns::config::Builder::from(&base)
            .region(Region::new(config.sns.region.clone()));
        if let Some(endpoint) = config.sns.endpoint.as_deref() {
            sns_config = sns_config.endpoint_url(endpoint);
        }

        let publisher = Self::from_clients(
            aws_sdk_sqs::Client::from_conf(sqs_config.build()),
            aws_sdk_sns::Client::from_conf(sns_config.build()),
            config.queue_base_url(),
        );

        info!(
            queue_base_url = %publisher.inner.queue_base_url,
            "publisher_created"
        );

        publisher
    }

    /// Assemble a publisher from already-built clients.
    pub fn from_clients(
        sqs: aws_sdk_sqs::Client,
        sns: aws_sdk_sns::Client,
        queue_base_url: impl Into<String>,
    ) -> Self {
        Self {
            inner: Arc::new(PublisherInner {
                sqs,
                sns,
                queue_base_url: queue_base_url.into(),
            }),
        }
    }

    /// Send one message to a queue by short name.
    pub async fn send_to_queue(
        &self,
        message: impl Into<OutboundMessage>,
        queue_name: &str,
    ) -> Result<SendMessageOutput, PublishError> {
        let message = message.into();
        sqs::send_message(
            &self.inner.sqs,
            &self.inner.queue_base_url,
            queue_name,
            &message,
        )
        .await
    }

    /// Send one message to a queue with a delivery delay in whole seconds.
    pub async fn send_to_queue_delayed(
        &self,
        message: impl Into<OutboundMessage>,
        queue_name: &str,
        delay_seconds: u32,
    ) -> Result<SendMessageOutput, PublishError> {
        let mut message = message.into();
        message.set_delay_seconds(Some(delay_seconds));
        sqs::send_message(
            &self.inner.sqs,
            &self.inner.queue_base_url,
            queue_name,
            &message,
        )
        .await
    }

    /// Send an ordered set of messages to a queue in batch calls.
    pub async fn batch_to_queue<M>(
        &self,
        messages: Vec<M>,
        queue_name: &str,
    ) -> Result<Vec<SendMessageBatchOutput>, PublishError>
    where
        M: Into<OutboundMessage>,
    {
        let messages = wrap_all(messages, None);
        sqs::send_batch(
            &self.inner.sqs,
            &self.inner.queue_base_url,
            queue_name,
            &messages,
        )
        .await
    }

    /// Batch send with a delivery delay applied to every message first.
    pub async fn batch_to_queue_delayed<M>(
        &self,
        messages: Vec<M>,
        queue_name: &str,
        delay_seconds: u32,
    ) -> Result<Vec<SendMessageBatchOutput>, PublishError>
    where
        M: Into<OutboundMessage>,
    {
        let messages = wrap_all(messages, Some(delay_seconds));
        sqs::send_batch(
            &self.inner.sqs,
            &self.inner.queue_base_url,
            queue_name,
            &messages,
        )
        .await
    }

    /// Publish one message to a topic ARN.
    pub async fn publish_to_topic(
        &self,
        message: impl Into<OutboundMessage>,
        topic_arn: &str,
    ) -> Result<PublishOutput, PublishError> {
        let message = message.into();
        sns::publish_message(&self.inner.sns, topic_arn, &message).await
    }

    /// Publish an ordered set of messages to a topic in batch calls.
    pub async fn batch_to_topic<M>(
        &self,
        messages: Vec<M>,
        topic_arn: &str,
    ) -> Result<Vec<PublishBatchOutput>, PublishError>
    where
        M: Into<OutboundMessage>,
    {
        let messages = wrap_all(messages, None);
        sns::publish_batch(&self.inner.sns, topic_arn, &messages).await
    }

    /// Direct access to the underlying SQS client.
    pub fn sqs(&self) -> &aws_sdk_sqs::Client {
        &self.inner.sqs
    }

    /// Direct access to the underlying SNS client.
    pub fn sns(&self) -> &aws_sdk_sns::Client {
        &self.inner.sns
    }

    /// Release the publisher at shutdown.
    ///
    /// The SDK clients close their connection pools on drop; this hook
    /// marks the lifecycle boundary and never fails.
    pub fn close(&self) {
        info!("publisher_closed");
    }
}

/// Wrap raw inputs into messages, preserving pre-built instances unchanged,
/// and apply a delivery delay to every message when one is given.
fn wrap_all<M>(messages: Vec<M>, delay_seconds: Option<u32>) -> Vec<OutboundMessage>
where
    M: Into<OutboundMessage>,
{
    messages
        .into_iter()
        .map(|message| {
            let mut message = message.into();
            if delay_seconds.is_some() {
                message.set_delay_seconds(delay_seconds);
            }
            message
        })
        .collect()
}
