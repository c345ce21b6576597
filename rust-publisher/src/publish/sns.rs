//! SNS dispatch: single publishes and size-limited batch publishes.
//!
//! Topic destinations are full ARNs, used as-is. Unlike SQS, SNS accepts
//! `String.Array` attributes and carries no delivery delay.

use aws_sdk_sns::operation::publish::PublishOutput;
use aws_sdk_sns::operation::publish_batch::PublishBatchOutput;
use aws_sdk_sns::types::PublishBatchRequestEntry;
use aws_sdk_sns::Client;
use futures::future::try_join_all;
use tracing::info;
use uuid::Uuid;

use crate::error::PublishError;
use crate::message::OutboundMessage;
use crate::publish::MAX_BATCH_ENTRIES;

/// Publish one message to a topic.
pub async fn publish_message(
    client: &Client,
    topic_arn: &str,
    message: &OutboundMessage,
) -> Result<PublishOutput, PublishError> {
    let attributes = message.sns_attributes()?;

    let output = client
        .publish()
        .topic_arn(topic_arn)
        .message(message.body())
        .set_message_attributes(attributes)
        .send()
        .await
        .map_err(aws_sdk_sns::Error::from)?;

    info!(
        topic = topic_arn,
        message_id = output.message_id(),
        "sns_message_published"
    );

    Ok(output)
}

/// Build one batch entry, tagged with a freshly generated unique id.
fn batch_entry(message: &OutboundMessage) -> Result<PublishBatchRequestEntry, PublishError> {
    let entry = PublishBatchRequestEntry::builder()
        .id(Uuid::new_v4().to_string())
        .message(message.body())
        .set_message_attributes(message.sns_attributes()?)
        .build()?;
    Ok(entry)
}

/// Publish an ordered batch of messages to a topic.
///
/// One `PublishBatch` call per chunk, all chunks dispatched concurrently;
/// the first failed chunk fails the whole batch while the other chunks'
/// deliveries stand. An empty batch resolves immediately without issuing
/// any call.
pub async fn publish_batch(
    client: &Client,
    topic_arn: &str,
    messages: &[OutboundMessage],
) -> Result<Vec<PublishBatchOutput>, PublishError> {
    let mut entries = Vec::with_capacity(messages.len());
    for message in messages {
        entries.push(batch_entry(message)?);
    }

    let calls = entries.chunks(MAX_BATCH_ENTRIES).map(|chunk| {
        let call = client
            .publish_batch()
            .topic_arn(topic_arn)
            .set_publish_batch_request_entries(Some(chunk.to_vec()))
            .send();
        async move {
            call.await
                .map_err(aws_sdk_sns::Error::from)
                .map_err(PublishError::from)
        }
    });

    let outputs = try_join_all(calls).await?;

    info!(
        topic = topic_arn,
        messages = messages.len(),
        chunks = outputs.len(),
        "sns_batch_published"
    );

    Ok(outputs)
}
