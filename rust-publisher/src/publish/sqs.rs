//! SQS dispatch: single sends and size-limited batch sends.
//!
//! Queue destinations are short names joined to the configured base
//! address. Batches are split into chunks of at most
//! [`MAX_BATCH_ENTRIES`](crate::publish::MAX_BATCH_ENTRIES) entries and the
//! chunk calls run concurrently; ordering holds within a chunk only.

use aws_sdk_sqs::operation::send_message::SendMessageOutput;
use aws_sdk_sqs::operation::send_message_batch::SendMessageBatchOutput;
use aws_sdk_sqs::types::SendMessageBatchRequestEntry;
use aws_sdk_sqs::Client;
use futures::future::try_join_all;
use tracing::info;
use uuid::Uuid;

use crate::error::PublishError;
use crate::message::OutboundMessage;
use crate::publish::MAX_BATCH_ENTRIES;

/// Full queue URL from the configured base address and a short queue name.
pub(crate) fn queue_url(base_url: &str, queue_name: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), queue_name)
}

/// Send one message to a queue.
pub async fn send_message(
    client: &Client,
    base_url: &str,
    queue_name: &str,
    message: &OutboundMessage,
) -> Result<SendMessageOutput, PublishError> {
    let attributes = message.sqs_attributes()?;

    let output = client
        .send_message()
        .queue_url(queue_url(base_url, queue_name))
        .message_body(message.body())
        .set_message_attributes(attributes)
        .set_delay_seconds(message.delay_seconds().map(|seconds| seconds as i32))
        .send()
        .await
        .map_err(aws_sdk_sqs::Error::from)?;

    info!(
        queue = queue_name,
        message_id = output.message_id(),
        delay_seconds = message.delay_seconds(),
        "sqs_message_sent"
    );

    Ok(output)
}

/// Build one batch entry, tagged with a freshly generated unique id.
fn batch_entry(message: &OutboundMessage) -> Result<SendMessageBatchRequestEntry, PublishError> {
    let entry = SendMessageBatchRequestEntry::builder()
        .id(Uuid::new_v4().to_string())
        .message_body(message.body())
        .set_message_attributes(message.sqs_attributes()?)
        .set_delay_seconds(message.delay_seconds().map(|seconds| seconds as i32))
        .build()?;
    Ok(entry)
}

/// Send an ordered batch of messages to a queue.
///
/// One `SendMessageBatch` call per chunk, all chunks dispatched
/// concurrently; the first failed chunk fails the whole batch while the
/// other chunks' deliveries stand. An empty batch resolves immediately
/// without issuing any call.
pub async fn send_batch(
    client: &Client,
    base_url: &str,
    queue_name: &str,
    messages: &[OutboundMessage],
) -> Result<Vec<SendMessageBatchOutput>, PublishError> {
    let mut entries = Vec::with_capacity(messages.len());
    for message in messages {
        entries.push(batch_entry(message)?);
    }

    let url = queue_url(base_url, queue_name);
    let calls = entries.chunks(MAX_BATCH_ENTRIES).map(|chunk| {
        let call = client
            .send_message_batch()
            .queue_url(url.as_str())
            .set_entries(Some(chunk.to_vec()))
            .send();
        async move {
            call.await
                .map_err(aws_sdk_sqs::Error::from)
                .map_err(PublishError::from)
        }
    });

    let outputs = try_join_all(calls).await?;

    info!(
        queue = queue_name,
        messages = messages.len(),
        chunks = outputs.len(),
        "sqs_batch_sent"
    );

    Ok(outputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};

    use aws_sdk_sqs::config::{BehaviorVersion, Credentials, Region};

    use crate::message::AttributeValue;

    fn offline_client() -> Client {
        let config = aws_sdk_sqs::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("eu-central-1"))
            .credentials_provider(Credentials::new("test", "test", None, None, "test"))
            .build();
        Client::from_conf(config)
    }

    #[test]
    fn queue_url_joins_base_and_name() {
        assert_eq!(
            queue_url("http://localhost:4566", "test-queue"),
            "http://localhost:4566/test-queue"
        );
        assert_eq!(
            queue_url("http://localhost:4566/", "test-queue"),
            "http://localhost:4566/test-queue"
        );
    }

    #[test]
    fn batch_entries_get_distinct_ids() {
        // Identical messages must still get different entry ids.
        let message = OutboundMessage::new("payload");
        let entries: Vec<_> = (0..11).map(|_| batch_entry(&message).unwrap()).collect();

        let ids: HashSet<_> = entries.iter().map(|entry| entry.id().to_string()).collect();
        assert_eq!(ids.len(), 11);
    }

    #[test]
    fn eleven_entries_split_into_two_ordered_chunks() {
        let messages: Vec<_> = (0..11)
            .map(|i| OutboundMessage::new(format!("payload-{i}")))
            .collect();
        let entries: Vec<_> = messages
            .iter()
            .map(|message| batch_entry(message).unwrap())
            .collect();

        let chunks: Vec<_> = entries.chunks(MAX_BATCH_ENTRIES).collect();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].len(), 10);
        assert_eq!(chunks[1].len(), 1);
        assert_eq!(chunks[0][0].message_body(), "payload-0");
        assert_eq!(chunks[0][9].message_body(), "payload-9");
        assert_eq!(chunks[1][0].message_body(), "payload-10");
    }

    #[test]
    fn batch_entry_carries_delay_and_attributes() {
        let mut message = OutboundMessage::new("payload").with_attributes(HashMap::from([(
            "kind".to_string(),
            AttributeValue::from("test"),
        )]));
        message.set_delay_seconds(Some(1));

        let entry = batch_entry(&message).unwrap();
        assert_eq!(entry.message_body(), "payload");
        assert_eq!(entry.delay_seconds(), Some(1));
        let attributes = entry.message_attributes().unwrap();
        assert_eq!(attributes["kind"].data_type(), "String");
    }

    #[test]
    fn list_attribute_fails_before_any_entry_is_built() {
        let message = OutboundMessage::new("payload").with_attributes(HashMap::from([(
            "tags".to_string(),
            AttributeValue::from(vec!["a".to_string()]),
        )]));
        assert!(matches!(
            batch_entry(&message),
            Err(PublishError::InvalidAttributeType(_))
        ));
    }

    #[tokio::test]
    async fn empty_batch_resolves_without_any_call() {
        // No entries means no chunk calls; the client never connects.
        let client = offline_client();
        let outputs = send_batch(&client, "http://localhost:1", "test-queue", &[])
            .await
            .unwrap();
        assert!(outputs.is_empty());
    }
}
