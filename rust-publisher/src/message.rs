//! Outbound message model shared by the SQS and SNS publishers.
//!
//! A message body is always text: structured values are serialized to JSON
//! once, at construction time. Attributes carry an explicit data type
//! (`String`, `String.Array`, `Number`) that each backend renders slightly
//! differently - SQS has no list data type.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::PublishError;

/// Named attributes attached to an outbound message.
pub type Attributes = HashMap<String, AttributeValue>;

/// A single message attribute value.
///
/// Variants are tried in declaration order when deserializing, so a JSON
/// string always becomes `Text` - the text `"42"` is classified as a
/// string, never as a number. Objects, booleans, nulls and arrays with
/// non-string elements match no variant and fail deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// Plain text, passed through unchanged.
    Text(String),
    /// List of strings; SNS only, rendered as the JSON text of the list.
    TextArray(Vec<String>),
    /// Numeric value, rendered as its decimal text form.
    Number(f64),
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<Vec<String>> for AttributeValue {
    fn from(value: Vec<String>) -> Self {
        Self::TextArray(value)
    }
}

/// One outbound message: body, optional typed attributes, optional delivery
/// delay.
///
/// Attributes are fixed at construction. The delay stays mutable because a
/// message built for immediate delivery may later be routed through a
/// delayed-send call path.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundMessage {
    body: String,
    attributes: Option<Attributes>,
    delay_seconds: Option<u32>,
}

impl OutboundMessage {
    /// Create a message from an already-text body.
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            attributes: None,
            delay_seconds: None,
        }
    }

    /// Create a message from a structured value, serializing it to JSON.
    ///
    /// Serialization failures propagate to the caller; they are never
    /// recovered internally.
    pub fn from_serializable<T>(value: &T) -> Result<Self, PublishError>
    where
        T: Serialize + ?Sized,
    {
        Ok(Self::new(serde_json::to_string(value)?))
    }

    /// Attach attributes to the message.
    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = Some(attributes);
        self
    }

    /// Set the delivery delay at construction.
    pub fn with_delay_seconds(mut self, seconds: u32) -> Self {
        self.delay_seconds = Some(seconds);
        self
    }

    /// The stored body, unchanged.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Current delivery delay in whole seconds, if any.
    pub fn delay_seconds(&self) -> Option<u32> {
        self.delay_seconds
    }

    /// Overwrite or clear the delivery delay.
    ///
    /// No upper bound is enforced here; the backend reports its own limit.
    pub fn set_delay_seconds(&mut self, seconds: Option<u32>) {
        self.delay_seconds = seconds;
    }

    /// Render the attributes for an SQS request.
    ///
    /// Returns `Ok(None)` when the message carries no attributes. SQS has
    /// no list data type, so `TextArray` values are rejected here.
    pub fn sqs_attributes(
        &self,
    ) -> Result<Option<HashMap<String, aws_sdk_sqs::types::MessageAttributeValue>>, PublishError>
    {
        let Some(attributes) = &self.attributes else {
            return Ok(None);
        };

        let mut rendered = HashMap::with_capacity(attributes.len());
        for (name, value) in attributes {
            let (data_type, text) = match value {
                AttributeValue::Text(text) => ("String", text.clone()),
                AttributeValue::Number(number) if !number.is_nan() => {
                    ("Number", number.to_string())
                }
                _ => return Err(PublishError::InvalidAttributeType(name.clone())),
            };
            let attribute = aws_sdk_sqs::types::MessageAttributeValue::builder()
                .data_type(data_type)
                .string_value(text)
                .build()?;
            rendered.insert(name.clone(), attribute);
        }

        Ok(Some(rendered))
    }

    /// Render the attributes for an SNS request.
    ///
    /// Same rules as SQS, plus list values map to the `String.Array` data
    /// type with the JSON text of the list as the value.
    pub fn sns_attributes(
        &self,
    ) -> Result<Option<HashMap<String, aws_sdk_sns::types::MessageAttributeValue>>, PublishError>
    {
        let Some(attributes) = &self.attributes else {
            return Ok(None);
        };

        let mut rendered = HashMap::with_capacity(attributes.len());
        for (name, value) in attributes {
            let (data_type, text) = match value {
                AttributeValue::Text(text) => ("String", text.clone()),
                AttributeValue::TextArray(items) => {
                    ("String.Array", serde_json::to_string(items)?)
                }
                AttributeValue::Number(number) if !number.is_nan() => {
                    ("Number", number.to_string())
                }
                _ => return Err(PublishError::InvalidAttributeType(name.clone())),
            };
            let attribute = aws_sdk_sns::types::MessageAttributeValue::builder()
                .data_type(data_type)
                .string_value(text)
                .build()?;
            rendered.insert(name.clone(), attribute);
        }

        Ok(Some(rendered))
    }
}

impl From<String> for OutboundMessage {
    fn from(body: String) -> Self {
        Self::new(body)
    }
}

impl From<&str> for OutboundMessage {
    fn from(body: &str) -> Self {
        Self::new(body)
    }
}

/// A JSON string keeps its text unchanged; any other value is serialized to
/// its compact JSON form. The text check runs first, as everywhere else.
impl From<Value> for OutboundMessage {
    fn from(value: Value) -> Self {
        match value {
            Value::String(text) => Self::new(text),
            other => Self::new(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn message_with(name: &str, value: AttributeValue) -> OutboundMessage {
        OutboundMessage::new("body")
            .with_attributes(HashMap::from([(name.to_string(), value)]))
    }

    #[test]
    fn text_attribute_passes_through_unchanged() {
        let message = message_with("kind", AttributeValue::from("test"));

        let sqs = message.sqs_attributes().unwrap().unwrap();
        assert_eq!(sqs["kind"].data_type(), "String");
        assert_eq!(sqs["kind"].string_value(), Some("test"));

        let sns = message.sns_attributes().unwrap().unwrap();
        assert_eq!(sns["kind"].data_type(), "String");
        assert_eq!(sns["kind"].string_value(), Some("test"));
    }

    #[test]
    fn number_attribute_renders_decimal_text() {
        let message = message_with("count", AttributeValue::from(1.0));
        let sqs = message.sqs_attributes().unwrap().unwrap();
        assert_eq!(sqs["count"].data_type(), "Number");
        assert_eq!(sqs["count"].string_value(), Some("1"));

        let message = message_with("ratio", AttributeValue::from(1.5));
        let sns = message.sns_attributes().unwrap().unwrap();
        assert_eq!(sns["ratio"].data_type(), "Number");
        assert_eq!(sns["ratio"].string_value(), Some("1.5"));
    }

    #[test]
    fn numeric_text_stays_a_string() {
        let value: AttributeValue = serde_json::from_value(json!("42")).unwrap();
        assert_eq!(value, AttributeValue::Text("42".to_string()));

        let message = message_with("port", value);
        let sqs = message.sqs_attributes().unwrap().unwrap();
        assert_eq!(sqs["port"].data_type(), "String");
        assert_eq!(sqs["port"].string_value(), Some("42"));
    }

    #[test]
    fn list_attribute_is_string_array_on_sns() {
        let value: AttributeValue = serde_json::from_value(json!(["test", "test2"])).unwrap();
        assert_eq!(
            value,
            AttributeValue::TextArray(vec!["test".to_string(), "test2".to_string()])
        );

        let message = message_with("tags", value);
        let sns = message.sns_attributes().unwrap().unwrap();
        assert_eq!(sns["tags"].data_type(), "String.Array");
        assert_eq!(sns["tags"].string_value(), Some(r#"["test","test2"]"#));
    }

    #[test]
    fn list_attribute_rejected_on_sqs() {
        let message = message_with(
            "tags",
            AttributeValue::from(vec!["test".to_string(), "test2".to_string()]),
        );
        match message.sqs_attributes() {
            Err(PublishError::InvalidAttributeType(name)) => assert_eq!(name, "tags"),
            other => panic!("expected invalid attribute error, got {other:?}"),
        }
    }

    #[test]
    fn nan_attribute_rejected_on_both_backends() {
        let message = message_with("bad", AttributeValue::Number(f64::NAN));
        assert!(matches!(
            message.sqs_attributes(),
            Err(PublishError::InvalidAttributeType(_))
        ));
        assert!(matches!(
            message.sns_attributes(),
            Err(PublishError::InvalidAttributeType(_))
        ));
    }

    #[test]
    fn object_attribute_fails_deserialization() {
        assert!(serde_json::from_value::<AttributeValue>(json!({"test": "test"})).is_err());
        assert!(serde_json::from_value::<AttributeValue>(json!(true)).is_err());
        assert!(serde_json::from_value::<AttributeValue>(json!(null)).is_err());
        // Arrays with non-string elements match no variant either.
        assert!(serde_json::from_value::<AttributeValue>(json!([1, 2])).is_err());
    }

    #[test]
    fn structured_body_serializes_to_json_text() {
        let message = OutboundMessage::from_serializable(&json!({"message": "x"})).unwrap();
        assert_eq!(message.body(), r#"{"message":"x"}"#);
    }

    #[test]
    fn json_string_body_keeps_its_text() {
        let message = OutboundMessage::from(json!("plain text"));
        assert_eq!(message.body(), "plain text");

        let message = OutboundMessage::from(json!({"message": "x"}));
        assert_eq!(message.body(), r#"{"message":"x"}"#);
    }

    #[test]
    fn delay_can_be_set_overwritten_and_cleared() {
        let mut message = OutboundMessage::new("body");
        assert_eq!(message.delay_seconds(), None);

        message.set_delay_seconds(Some(1));
        assert_eq!(message.delay_seconds(), Some(1));

        message.set_delay_seconds(Some(30));
        assert_eq!(message.delay_seconds(), Some(30));

        message.set_delay_seconds(None);
        assert_eq!(message.delay_seconds(), None);
    }

    #[test]
    fn messages_without_attributes_render_none() {
        let message = OutboundMessage::new("body");
        assert!(message.sqs_attributes().unwrap().is_none());
        assert!(message.sns_attributes().unwrap().is_none());
    }
}
