//! SNS topic source.

use super::null_as_default;
use crate::bind::Payload;
use crate::context::{Context, JsonPayload, Source};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// SNS source; one context per notification.
pub struct Sns;

pub type SnsContext = Context<Sns>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnsEvent {
    #[serde(rename = "Records", default, deserialize_with = "null_as_default")]
    pub records: Vec<SnsRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct SnsRecord {
    #[serde(deserialize_with = "null_as_default")]
    pub event_version: String,
    #[serde(deserialize_with = "null_as_default")]
    pub event_subscription_arn: String,
    #[serde(deserialize_with = "null_as_default")]
    pub event_source: String,
    pub sns: SnsMessage,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct SnsMessage {
    #[serde(deserialize_with = "null_as_default")]
    pub message_id: String,
    #[serde(rename = "Type", deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(deserialize_with = "null_as_default")]
    pub topic_arn: String,
    pub subject: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub message: String,
    #[serde(deserialize_with = "null_as_default")]
    pub timestamp: String,
    #[serde(deserialize_with = "null_as_default")]
    pub signature_version: String,
    #[serde(deserialize_with = "null_as_default")]
    pub signature: String,
    #[serde(rename = "SigningCertURL", alias = "SigningCertUrl", deserialize_with = "null_as_default")]
    pub signing_cert_url: String,
    #[serde(rename = "UnsubscribeURL", alias = "UnsubscribeUrl", deserialize_with = "null_as_default")]
    pub unsubscribe_url: String,
    /// Attributes as delivered: usually `{"Type": ..., "Value": ...}` objects.
    #[serde(deserialize_with = "null_as_default")]
    pub message_attributes: HashMap<String, Value>,
}

impl SnsMessage {
    /// String value of a message attribute, either a bare string or the
    /// `Value` of a typed attribute.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        match self.message_attributes.get(name)? {
            Value::String(value) => Some(value.as_str()),
            Value::Object(typed) => typed.get("Value").and_then(Value::as_str),
            _ => None,
        }
    }
}

impl Source for Sns {
    type Event = SnsEvent;
    type Record = SnsRecord;
    type Reply = ();

    const KIND: &'static str = "sns";
    const LABEL: &'static str = "SNS event";

    fn records(event: Self::Event) -> Vec<Self::Record> {
        event.records
    }

    fn correlation_id(record: &Self::Record) -> Option<String> {
        record.sns.attribute("correlation_id").map(str::to_string)
    }

    fn log_fields(record: &Self::Record) -> Vec<(&'static str, String)> {
        vec![("topic_arn", record.sns.topic_arn.clone())]
    }

    fn describe(record: &Self::Record) -> String {
        format!("Processing SNS event for topic '{}'", record.sns.topic_arn)
    }
}

impl JsonPayload for Sns {
    fn payload(record: &Self::Record) -> Payload<'_> {
        Payload::Bytes(record.sns.message.as_bytes())
    }
}
