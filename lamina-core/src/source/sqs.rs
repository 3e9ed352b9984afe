//! SQS queue source.

use super::null_as_default;
use crate::bind::Payload;
use crate::context::{Context, JsonPayload, Source};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// SQS source; one context per message.
pub struct Sqs;

pub type SqsContext = Context<Sqs>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SqsEvent {
    #[serde(rename = "Records", default, deserialize_with = "null_as_default")]
    pub records: Vec<SqsMessage>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SqsMessage {
    #[serde(deserialize_with = "null_as_default")]
    pub message_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub receipt_handle: String,
    #[serde(deserialize_with = "null_as_default")]
    pub body: String,
    #[serde(deserialize_with = "null_as_default")]
    pub md5_of_body: String,
    pub md5_of_message_attributes: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub attributes: HashMap<String, String>,
    #[serde(deserialize_with = "null_as_default")]
    pub message_attributes: HashMap<String, SqsMessageAttribute>,
    #[serde(rename = "eventSourceARN", deserialize_with = "null_as_default")]
    pub event_source_arn: String,
    #[serde(deserialize_with = "null_as_default")]
    pub event_source: String,
    #[serde(deserialize_with = "null_as_default")]
    pub aws_region: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SqsMessageAttribute {
    pub string_value: Option<String>,
    pub binary_value: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub string_list_values: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub binary_list_values: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub data_type: String,
}

impl Source for Sqs {
    type Event = SqsEvent;
    type Record = SqsMessage;
    type Reply = ();

    const KIND: &'static str = "sqs";
    const LABEL: &'static str = "SQS message";

    fn records(event: Self::Event) -> Vec<Self::Record> {
        event.records
    }

    fn correlation_id(record: &Self::Record) -> Option<String> {
        record
            .message_attributes
            .get("correlation_id")
            .and_then(|attr| attr.string_value.clone())
    }

    fn log_fields(record: &Self::Record) -> Vec<(&'static str, String)> {
        vec![("queue_arn", record.event_source_arn.clone())]
    }

    fn describe(record: &Self::Record) -> String {
        format!("Processing SQS message, message ID '{}'", record.message_id)
    }
}

impl JsonPayload for Sqs {
    fn payload(record: &Self::Record) -> Payload<'_> {
        Payload::Bytes(record.body.as_bytes())
    }
}
