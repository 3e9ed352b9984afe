//! CloudWatch Events / EventBridge source.

use super::null_as_default;
use crate::bind::Payload;
use crate::context::{Context, JsonPayload, Source};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// CloudWatch Events source; one context per event, bound from `detail`.
pub struct CloudWatchEvents;

pub type CloudWatchContext = Context<CloudWatchEvents>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CloudWatchEvent {
    #[serde(deserialize_with = "null_as_default")]
    pub version: String,
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub detail_type: String,
    #[serde(deserialize_with = "null_as_default")]
    pub source: String,
    #[serde(deserialize_with = "null_as_default")]
    pub account: String,
    #[serde(deserialize_with = "null_as_default")]
    pub time: String,
    #[serde(deserialize_with = "null_as_default")]
    pub region: String,
    #[serde(deserialize_with = "null_as_default")]
    pub resources: Vec<String>,
    pub detail: Value,
}

impl Source for CloudWatchEvents {
    type Event = CloudWatchEvent;
    type Record = CloudWatchEvent;
    type Reply = ();

    const KIND: &'static str = "cloudwatch_events";
    const LABEL: &'static str = "CloudWatch event";

    fn records(event: Self::Event) -> Vec<Self::Record> {
        vec![event]
    }

    fn correlation_id(record: &Self::Record) -> Option<String> {
        Some(record.id.clone())
    }

    fn log_fields(record: &Self::Record) -> Vec<(&'static str, String)> {
        vec![("detail_type", record.detail_type.clone())]
    }

    fn describe(record: &Self::Record) -> String {
        format!("Processing CloudWatch event of type '{}'", record.detail_type)
    }
}

impl JsonPayload for CloudWatchEvents {
    fn payload(record: &Self::Record) -> Payload<'_> {
        Payload::Value(&record.detail)
    }
}
