//! S3 bucket notification source.
//!
//! S3 records describe an object change; there is no payload to bind.

use super::null_as_default;
use crate::context::{Context, Source};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// S3 source; one context per record.
pub struct S3;

pub type S3Context = Context<S3>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct S3Event {
    #[serde(rename = "Records", default, deserialize_with = "null_as_default")]
    pub records: Vec<S3EventRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct S3EventRecord {
    #[serde(deserialize_with = "null_as_default")]
    pub event_version: String,
    #[serde(deserialize_with = "null_as_default")]
    pub event_source: String,
    #[serde(deserialize_with = "null_as_default")]
    pub aws_region: String,
    #[serde(deserialize_with = "null_as_default")]
    pub event_time: String,
    #[serde(deserialize_with = "null_as_default")]
    pub event_name: String,
    pub user_identity: S3UserIdentity,
    #[serde(deserialize_with = "null_as_default")]
    pub request_parameters: HashMap<String, String>,
    #[serde(deserialize_with = "null_as_default")]
    pub response_elements: HashMap<String, String>,
    pub s3: S3Entity,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct S3UserIdentity {
    #[serde(deserialize_with = "null_as_default")]
    pub principal_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct S3Entity {
    #[serde(deserialize_with = "null_as_default")]
    pub s3_schema_version: String,
    #[serde(deserialize_with = "null_as_default")]
    pub configuration_id: String,
    pub bucket: S3Bucket,
    pub object: S3Object,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct S3Bucket {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    pub owner_identity: S3UserIdentity,
    #[serde(deserialize_with = "null_as_default")]
    pub arn: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct S3Object {
    #[serde(deserialize_with = "null_as_default")]
    pub key: String,
    pub size: Option<u64>,
    pub e_tag: Option<String>,
    pub version_id: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub sequencer: String,
}

impl Source for S3 {
    type Event = S3Event;
    type Record = S3EventRecord;
    type Reply = ();

    const KIND: &'static str = "s3";
    const LABEL: &'static str = "S3 event";

    fn records(event: Self::Event) -> Vec<Self::Record> {
        event.records
    }

    fn log_fields(record: &Self::Record) -> Vec<(&'static str, String)> {
        vec![
            ("event_name", record.event_name.clone()),
            ("bucket_name", record.s3.bucket.name.clone()),
            ("object_key", record.s3.object.key.clone()),
        ]
    }

    fn describe(record: &Self::Record) -> String {
        format!("Processing S3 event '{}'", record.event_name)
    }
}
