//! DynamoDB Streams source.
//!
//! Stream images arrive in DynamoDB's typed attribute-value encoding
//! (`{"name": {"S": "rex"}, "age": {"N": "3"}}`). Binding flattens them to
//! plain JSON (`{"name": "rex", "age": 3}`) before decoding.

use super::null_as_default;
use crate::bind::{Validate, bind_value};
use crate::context::{Context, Source};
use crate::error::BoxError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::collections::HashMap;

/// DynamoDB Streams source; one context per stream record.
pub struct DynamoDb;

pub type DynamoDbContext = Context<DynamoDb>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DynamoDbEvent {
    #[serde(rename = "Records", default, deserialize_with = "null_as_default")]
    pub records: Vec<DynamoDbEventRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DynamoDbEventRecord {
    #[serde(rename = "eventID", deserialize_with = "null_as_default")]
    pub event_id: String,
    /// `INSERT`, `MODIFY` or `REMOVE`
    #[serde(deserialize_with = "null_as_default")]
    pub event_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub event_version: String,
    #[serde(deserialize_with = "null_as_default")]
    pub event_source: String,
    #[serde(deserialize_with = "null_as_default")]
    pub aws_region: String,
    #[serde(rename = "eventSourceARN", deserialize_with = "null_as_default")]
    pub event_source_arn: String,
    pub dynamodb: StreamRecord,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct StreamRecord {
    pub approximate_creation_date_time: Option<f64>,
    #[serde(deserialize_with = "null_as_default")]
    pub keys: HashMap<String, AttributeValue>,
    #[serde(deserialize_with = "null_as_default")]
    pub new_image: HashMap<String, AttributeValue>,
    #[serde(deserialize_with = "null_as_default")]
    pub old_image: HashMap<String, AttributeValue>,
    #[serde(deserialize_with = "null_as_default")]
    pub sequence_number: String,
    pub size_bytes: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub stream_view_type: String,
}

/// A DynamoDB attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    #[serde(rename = "S")]
    String(String),
    /// Numbers travel as strings to keep their precision.
    #[serde(rename = "N")]
    Number(String),
    /// Base64 encoded bytes.
    #[serde(rename = "B")]
    Binary(String),
    #[serde(rename = "BOOL")]
    Bool(bool),
    #[serde(rename = "NULL")]
    Null(bool),
    #[serde(rename = "M")]
    Map(HashMap<String, AttributeValue>),
    #[serde(rename = "L")]
    List(Vec<AttributeValue>),
    #[serde(rename = "SS")]
    StringSet(Vec<String>),
    #[serde(rename = "NS")]
    NumberSet(Vec<String>),
    #[serde(rename = "BS")]
    BinarySet(Vec<String>),
}

impl AttributeValue {
    /// Plain JSON form of this value.
    pub fn to_json(&self) -> Value {
        match self {
            AttributeValue::String(s) | AttributeValue::Binary(s) => Value::String(s.clone()),
            AttributeValue::Number(n) => number(n),
            AttributeValue::Bool(b) => Value::Bool(*b),
            AttributeValue::Null(_) => Value::Null,
            AttributeValue::Map(map) => image_to_json(map),
            AttributeValue::List(list) => Value::Array(list.iter().map(Self::to_json).collect()),
            AttributeValue::StringSet(set) | AttributeValue::BinarySet(set) => {
                Value::Array(set.iter().cloned().map(Value::String).collect())
            }
            AttributeValue::NumberSet(set) => Value::Array(set.iter().map(|n| number(n)).collect()),
        }
    }
}

// Unparseable numbers are kept as strings rather than dropped.
fn number(raw: &str) -> Value {
    serde_json::from_str::<Number>(raw)
        .map(Value::Number)
        .unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Flatten an attribute map (keys or an image) into a JSON object.
pub fn image_to_json(image: &HashMap<String, AttributeValue>) -> Value {
    Value::Object(
        image
            .iter()
            .map(|(name, value)| (name.clone(), value.to_json()))
            .collect(),
    )
}

impl Source for DynamoDb {
    type Event = DynamoDbEvent;
    type Record = DynamoDbEventRecord;
    type Reply = ();

    const KIND: &'static str = "dynamodb";
    const LABEL: &'static str = "DynamoDB event";

    fn records(event: Self::Event) -> Vec<Self::Record> {
        event.records
    }

    fn log_fields(record: &Self::Record) -> Vec<(&'static str, String)> {
        vec![
            ("event_name", record.event_name.clone()),
            ("table_arn", record.event_source_arn.clone()),
        ]
    }

    fn describe(record: &Self::Record) -> String {
        format!("Processing DynamoDB event '{}'", record.event_name)
    }
}

impl Context<DynamoDb> {
    /// Decode and validate the record's key attributes.
    pub fn bind_keys<T: DeserializeOwned + Validate>(&self) -> Result<T, BoxError> {
        bind_value(&image_to_json(&self.record().dynamodb.keys))
    }

    /// Decode and validate the item as it is after the change.
    pub fn bind_new_image<T: DeserializeOwned + Validate>(&self) -> Result<T, BoxError> {
        bind_value(&image_to_json(&self.record().dynamodb.new_image))
    }

    /// Decode and validate the item as it was before the change.
    pub fn bind_old_image<T: DeserializeOwned + Validate>(&self) -> Result<T, BoxError> {
        bind_value(&image_to_json(&self.record().dynamodb.old_image))
    }
}
