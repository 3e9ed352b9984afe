//! Event sources.
//!
//! Each submodule models one Lambda trigger: the event envelope as serde
//! types, a marker type implementing [`Source`](crate::Source), and any
//! context methods specific to that trigger.

mod api_gateway;
mod cloudwatch;
mod dynamodb;
mod generic;
mod s3;
mod sns;
mod sqs;

pub use api_gateway::{
    ApiGatewayConfig, ApiGatewayContext, ApiGatewayHandler, ApiGatewayProxy,
    ApiGatewayProxyRequest, ApiGatewayProxyResponse, ApiGatewayRequestContext,
    ApiGatewayRequestIdentity, CORRELATION_ID_HEADER, ErrorHandler, Outbound,
    default_error_handler, write_error,
};
pub use cloudwatch::{CloudWatchContext, CloudWatchEvent, CloudWatchEvents};
pub use dynamodb::{
    AttributeValue, DynamoDb, DynamoDbContext, DynamoDbEvent, DynamoDbEventRecord, StreamRecord,
    image_to_json,
};
pub use generic::{Generic, GenericContext, GenericHandler};
pub use s3::{S3, S3Bucket, S3Context, S3Entity, S3Event, S3EventRecord, S3Object, S3UserIdentity};
pub use sns::{Sns, SnsContext, SnsEvent, SnsMessage, SnsRecord};
pub use sqs::{Sqs, SqsContext, SqsEvent, SqsMessage, SqsMessageAttribute};

use serde::{Deserialize, Deserializer};

/// Treat an explicit `null` like a missing field.
///
/// Lambda events send `null` for absent maps and lists.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
