//! # Lamina Core
//!
//! Handler and middleware engine for AWS Lambda event sources.
//!
//! A handler receives a [`Context`] for one record of an event source, runs
//! inside an ordered middleware chain, and its outcome is translated into
//! what the invoking platform expects:
//!
//! | Source | Context | Batch | Reply |
//! |---|---|---|---|
//! | API Gateway proxy | [`ApiGatewayContext`] | no | HTTP response |
//! | CloudWatch Events | [`CloudWatchContext`] | no | none |
//! | DynamoDB Streams | [`DynamoDbContext`] | yes | none |
//! | S3 | [`S3Context`] | yes | none |
//! | SNS | [`SnsContext`] | yes | none |
//! | SQS | [`SqsContext`] | yes | none |
//! | Any JSON | [`GenericContext`] | no | JSON value |
//!
//! ## Quick Start
//!
//! ```rust
//! use lamina_core::prelude::*;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Deserialize)]
//! struct Greeting {
//!     name: String,
//! }
//!
//! impl Validate for Greeting {}
//!
//! #[derive(Serialize)]
//! struct Reply {
//!     message: String,
//! }
//!
//! let handler = Handler::from_fn(|ctx: &mut ApiGatewayContext| {
//!     let greeting: Greeting = ctx.bind()?;
//!     ctx.json(200, &Reply { message: format!("hello {}", greeting.name) })
//! })
//! .with_middleware([
//!     middleware::correlation_id::<ApiGatewayProxy>(),
//!     middleware::error_handler(),
//! ]);
//!
//! let adapter = handler.into_api_gateway(ApiGatewayConfig::default());
//! # let _ = adapter;
//! ```

mod bind;
mod context;
mod dispatch;
mod error;
mod handler;

pub mod middleware;
pub mod source;

pub use bind::{Payload, Validate, bind, bind_value, decode, decode_value};
pub use context::{Context, JsonPayload, Source};
pub use dispatch::Adapter;
pub use error::{BoxError, DecodeError, Error, HandlerResult};
pub use handler::{BoxFuture, Handler, Middleware, compose};
pub use lamina_log::Carrier;
pub use source::{
    ApiGatewayConfig, ApiGatewayContext, ApiGatewayHandler, CloudWatchContext, DynamoDbContext,
    GenericContext, GenericHandler, S3Context, SnsContext, SqsContext,
};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::middleware;
    pub use crate::source::{
        ApiGatewayConfig, ApiGatewayContext, ApiGatewayHandler, ApiGatewayProxy,
        ApiGatewayProxyRequest, ApiGatewayProxyResponse, CloudWatchContext, CloudWatchEvent,
        CloudWatchEvents, DynamoDb, DynamoDbContext, DynamoDbEvent, Generic, GenericContext,
        GenericHandler, S3, S3Context, S3Event, Sns, SnsContext, SnsEvent, Sqs, SqsContext,
        SqsEvent,
    };
    pub use crate::{
        Adapter, BoxError, Carrier, Context, Error, Handler, HandlerResult, Middleware, Validate,
    };
}
