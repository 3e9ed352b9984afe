//! API Gateway REST API (proxy integration) source.
//!
//! The only request/response source: handlers write the HTTP response
//! through [`Context::json`], [`Context::text`] and friends, and errors that
//! escape the chain are turned into a JSON error response.

use super::null_as_default;
use crate::bind::Payload;
use crate::context::{Context, JsonPayload, Source};
use crate::dispatch::Adapter;
use crate::error::{BoxError, Error, HandlerResult};
use crate::handler::Handler;
use async_trait::async_trait;
use lamina_log::Carrier;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Header carrying the correlation ID in and out.
pub const CORRELATION_ID_HEADER: &str = "Correlation-Id";

/// API Gateway proxy integration source.
pub struct ApiGatewayProxy;

pub type ApiGatewayContext = Context<ApiGatewayProxy>;

/// Proxy integration request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ApiGatewayProxyRequest {
    #[serde(deserialize_with = "null_as_default")]
    pub resource: String,
    #[serde(deserialize_with = "null_as_default")]
    pub path: String,
    #[serde(deserialize_with = "null_as_default")]
    pub http_method: String,
    #[serde(deserialize_with = "null_as_default")]
    pub headers: HashMap<String, String>,
    #[serde(deserialize_with = "null_as_default")]
    pub multi_value_headers: HashMap<String, Vec<String>>,
    #[serde(deserialize_with = "null_as_default")]
    pub query_string_parameters: HashMap<String, String>,
    #[serde(deserialize_with = "null_as_default")]
    pub multi_value_query_string_parameters: HashMap<String, Vec<String>>,
    #[serde(deserialize_with = "null_as_default")]
    pub path_parameters: HashMap<String, String>,
    #[serde(deserialize_with = "null_as_default")]
    pub stage_variables: HashMap<String, String>,
    pub request_context: ApiGatewayRequestContext,
    pub body: Option<String>,
    pub is_base64_encoded: bool,
}

impl ApiGatewayProxyRequest {
    /// First value of a header, matched case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
            .or_else(|| {
                self.multi_value_header(name)
                    .and_then(|values| values.first())
                    .map(String::as_str)
            })
    }

    /// All values of a header, matched case-insensitively.
    pub fn multi_value_header(&self, name: &str) -> Option<&[String]> {
        self.multi_value_headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, values)| values.as_slice())
    }

    /// A query string parameter.
    pub fn query(&self, name: &str) -> Option<&str> {
        self.query_string_parameters.get(name).map(String::as_str)
    }

    /// A path parameter.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.path_parameters.get(name).map(String::as_str)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ApiGatewayRequestContext {
    #[serde(deserialize_with = "null_as_default")]
    pub account_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub api_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub resource_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub resource_path: String,
    #[serde(deserialize_with = "null_as_default")]
    pub stage: String,
    #[serde(deserialize_with = "null_as_default")]
    pub request_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub http_method: String,
    #[serde(deserialize_with = "null_as_default")]
    pub path: String,
    pub request_time_epoch: i64,
    pub identity: ApiGatewayRequestIdentity,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ApiGatewayRequestIdentity {
    pub source_ip: Option<String>,
    pub user_agent: Option<String>,
}

/// Proxy integration response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ApiGatewayProxyResponse {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub multi_value_headers: HashMap<String, Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    pub is_base64_encoded: bool,
}

/// Response under construction.
///
/// Written through the context; read once by the adapter.
#[derive(Debug, Default)]
pub struct Outbound {
    status: Option<u16>,
    headers: HashMap<String, String>,
    multi_value_headers: HashMap<String, Vec<String>>,
    body: Option<String>,
}

impl Outbound {
    pub(crate) fn set_status(&mut self, status: u16) {
        self.status = Some(status);
    }

    pub(crate) fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.insert(name.into(), value.into());
    }

    pub(crate) fn append_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.multi_value_headers
            .entry(name.into())
            .or_default()
            .push(value.into());
    }

    pub(crate) fn set_body(&mut self, body: String) {
        self.body = Some(body);
    }

    /// Normalize into the platform response.
    ///
    /// A response whose status was never written is `200`, or `204` when it
    /// has no body either.
    pub(crate) fn into_response(self) -> ApiGatewayProxyResponse {
        let status_code = match (self.status, &self.body) {
            (Some(status), _) => status,
            (None, Some(_)) => 200,
            (None, None) => 204,
        };

        ApiGatewayProxyResponse {
            status_code,
            headers: self.headers,
            multi_value_headers: self.multi_value_headers,
            body: self.body,
            is_base64_encoded: false,
        }
    }
}

impl Source for ApiGatewayProxy {
    type Event = ApiGatewayProxyRequest;
    type Record = ApiGatewayProxyRequest;
    type Reply = Outbound;

    const KIND: &'static str = "api_gateway_proxy";
    const LABEL: &'static str = "API Gateway request";

    fn records(event: Self::Event) -> Vec<Self::Record> {
        vec![event]
    }

    fn correlation_id(record: &Self::Record) -> Option<String> {
        record.header(CORRELATION_ID_HEADER).map(str::to_string)
    }

    fn echo_correlation_id(reply: &mut Self::Reply, id: &str) {
        reply.set_header(CORRELATION_ID_HEADER, id);
    }

    fn log_fields(record: &Self::Record) -> Vec<(&'static str, String)> {
        vec![
            ("req_method", record.http_method.clone()),
            ("req_path", record.path.clone()),
            ("req_route", record.resource.clone()),
        ]
    }

    fn describe(record: &Self::Record) -> String {
        format!(
            "Processing API Gateway request '{} {}'",
            record.http_method, record.path
        )
    }
}

impl JsonPayload for ApiGatewayProxy {
    fn payload(record: &Self::Record) -> Payload<'_> {
        Payload::Bytes(record.body.as_deref().unwrap_or_default().as_bytes())
    }
}

impl Context<ApiGatewayProxy> {
    /// The inbound request.
    #[inline]
    pub fn request(&self) -> &ApiGatewayProxyRequest {
        self.record()
    }

    /// Write a JSON response.
    ///
    /// A body that serializes to `null` (such as `()` or `None`) writes only
    /// the status.
    pub fn json<T: Serialize + ?Sized>(&mut self, status: u16, body: &T) -> HandlerResult {
        let body = serde_json::to_string(body)?;

        let reply = self.reply_mut();
        reply.set_status(status);
        if body != "null" {
            reply.set_header("Content-Type", "application/json");
            reply.set_body(body);
        }
        Ok(())
    }

    /// Write a plain text response.
    pub fn text(&mut self, status: u16, body: impl Into<String>) {
        let reply = self.reply_mut();
        reply.set_status(status);
        reply.set_header("Content-Type", "text/plain; charset=utf-8");
        reply.set_body(body.into());
    }

    /// Set the response status.
    pub fn status(&mut self, status: u16) {
        self.reply_mut().set_status(status);
    }

    /// Set a single-value response header.
    pub fn header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.reply_mut().set_header(name, value);
    }

    /// Append a value to a multi-value response header.
    pub fn multi_value_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.reply_mut().append_header(name, value);
    }
}

/// Turns an error that escaped the chain into a response.
pub type ErrorHandler = Arc<dyn Fn(&mut ApiGatewayContext, BoxError) + Send + Sync>;

/// Adapter configuration.
#[derive(Clone, Default)]
pub struct ApiGatewayConfig {
    /// Replaces [`default_error_handler`] when set.
    pub error_handler: Option<ErrorHandler>,
}

impl ApiGatewayConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom error handler.
    pub fn error_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&mut ApiGatewayContext, BoxError) + Send + Sync + 'static,
    {
        self.error_handler = Some(Arc::new(handler));
        self
    }
}

impl std::fmt::Debug for ApiGatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiGatewayConfig")
            .field("error_handler", &self.error_handler.is_some())
            .finish()
    }
}

/// Write `error` as a JSON response with its status.
pub fn write_error(ctx: &mut ApiGatewayContext, error: &Error) {
    if ctx.json(error.status_code, error).is_err() {
        ctx.text(error.status_code, error.message.clone());
    }
}

/// Framework errors keep their status and message; anything else becomes a
/// generic 500.
pub fn default_error_handler(ctx: &mut ApiGatewayContext, err: BoxError) {
    write_error(ctx, &Error::classify(&err));
}

/// API Gateway entry point: runs the chain and always produces a response.
#[derive(Clone, Debug)]
pub struct ApiGatewayHandler {
    handler: Handler<ApiGatewayContext>,
    config: ApiGatewayConfig,
}

impl ApiGatewayHandler {
    pub fn new(handler: Handler<ApiGatewayContext>, config: ApiGatewayConfig) -> Self {
        Self { handler, config }
    }

    /// Handle one request.
    pub async fn handle(
        &self,
        carrier: Carrier,
        request: ApiGatewayProxyRequest,
    ) -> ApiGatewayProxyResponse {
        let mut ctx = Context::new(carrier, request);

        let result = self.handler.call(&mut ctx).await;
        if let Err(err) = result {
            debug!(error = %err, "Handler returned an error");
            match &self.config.error_handler {
                Some(error_handler) => error_handler(&mut ctx, err),
                None => default_error_handler(&mut ctx, err),
            }
        }

        ctx.into_reply().into_response()
    }
}

#[async_trait]
impl Adapter for ApiGatewayHandler {
    type Event = ApiGatewayProxyRequest;
    type Output = ApiGatewayProxyResponse;

    async fn invoke(
        &self,
        carrier: Carrier,
        event: ApiGatewayProxyRequest,
    ) -> Result<ApiGatewayProxyResponse, BoxError> {
        Ok(self.handle(carrier, event).await)
    }
}

impl Handler<ApiGatewayContext> {
    /// Wrap this handler in an API Gateway adapter.
    pub fn into_api_gateway(self, config: ApiGatewayConfig) -> ApiGatewayHandler {
        ApiGatewayHandler::new(self, config)
    }
}
