//! Integration tests for common lamina workflows.
//!
//! These tests wire handlers, middleware and adapters together the way a
//! Lambda function does.

use bytes::Bytes;
use lamina::log::{Format, Level, LogConfig};
use lamina::middleware::logger_with_config;
use lamina::prelude::*;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use serde_json::{Value, json};
use std::io::{self, Write};
use std::sync::Arc;
use tower::ServiceExt;

#[derive(Clone, Default)]
struct Buffer(Arc<Mutex<Vec<u8>>>);

impl Write for Buffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Buffer {
    fn lines(&self) -> Vec<Value> {
        String::from_utf8_lossy(&self.0.lock())
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }
}

fn log_config() -> LogConfig {
    LogConfig::new().level(Level::Debug).format(Format::Json)
}

// =============================================================================
// API Gateway
// =============================================================================

#[derive(Deserialize)]
struct Greeting {
    name: String,
}

impl Validate for Greeting {
    fn validate(&self) -> Result<(), BoxError> {
        if self.name.trim().is_empty() {
            return Err(Error::bad_request("name is required").into());
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct Reply {
    message: String,
}

fn greeting_handler(buffer: &Buffer) -> ApiGatewayHandler {
    Handler::from_fn(|ctx: &mut ApiGatewayContext| {
        let greeting: Greeting = ctx.bind()?;
        ctx.json(
            200,
            &Reply {
                message: format!("hello {}", greeting.name),
            },
        )
    })
    .with_middleware([
        middleware::correlation_id::<ApiGatewayProxy>(),
        logger_with_config::<ApiGatewayProxy>(
            Sink::new(buffer.clone()),
            [("service", "greeter")],
            log_config(),
        ),
        middleware::error_handler(),
    ])
    .into_api_gateway(ApiGatewayConfig::default())
}

fn post(body: &str) -> ApiGatewayProxyRequest {
    ApiGatewayProxyRequest {
        http_method: "POST".to_string(),
        path: "/greet".to_string(),
        resource: "/greet".to_string(),
        headers: [("Correlation-Id".to_string(), "cid-42".to_string())].into(),
        body: Some(body.to_string()),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_api_gateway_greeting() {
    let buffer = Buffer::default();

    let res = greeting_handler(&buffer)
        .handle(Carrier::new(), post(r#"{"name": "ada"}"#))
        .await;

    assert_eq!(res.status_code, 200);
    assert_eq!(res.headers["Content-Type"], "application/json");
    assert_eq!(res.headers["Correlation-Id"], "cid-42");
    assert_eq!(res.body.as_deref(), Some(r#"{"message":"hello ada"}"#));

    let lines = buffer.lines();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["correlation_id"], "cid-42");
    assert_eq!(lines[0]["service"], "greeter");
}

#[tokio::test]
async fn test_api_gateway_validation_error() {
    let buffer = Buffer::default();

    let res = greeting_handler(&buffer)
        .handle(Carrier::new(), post(r#"{"name": "  "}"#))
        .await;

    assert_eq!(res.status_code, 400);
    assert_eq!(res.body.as_deref(), Some(r#"{"message":"name is required"}"#));
    assert_eq!(res.headers["Correlation-Id"], "cid-42");

    // Handled inside the chain, so the logger never sees a failure.
    let lines = buffer.lines();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["level"], "info");
}

#[tokio::test]
async fn test_api_gateway_malformed_body() {
    let res = greeting_handler(&Buffer::default())
        .handle(Carrier::new(), post("not json"))
        .await;

    assert_eq!(res.status_code, 500);
    assert_eq!(
        res.body.as_deref(),
        Some(r#"{"message":"Internal server error"}"#)
    );
}

#[tokio::test]
async fn test_http_bridge_with_path_parameters() {
    let handler = Handler::from_fn(|ctx: &mut ApiGatewayContext| {
        let name = ctx.request().param("name").unwrap_or("nobody").to_string();
        ctx.json(200, &json!({ "animal": name }))
    });
    let bridge = HttpBridge::new(
        handler.into_api_gateway(ApiGatewayConfig::default()),
        "/animal/{name}",
        None,
    );

    let request = http::Request::builder()
        .method("GET")
        .uri("/animal/otter")
        .body(Bytes::new())
        .unwrap();
    let res = bridge.oneshot(request).await.unwrap();

    assert_eq!(res.status(), 200);
    let body: Value = serde_json::from_slice(res.body()).unwrap();
    assert_eq!(body["animal"], "otter");
}

// =============================================================================
// Batch sources
// =============================================================================

#[derive(Deserialize)]
struct Order {
    id: u32,
}

impl Validate for Order {}

#[tokio::test]
async fn test_sqs_batch_stops_at_first_failure() {
    let buffer = Buffer::default();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let recorded = seen.clone();

    let handler = Handler::new(move |ctx: &mut SqsContext| {
        let recorded = recorded.clone();
        Box::pin(async move {
            let order: Order = ctx.bind()?;
            recorded.lock().push(order.id);
            if order.id == 2 {
                return Err(format!("order {} rejected", order.id).into());
            }
            Ok(())
        })
    })
    .with_middleware([
        middleware::correlation_id::<Sqs>(),
        logger_with_config::<Sqs>(
            Sink::new(buffer.clone()),
            Vec::<(String, String)>::new(),
            log_config(),
        ),
    ]);

    let event: SqsEvent = serde_json::from_value(json!({
        "Records": [
            {"messageId": "m1", "body": "{\"id\": 1}", "eventSourceARN": "arn:aws:sqs:eu-west-1:1:orders",
             "messageAttributes": {"correlation_id": {"stringValue": "cid-1", "dataType": "String"}}},
            {"messageId": "m2", "body": "{\"id\": 2}", "eventSourceARN": "arn:aws:sqs:eu-west-1:1:orders"},
            {"messageId": "m3", "body": "{\"id\": 3}", "eventSourceARN": "arn:aws:sqs:eu-west-1:1:orders"}
        ]
    }))
    .unwrap();

    let err = handler.dispatch(&Carrier::new(), event).await.unwrap_err();

    assert_eq!(err.to_string(), "order 2 rejected");
    assert_eq!(*seen.lock(), vec![1, 2]);

    let lines = buffer.lines();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0]["correlation_id"], "cid-1");
    assert_eq!(lines[0]["queue_arn"], "arn:aws:sqs:eu-west-1:1:orders");
    assert_eq!(lines[1]["correlation_id"].as_str().map(str::len), Some(36));
    assert_eq!(lines[2]["level"], "error");
    assert_eq!(lines[2]["message"], "Error processing SQS message: order 2 rejected");
}

#[tokio::test]
async fn test_dynamodb_new_image() {
    #[derive(Deserialize)]
    struct User {
        id: String,
        age: u32,
    }

    impl Validate for User {}

    let seen = Arc::new(Mutex::new(Vec::new()));
    let recorded = seen.clone();
    let handler = Handler::from_fn(move |ctx: &mut DynamoDbContext| {
        let user: User = ctx.bind_new_image()?;
        recorded.lock().push((user.id, user.age));
        Ok(())
    });

    let event: DynamoDbEvent = serde_json::from_value(json!({
        "Records": [{
            "eventID": "1",
            "eventName": "INSERT",
            "eventSourceARN": "arn:aws:dynamodb:eu-west-1:1:table/users/stream/x",
            "dynamodb": {
                "Keys": {"id": {"S": "u1"}},
                "NewImage": {"id": {"S": "u1"}, "age": {"N": "37"}}
            }
        }]
    }))
    .unwrap();

    handler.dispatch(&Carrier::new(), event).await.unwrap();

    assert_eq!(*seen.lock(), vec![("u1".to_string(), 37)]);
}

// =============================================================================
// Generic
// =============================================================================

#[tokio::test]
async fn test_generic_echo() {
    let adapter = Handler::from_fn(|ctx: &mut GenericContext| {
        let value: Value = ctx.bind()?;
        ctx.respond(&json!({ "echo": value }))
    })
    .into_generic();

    let out = adapter
        .invoke(Carrier::new(), RawValue::from_string(r#"{"ping": true}"#.to_string()).unwrap())
        .await
        .unwrap();

    assert_eq!(out, json!({"echo": {"ping": true}}));
}
