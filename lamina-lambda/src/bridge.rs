//! Local HTTP bridge.
//!
//! Serves an API Gateway adapter behind plain `http` types so handlers can
//! be exercised from tests or a local server without the Lambda platform.

use bytes::Bytes;
use http::header::{HeaderName, HeaderValue};
use lamina_core::source::{ApiGatewayProxyRequest, ApiGatewayProxyResponse};
use lamina_core::{Adapter, BoxFuture, Carrier};
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;
use std::task::{Context, Poll};
use tracing::{debug, warn};

use crate::{LambdaError, Result};

/// Serves an API Gateway proxy adapter over `http::Request<Bytes>`.
///
/// The route `pattern` (matchit syntax, e.g. `/animal/{name}`) provides the
/// path parameters and the request's `resource`.
pub struct HttpBridge<A> {
    adapter: Arc<A>,
    router: Arc<Option<matchit::Router<()>>>,
    pattern: String,
    stage_variables: HashMap<String, String>,
}

impl<A> Clone for HttpBridge<A> {
    fn clone(&self) -> Self {
        Self {
            adapter: self.adapter.clone(),
            router: self.router.clone(),
            pattern: self.pattern.clone(),
            stage_variables: self.stage_variables.clone(),
        }
    }
}

impl<A> HttpBridge<A>
where
    A: Adapter<Event = ApiGatewayProxyRequest, Output = ApiGatewayProxyResponse>,
{
    /// Create a bridge for `adapter` mounted at `pattern`.
    pub fn new(
        adapter: A,
        pattern: impl Into<String>,
        stage_variables: Option<HashMap<String, String>>,
    ) -> Self {
        let pattern = pattern.into();
        let mut router = matchit::Router::new();
        let router = match router.insert(pattern.as_str(), ()) {
            Ok(()) => Some(router),
            Err(err) => {
                warn!(pattern = %pattern, error = %err, "Invalid route pattern, path parameters disabled");
                None
            }
        };

        Self {
            adapter: Arc::new(adapter),
            router: Arc::new(router),
            pattern,
            stage_variables: stage_variables.unwrap_or_default(),
        }
    }

    /// Serve one request.
    ///
    /// Adapter failures become `500` with the body `error`.
    pub async fn handle(&self, request: http::Request<Bytes>) -> http::Response<Bytes> {
        let proxy = self.to_proxy_request(request);
        debug!(method = %proxy.http_method, path = %proxy.path, "Bridging HTTP request");

        let result = self.adapter.invoke(Carrier::new(), proxy).await;
        match result.map_err(|err| LambdaError::Response(err.to_string())) {
            Ok(res) => to_http_response(res).unwrap_or_else(|err| server_error(&err)),
            Err(err) => server_error(&err),
        }
    }

    fn to_proxy_request(&self, request: http::Request<Bytes>) -> ApiGatewayProxyRequest {
        let (parts, body) = request.into_parts();

        let mut multi_value_headers: HashMap<String, Vec<String>> = HashMap::new();
        for (name, value) in parts.headers.iter() {
            if let Ok(value) = value.to_str() {
                multi_value_headers
                    .entry(canonical_header_name(name.as_str()))
                    .or_default()
                    .push(value.to_string());
            }
        }

        let pairs: Vec<(String, String)> = parts
            .uri
            .query()
            .and_then(|query| serde_urlencoded::from_str(query).ok())
            .unwrap_or_default();
        let mut multi_value_query_string_parameters: HashMap<String, Vec<String>> = HashMap::new();
        for (key, value) in pairs {
            multi_value_query_string_parameters
                .entry(key)
                .or_default()
                .push(value);
        }

        let path = parts.uri.path().to_string();
        let path_parameters = self
            .router
            .as_ref()
            .as_ref()
            .and_then(|router| router.at(&path).ok())
            .map(|matched| {
                matched
                    .params
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect()
            })
            .unwrap_or_default();

        let body = (!body.is_empty()).then(|| String::from_utf8_lossy(&body).into_owned());
        let http_method = parts.method.as_str().to_string();

        let mut proxy = ApiGatewayProxyRequest {
            resource: self.pattern.clone(),
            path: path.clone(),
            http_method: http_method.clone(),
            headers: first_values(&multi_value_headers),
            multi_value_headers,
            query_string_parameters: first_values(&multi_value_query_string_parameters),
            multi_value_query_string_parameters,
            path_parameters,
            stage_variables: self.stage_variables.clone(),
            body,
            ..Default::default()
        };
        proxy.request_context.resource_path = self.pattern.clone();
        proxy.request_context.http_method = http_method;
        proxy.request_context.path = path;
        proxy
    }
}

/// Convert a proxy response into an `http::Response`.
///
/// Headers are the union of the single- and multi-value maps; invalid names
/// or values are skipped.
pub fn to_http_response(res: ApiGatewayProxyResponse) -> Result<http::Response<Bytes>> {
    let mut builder = http::Response::builder().status(res.status_code);

    if let Some(headers) = builder.headers_mut() {
        for (name, value) in &res.headers {
            if let Some((name, value)) = header_pair(name, value) {
                headers.insert(name, value);
            }
        }
        for (name, values) in &res.multi_value_headers {
            for value in values {
                if let Some((name, value)) = header_pair(name, value)
                    && !headers.get_all(&name).iter().any(|v| *v == value)
                {
                    headers.append(name, value);
                }
            }
        }
    }

    Ok(builder.body(Bytes::from(res.body.unwrap_or_default()))?)
}

fn header_pair(name: &str, value: &str) -> Option<(HeaderName, HeaderValue)> {
    Some((
        HeaderName::from_bytes(name.as_bytes()).ok()?,
        HeaderValue::from_str(value).ok()?,
    ))
}

fn server_error(err: &LambdaError) -> http::Response<Bytes> {
    warn!(error = %err, "Bridged request failed");
    let mut res = http::Response::new(Bytes::from_static(b"error"));
    *res.status_mut() = http::StatusCode::INTERNAL_SERVER_ERROR;
    res
}

fn first_values(multi: &HashMap<String, Vec<String>>) -> HashMap<String, String> {
    multi
        .iter()
        .filter_map(|(k, v)| Some((k.clone(), v.first()?.clone())))
        .collect()
}

/// `correlation-id` -> `Correlation-Id`
fn canonical_header_name(name: &str) -> String {
    name.split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}

impl<A> tower::Service<http::Request<Bytes>> for HttpBridge<A>
where
    A: Adapter<Event = ApiGatewayProxyRequest, Output = ApiGatewayProxyResponse>,
{
    type Response = http::Response<Bytes>;
    type Error = Infallible;
    type Future = BoxFuture<'static, std::result::Result<Self::Response, Infallible>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<std::result::Result<(), Infallible>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: http::Request<Bytes>) -> Self::Future {
        let bridge = self.clone();
        Box::pin(async move { Ok(bridge.handle(request).await) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use lamina_core::prelude::*;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn animal_bridge() -> HttpBridge<ApiGatewayHandler> {
        let handler = Handler::from_fn(|ctx: &mut ApiGatewayContext| {
            let req = ctx.request();
            let body = json!({
                "name": req.param("name"),
                "color": req.query("color"),
                "tags": req.multi_value_query_string_parameters.get("tag"),
                "stage": req.stage_variables.get("env"),
                "resource": req.resource,
                "accept": req.header("accept"),
            });
            ctx.header("Set-Cookie", "a=1");
            ctx.multi_value_header("Set-Cookie", "b=2");
            ctx.json(200, &body)
        });
        let stage = HashMap::from([("env".to_string(), "local".to_string())]);

        HttpBridge::new(
            handler.into_api_gateway(ApiGatewayConfig::default()),
            "/animal/{name}",
            Some(stage),
        )
    }

    #[tokio::test]
    async fn test_bridge_maps_request_and_response() {
        let request = http::Request::builder()
            .method("GET")
            .uri("/animal/cat?color=black&tag=a&tag=b")
            .header("accept", "application/json")
            .body(Bytes::new())
            .unwrap();

        let res = animal_bridge().oneshot(request).await.unwrap();

        assert_eq!(res.status(), 200);
        assert_eq!(res.headers()["content-type"], "application/json");
        let cookies: Vec<_> = res.headers().get_all("set-cookie").iter().collect();
        assert_eq!(cookies.len(), 2);

        let body: Value = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(body["name"], "cat");
        assert_eq!(body["color"], "black");
        assert_eq!(body["tags"], json!(["a", "b"]));
        assert_eq!(body["stage"], "local");
        assert_eq!(body["resource"], "/animal/{name}");
        assert_eq!(body["accept"], "application/json");
    }

    #[tokio::test]
    async fn test_unmatched_path_has_no_params() {
        let request = http::Request::builder()
            .uri("/plant/fern")
            .body(Bytes::new())
            .unwrap();

        let res = animal_bridge().handle(request).await;
        let body: Value = serde_json::from_slice(res.body()).unwrap();

        assert_eq!(body["name"], Value::Null);
    }

    struct Failing;

    #[async_trait]
    impl Adapter for Failing {
        type Event = ApiGatewayProxyRequest;
        type Output = ApiGatewayProxyResponse;

        async fn invoke(
            &self,
            _carrier: Carrier,
            _event: ApiGatewayProxyRequest,
        ) -> std::result::Result<ApiGatewayProxyResponse, BoxError> {
            Err("adapter down".into())
        }
    }

    #[tokio::test]
    async fn test_adapter_error_is_500() {
        let bridge = HttpBridge::new(Failing, "/", None);
        let request = http::Request::builder().uri("/").body(Bytes::new()).unwrap();

        let res = bridge.handle(request).await;

        assert_eq!(res.status(), 500);
        assert_eq!(res.body().as_ref(), b"error");
    }

    #[tokio::test]
    async fn test_body_and_correlation_header() {
        let handler = Handler::from_fn(|ctx: &mut ApiGatewayContext| {
            let body = ctx.request().body.clone().unwrap_or_default();
            ctx.text(201, body);
            Ok(())
        })
        .with_middleware([middleware::correlation_id::<ApiGatewayProxy>()]);
        let bridge = HttpBridge::new(
            handler.into_api_gateway(ApiGatewayConfig::default()),
            "/echo",
            None,
        );

        let request = http::Request::builder()
            .method("POST")
            .uri("/echo")
            .header("correlation-id", "abc")
            .body(Bytes::from_static(b"ping"))
            .unwrap();
        let res = bridge.handle(request).await;

        assert_eq!(res.status(), 201);
        assert_eq!(res.headers()["correlation-id"], "abc");
        assert_eq!(res.body().as_ref(), b"ping");
    }

    #[test]
    fn test_invalid_status_is_error() {
        let res = ApiGatewayProxyResponse {
            status_code: 1000,
            ..Default::default()
        };

        assert!(to_http_response(res).is_err());
    }

    #[test]
    fn test_canonical_header_name() {
        assert_eq!(canonical_header_name("correlation-id"), "Correlation-Id");
        assert_eq!(canonical_header_name("x-amz-date"), "X-Amz-Date");
    }
}
