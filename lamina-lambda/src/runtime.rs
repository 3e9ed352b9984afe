//! Lambda runtime for lamina handlers.

use lambda_runtime::{LambdaEvent, service_fn};
use lamina_core::{
    Adapter, ApiGatewayConfig, ApiGatewayContext, BoxError, Carrier, Context, GenericContext,
    Handler, Source,
};
use std::sync::Arc;
use tracing::{debug, info};

use crate::Result;

/// Lambda runtime configuration.
#[derive(Debug, Clone)]
pub struct LambdaConfig {
    /// Log every invocation at debug level.
    pub log_invocations: bool,
    /// Log every outcome at debug level.
    pub log_responses: bool,
}

impl Default for LambdaConfig {
    fn default() -> Self {
        Self {
            log_invocations: true,
            log_responses: false,
        }
    }
}

impl LambdaConfig {
    /// Enable invocation logging.
    pub fn log_invocations(mut self, enabled: bool) -> Self {
        self.log_invocations = enabled;
        self
    }

    /// Enable outcome logging.
    pub fn log_responses(mut self, enabled: bool) -> Self {
        self.log_responses = enabled;
        self
    }
}

/// Lambda runtime for an [`Adapter`].
///
/// Decodes each invocation into the adapter's event type, puts the Lambda
/// invocation context into the carrier and returns the adapter's output to
/// the platform.
pub struct LambdaRuntime<A> {
    adapter: Arc<A>,
    config: LambdaConfig,
}

impl<A: Adapter> LambdaRuntime<A> {
    /// Create a new Lambda runtime.
    pub fn new(adapter: A) -> Self {
        Self {
            adapter: Arc::new(adapter),
            config: LambdaConfig::default(),
        }
    }

    /// Set the runtime configuration.
    pub fn with_config(mut self, config: LambdaConfig) -> Self {
        self.config = config;
        self
    }

    /// Run the Lambda runtime.
    ///
    /// This function never returns under normal operation.
    pub async fn run(self) -> Result<()> {
        info!("Starting lamina Lambda runtime");

        let adapter = self.adapter.clone();
        let config = self.config.clone();

        lambda_runtime::run(service_fn(move |event: LambdaEvent<A::Event>| {
            let adapter = adapter.clone();
            let config = config.clone();
            async move { handle_event(adapter.as_ref(), &config, event).await }
        }))
        .await?;

        Ok(())
    }
}

/// Handle one Lambda invocation.
async fn handle_event<A: Adapter>(
    adapter: &A,
    config: &LambdaConfig,
    event: LambdaEvent<A::Event>,
) -> std::result::Result<A::Output, BoxError> {
    let LambdaEvent { payload, context } = event;

    if config.log_invocations {
        debug!(
            request_id = %context.request_id,
            deadline = context.deadline,
            "Handling Lambda invocation"
        );
    }

    let result = adapter.invoke(Carrier::new().with(context), payload).await;

    if config.log_responses {
        match &result {
            Ok(_) => debug!("Lambda invocation succeeded"),
            Err(err) => debug!(error = %err, "Lambda invocation failed"),
        }
    }

    result
}

/// The Lambda invocation context (request ID, deadline, function ARN) of
/// the current invocation, when running under [`LambdaRuntime`].
pub fn invocation_context(carrier: &Carrier) -> Option<&lambda_runtime::Context> {
    carrier.get::<lambda_runtime::Context>()
}

/// Run a handler for a fire-and-forget source (SQS, SNS, S3, DynamoDB,
/// CloudWatch Events).
pub async fn run<S>(handler: Handler<Context<S>>) -> Result<()>
where
    S: Source<Reply = ()>,
{
    LambdaRuntime::new(handler).run().await
}

/// Run an API Gateway proxy handler.
pub async fn run_api_gateway(
    handler: Handler<ApiGatewayContext>,
    config: ApiGatewayConfig,
) -> Result<()> {
    LambdaRuntime::new(handler.into_api_gateway(config)).run().await
}

/// Run a generic JSON handler.
pub async fn run_generic(handler: Handler<GenericContext>) -> Result<()> {
    LambdaRuntime::new(handler.into_generic()).run().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use lamina_core::source::{Sqs, SqsEvent};
    use lamina_core::source::ApiGatewayProxyRequest;
    use lamina_core::GenericHandler;
    use serde_json::json;
    use serde_json::value::RawValue;

    fn lambda_context(request_id: &str) -> lambda_runtime::Context {
        let mut context = lambda_runtime::Context::default();
        context.request_id = request_id.to_string();
        context
    }

    #[test]
    fn test_config_builder() {
        let config = LambdaConfig::default()
            .log_invocations(false)
            .log_responses(true);

        assert!(!config.log_invocations);
        assert!(config.log_responses);
    }

    #[tokio::test]
    async fn test_invocation_context_in_carrier() {
        let handler = Handler::from_fn(|ctx: &mut Context<Sqs>| {
            let request_id = invocation_context(&ctx.carrier)
                .map(|c| c.request_id.clone())
                .unwrap_or_default();
            if request_id != "req-1" {
                return Err(format!("unexpected request id '{request_id}'").into());
            }
            Ok(())
        });
        let event: SqsEvent = serde_json::from_value(json!({"Records": [{"body": "{}"}]})).unwrap();

        handle_event(
            &handler,
            &LambdaConfig::default().log_responses(true),
            LambdaEvent::new(event, lambda_context("req-1")),
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_generic_output_returned() {
        let adapter = GenericHandler::new(Handler::from_fn(|ctx: &mut GenericContext| {
            ctx.respond(&json!({"ok": true}))
        }));

        let out = handle_event(
            &adapter,
            &LambdaConfig::default(),
            LambdaEvent::new(RawValue::from_string("{}".to_string()).unwrap(), lambda_context("req-2")),
        )
        .await
        .unwrap();

        assert_eq!(out, json!({"ok": true}));
    }

    #[tokio::test]
    async fn test_api_gateway_errors_become_responses() {
        let adapter = Handler::from_fn(|_: &mut ApiGatewayContext| Err("nope".into()))
            .into_api_gateway(ApiGatewayConfig::default());

        let res = handle_event(
            &adapter,
            &LambdaConfig::default(),
            LambdaEvent::new(ApiGatewayProxyRequest::default(), lambda_context("req-3")),
        )
        .await
        .unwrap();

        assert_eq!(res.status_code, 500);
    }

    #[test]
    fn test_invocation_context_missing() {
        assert!(invocation_context(&Carrier::new()).is_none());
    }
}
