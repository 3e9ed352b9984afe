//! # Lamina Lambda
//!
//! AWS Lambda entry points for lamina handlers.
//!
//! Each `run*` function starts the Lambda runtime loop with the adapter for
//! one event source. [`HttpBridge`] serves an API Gateway handler over plain
//! `http` types for local runs and tests.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use lamina_core::prelude::*;
//! use lamina_log::Sink;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), lamina_lambda::LambdaError> {
//!     // Initialize tracing for CloudWatch
//!     lamina_lambda::init_tracing();
//!
//!     let handler = Handler::from_fn(|ctx: &mut SqsContext| {
//!         let order: serde_json::Value = ctx.bind()?;
//!         println!("{order}");
//!         Ok(())
//!     })
//!     .with_middleware([
//!         middleware::correlation_id::<Sqs>(),
//!         middleware::logger::<Sqs>(Sink::stdout(), [("service", "orders")]),
//!     ]);
//!
//!     lamina_lambda::run(handler).await
//! }
//! ```
//!
//! ## Deployment
//!
//! ```bash
//! cargo lambda build --release
//! cargo lambda deploy
//! ```

mod bridge;
mod error;
mod runtime;

pub use bridge::{HttpBridge, to_http_response};
pub use error::{LambdaError, Result};
pub use runtime::{
    LambdaConfig, LambdaRuntime, invocation_context, run, run_api_gateway, run_generic,
};

pub use lambda_runtime;

/// Initialize tracing for Lambda/CloudWatch.
///
/// JSON lines filtered by `RUST_LOG`, defaulting to `info`.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    install(filter);
}

/// Initialize tracing with a custom filter directive.
pub fn init_tracing_with_level(level: &str) {
    install(tracing_subscriber::EnvFilter::new(level));
}

fn install(filter: tracing_subscriber::EnvFilter) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    // Ignore a subscriber installed earlier by the application.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().json().flatten_event(true))
        .try_init();
}
