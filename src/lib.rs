// Lamina - Per-event-source handlers and middleware for AWS Lambda
//
// This library wraps each Lambda trigger in a typed context, runs handlers
// inside ordered middleware chains and translates their outcome into what
// the trigger expects.

// Re-export core functionality
pub use lamina_core::*;

// Structured per-invocation logging
pub use lamina_log as log;

// Lambda runtime entry points
#[cfg(feature = "lambda")]
pub use lamina_lambda as lambda;

#[cfg(feature = "lambda")]
pub use lamina_lambda::{HttpBridge, init_tracing, run, run_api_gateway, run_generic};

// Prelude for common imports
pub mod prelude {
    pub use lamina_core::prelude::*;
    pub use lamina_log::{Logger, Sink};

    #[cfg(feature = "lambda")]
    pub use lamina_lambda::{HttpBridge, LambdaError, run, run_api_gateway, run_generic};
}
