//! Standard middleware.
//!
//! Correlation ID and logger middleware work with every source; put the
//! correlation middleware first so the logger sees the ID:
//!
//! ```rust
//! use lamina_core::source::{Sqs, SqsContext};
//! use lamina_core::{Handler, middleware};
//! use lamina_log::Sink;
//!
//! let handler = Handler::from_fn(|ctx: &mut SqsContext| {
//!     if let Some(logger) = ctx.logger() {
//!         logger.info().msg("handled");
//!     }
//!     Ok(())
//! })
//! .with_middleware([
//!     middleware::correlation_id::<Sqs>(),
//!     middleware::logger::<Sqs>(Sink::stdout(), [("service", "orders")]),
//! ]);
//! # let _ = handler;
//! ```

mod correlation;
mod error;
mod logger;

pub use correlation::correlation_id;
pub use error::error_handler;
pub use logger::{logger, logger_with_config};
