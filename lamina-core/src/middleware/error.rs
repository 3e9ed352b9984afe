use crate::error::Error;
use crate::handler::{Handler, Middleware};
use crate::source::{ApiGatewayContext, write_error};

/// Convert any error from the rest of the chain into a JSON response.
///
/// Framework [`Error`]s keep their status and message; anything else is
/// reported as `500 {"message":"Internal server error"}`. The chain then
/// succeeds, so the adapter's own error handling never runs.
pub fn error_handler() -> Middleware<ApiGatewayContext> {
    Middleware::from_fn(|ctx: &mut ApiGatewayContext, next: Handler<ApiGatewayContext>| {
        Box::pin(async move {
            let result = next.call(ctx).await;
            if let Err(err) = result {
                write_error(ctx, &Error::classify(&err));
            }
            Ok(())
        })
    })
}
