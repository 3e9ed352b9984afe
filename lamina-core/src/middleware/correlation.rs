use crate::context::{Context, Source};
use crate::handler::{Handler, Middleware};
use lamina_log::{new_correlation_id, with_correlation_id};

/// Attach a correlation ID to every record.
///
/// Uses the ID carried by the record when there is a non-empty one
/// (`Correlation-Id` header, `correlation_id` message attribute, CloudWatch
/// event ID), otherwise generates a new one. API Gateway responses echo the
/// ID in the `Correlation-Id` header.
pub fn correlation_id<S: Source>() -> Middleware<Context<S>> {
    Middleware::from_fn(|ctx: &mut Context<S>, next: Handler<Context<S>>| {
        let id = S::correlation_id(ctx.record())
            .filter(|id| !id.is_empty())
            .unwrap_or_else(new_correlation_id);

        ctx.carrier = with_correlation_id(&ctx.carrier, id.as_str());
        S::echo_correlation_id(ctx.reply_mut(), &id);

        Box::pin(async move { next.call(ctx).await })
    })
}
