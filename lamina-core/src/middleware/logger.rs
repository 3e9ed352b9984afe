use crate::context::{Context, Source};
use crate::handler::{Handler, Middleware};
use lamina_log::{LogConfig, Logger, Sink, with_logger};
use std::sync::Arc;

/// Attach a structured logger to every record and log its processing.
///
/// Each line carries `fields`, `handler_type`, `correlation_id` and the
/// source's own fields (queue ARN, topic ARN, request method and so on).
/// One info line is written when a record starts and one error line if the
/// chain fails; the error itself is returned unchanged.
pub fn logger<S: Source>(
    sink: Sink,
    fields: impl IntoIterator<Item = (impl Into<String>, impl Into<String>)>,
) -> Middleware<Context<S>> {
    logger_with_config(sink, fields, lamina_log::config().clone())
}

/// [`logger`] with an explicit log configuration.
pub fn logger_with_config<S: Source>(
    sink: Sink,
    fields: impl IntoIterator<Item = (impl Into<String>, impl Into<String>)>,
    config: LogConfig,
) -> Middleware<Context<S>> {
    let fields: Arc<Vec<(String, String)>> = Arc::new(
        fields
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect(),
    );

    Middleware::from_fn(move |ctx: &mut Context<S>, next: Handler<Context<S>>| {
        let mut merged = fields.to_vec();
        merged.push(("handler_type".to_string(), S::KIND.to_string()));
        merged.push(("correlation_id".to_string(), ctx.correlation_id()));
        merged.extend(
            S::log_fields(ctx.record())
                .into_iter()
                .map(|(k, v)| (k.to_string(), v)),
        );

        let logger = Logger::with_config(sink.clone(), merged, config.clone());
        ctx.carrier = with_logger(&ctx.carrier, logger.clone());
        logger.info().msg(S::describe(ctx.record()));

        Box::pin(async move {
            let result = next.call(ctx).await;
            if let Err(err) = &result {
                logger
                    .error()
                    .msg(format!("Error processing {}: {}", S::LABEL, err));
            }
            result
        })
    })
}
