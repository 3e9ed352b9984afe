//! Turning composed handlers into platform entry points.

use crate::context::{Context, Source};
use crate::error::{BoxError, HandlerResult};
use crate::handler::Handler;
use async_trait::async_trait;
use lamina_log::Carrier;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};

/// Something the Lambda runtime can invoke with a decoded event.
///
/// Implemented for plain handlers of fire-and-forget sources, for
/// [`ApiGatewayHandler`](crate::ApiGatewayHandler) and for
/// [`GenericHandler`](crate::GenericHandler).
#[async_trait]
pub trait Adapter: Send + Sync + 'static {
    /// Event decoded from the invocation payload.
    type Event: DeserializeOwned + Send + 'static;
    /// Value returned to the platform.
    type Output: Serialize + Send + 'static;

    /// Handle one invocation. `carrier` holds values from the runtime, such
    /// as the Lambda invocation context.
    async fn invoke(&self, carrier: Carrier, event: Self::Event) -> Result<Self::Output, BoxError>;
}

impl<S> Handler<Context<S>>
where
    S: Source<Reply = ()>,
{
    /// Run the handler once per record, in order.
    ///
    /// Stops at the first failing record and returns its error unchanged;
    /// later records are not processed.
    pub async fn dispatch(&self, carrier: &Carrier, event: S::Event) -> HandlerResult {
        let records = S::records(event);
        trace!(source = S::KIND, records = records.len(), "Dispatching event");

        for (index, record) in records.into_iter().enumerate() {
            let mut ctx = Context::<S>::new(carrier.clone(), record);
            if let Err(err) = self.call(&mut ctx).await {
                debug!(source = S::KIND, index, error = %err, "Record failed, aborting batch");
                return Err(err);
            }
        }

        Ok(())
    }
}

#[async_trait]
impl<S> Adapter for Handler<Context<S>>
where
    S: Source<Reply = ()>,
{
    type Event = S::Event;
    type Output = ();

    async fn invoke(&self, carrier: Carrier, event: S::Event) -> Result<(), BoxError> {
        self.dispatch(&carrier, event).await
    }
}
