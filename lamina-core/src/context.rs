//! Per-record handler context.

use crate::bind::{Payload, Validate};
use crate::error::BoxError;
use lamina_log::{Carrier, Logger};
use serde::de::DeserializeOwned;

/// An event source: how one platform event becomes contexts.
///
/// Sources are zero-sized marker types. Each one names its event envelope,
/// the record a single context is built around and the reply written back
/// to the platform (`()` when the platform expects none).
pub trait Source: Sized + Send + Sync + 'static {
    /// Event delivered by the platform.
    type Event: DeserializeOwned + Send + 'static;
    /// Unit of work handed to one handler run.
    type Record: Send + Sync + 'static;
    /// Outbound slot filled by handlers.
    type Reply: Default + Send + 'static;

    /// Value of the `handler_type` log field.
    const KIND: &'static str;
    /// Human readable name used in error logs.
    const LABEL: &'static str;

    /// Split an event into records, in delivery order.
    fn records(event: Self::Event) -> Vec<Self::Record>;

    /// Correlation ID carried by the record, if any.
    fn correlation_id(_record: &Self::Record) -> Option<String> {
        None
    }

    /// Propagate the correlation ID to the reply.
    fn echo_correlation_id(_reply: &mut Self::Reply, _id: &str) {}

    /// Source specific fields for the per-record logger.
    fn log_fields(_record: &Self::Record) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    /// Message logged when a record starts processing.
    fn describe(record: &Self::Record) -> String;
}

/// A source whose records carry a single JSON payload.
pub trait JsonPayload: Source {
    fn payload(record: &Self::Record) -> Payload<'_>;
}

/// Handler context for one record of source `S`.
///
/// The record is read-only. The reply is write-only: source specific
/// methods set it and only the adapter reads it back, once the whole chain
/// has returned.
pub struct Context<S: Source> {
    /// Values attached by middleware (correlation ID, logger, invocation
    /// context). Replace it with an extended copy to add a value.
    pub carrier: Carrier,
    record: S::Record,
    reply: S::Reply,
}

impl<S: Source> Context<S> {
    pub fn new(carrier: Carrier, record: S::Record) -> Self {
        Self {
            carrier,
            record,
            reply: S::Reply::default(),
        }
    }

    /// The inbound record.
    #[inline]
    pub fn record(&self) -> &S::Record {
        &self.record
    }

    /// Correlation ID on the carrier, empty if none was attached.
    pub fn correlation_id(&self) -> String {
        lamina_log::correlation_id(&self.carrier)
    }

    /// Logger on the carrier, if the logger middleware ran.
    pub fn logger(&self) -> Option<Logger> {
        lamina_log::logger(&self.carrier)
    }

    #[inline]
    pub(crate) fn reply_mut(&mut self) -> &mut S::Reply {
        &mut self.reply
    }

    /// Consume the context, yielding whatever was written to the reply.
    pub fn into_reply(self) -> S::Reply {
        self.reply
    }
}

impl<S: JsonPayload> Context<S> {
    /// Decode the record's payload, then validate it.
    pub fn bind<T: DeserializeOwned + Validate>(&self) -> Result<T, BoxError> {
        S::payload(&self.record).bind()
    }
}

impl<S: Source> std::fmt::Debug for Context<S>
where
    S::Record: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("carrier", &self.carrier)
            .field("record", &self.record)
            .finish_non_exhaustive()
    }
}
