//! Generic JSON source, for triggers without a dedicated model.
//!
//! The event is kept as the JSON text the platform delivered, bound like any
//! other payload, and the handler may set a JSON value to return to the
//! caller.

use crate::bind::Payload;
use crate::context::{Context, JsonPayload, Source};
use crate::dispatch::Adapter;
use crate::error::{BoxError, HandlerResult};
use crate::handler::Handler;
use async_trait::async_trait;
use lamina_log::Carrier;
use serde::Serialize;
use serde_json::Value;
use serde_json::value::RawValue;

/// Generic source: any JSON in, optional JSON out.
pub struct Generic;

pub type GenericContext = Context<Generic>;

impl Source for Generic {
    type Event = Box<RawValue>;
    type Record = Vec<u8>;
    type Reply = Option<Value>;

    const KIND: &'static str = "generic";
    const LABEL: &'static str = "generic event";

    fn records(event: Self::Event) -> Vec<Self::Record> {
        vec![event.get().as_bytes().to_vec()]
    }

    fn describe(_record: &Self::Record) -> String {
        "Processing generic event".to_string()
    }
}

impl JsonPayload for Generic {
    fn payload(record: &Self::Record) -> Payload<'_> {
        Payload::Bytes(record)
    }
}

impl Context<Generic> {
    /// The raw event JSON.
    pub fn event(&self) -> &[u8] {
        self.record()
    }

    /// Set the value returned to the caller.
    pub fn respond<T: Serialize + ?Sized>(&mut self, value: &T) -> HandlerResult {
        *self.reply_mut() = Some(serde_json::to_value(value)?);
        Ok(())
    }
}

/// Generic entry point. Returns `null` when the handler did not respond.
#[derive(Clone, Debug)]
pub struct GenericHandler {
    handler: Handler<GenericContext>,
}

impl GenericHandler {
    pub fn new(handler: Handler<GenericContext>) -> Self {
        Self { handler }
    }

    pub async fn handle(&self, carrier: Carrier, event: Box<RawValue>) -> Result<Value, BoxError> {
        let mut records = Generic::records(event);
        let mut ctx = Context::<Generic>::new(carrier, records.pop().unwrap_or_default());

        self.handler.call(&mut ctx).await?;

        Ok(ctx.into_reply().unwrap_or(Value::Null))
    }
}

#[async_trait]
impl Adapter for GenericHandler {
    type Event = Box<RawValue>;
    type Output = Value;

    async fn invoke(&self, carrier: Carrier, event: Box<RawValue>) -> Result<Value, BoxError> {
        self.handle(carrier, event).await
    }
}

impl Handler<GenericContext> {
    /// Wrap this handler in a generic adapter.
    pub fn into_generic(self) -> GenericHandler {
        GenericHandler::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    fn raw(text: &str) -> Box<RawValue> {
        RawValue::from_string(text.to_string()).unwrap()
    }

    #[derive(Deserialize)]
    struct Ping {
        count: u32,
    }

    impl crate::Validate for Ping {}

    #[derive(Serialize)]
    struct Pong {
        count: u32,
        reply: &'static str,
    }

    #[tokio::test]
    async fn test_generic_round_trip() {
        let handler = Handler::from_fn(|ctx: &mut GenericContext| {
            let ping: Ping = ctx.bind()?;
            ctx.respond(&Pong {
                count: ping.count + 1,
                reply: "pong",
            })
        });

        let out = handler
            .into_generic()
            .handle(Carrier::new(), raw(r#"{"count": 1}"#))
            .await
            .unwrap();

        assert_eq!(out.to_string(), r#"{"count":2,"reply":"pong"}"#);
    }

    #[tokio::test]
    async fn test_generic_without_response() {
        let handler = Handler::from_fn(|ctx: &mut GenericContext| {
            assert_eq!(ctx.event(), br#""hello""#);
            Ok(())
        });

        let out = handler
            .into_generic()
            .invoke(Carrier::new(), raw(r#""hello""#))
            .await
            .unwrap();

        assert_eq!(out, Value::Null);
    }

    #[tokio::test]
    async fn test_generic_error() {
        let handler = Handler::from_fn(|ctx: &mut GenericContext| {
            let _: Ping = ctx.bind()?;
            Ok(())
        });

        let err = handler
            .into_generic()
            .handle(Carrier::new(), raw(r#"{"count": "many"}"#))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("invalid type"));
    }

    #[tokio::test]
    async fn test_event_bytes_are_kept_as_delivered() {
        let text = r#"{"z": 1, "a": 1, "z": 2, "big": 123456789012345678901234567890}"#;
        let handler = Handler::from_fn(move |ctx: &mut GenericContext| {
            assert_eq!(ctx.event(), text.as_bytes());
            Ok(())
        });

        let out = handler.into_generic().handle(Carrier::new(), raw(text)).await.unwrap();

        assert_eq!(out, Value::Null);
    }
}
