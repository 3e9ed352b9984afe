//! JSON binding with validation.
//!
//! Binding decodes a raw payload into a caller-chosen type, then runs the
//! type's [`Validate`] check. Validation only runs after a successful decode
//! and its error is returned unchanged. Types without rules opt in with an
//! empty impl.
//!
//! ```rust
//! use lamina_core::{BoxError, Validate, bind};
//! use serde::Deserialize;
//!
//! #[derive(Debug, Deserialize)]
//! struct Greeting {
//!     name: String,
//! }
//!
//! impl Validate for Greeting {
//!     fn validate(&self) -> Result<(), BoxError> {
//!         if self.name.is_empty() {
//!             return Err("name is required".into());
//!         }
//!         Ok(())
//!     }
//! }
//!
//! #[derive(Deserialize)]
//! struct Ping {
//!     count: u32,
//! }
//!
//! impl Validate for Ping {}
//!
//! let err = bind::<Greeting>(br#"{"name": ""}"#).unwrap_err();
//! assert_eq!(err.to_string(), "name is required");
//!
//! let ping: Ping = bind(br#"{"count": 3}"#).unwrap();
//! assert_eq!(ping.count, 3);
//! ```

use crate::error::{BoxError, DecodeError};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// Self-validation for bound types.
pub trait Validate {
    /// Check the decoded value. The error is returned to the caller as is.
    fn validate(&self) -> Result<(), BoxError> {
        Ok(())
    }
}

macro_rules! impl_validate {
    ($($ty:ty),* $(,)?) => {
        $(impl Validate for $ty {})*
    };
}

impl_validate!(
    Value, String, bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize,
    f32, f64, (),
);

impl<T: Validate> Validate for Option<T> {
    fn validate(&self) -> Result<(), BoxError> {
        self.as_ref().map_or(Ok(()), Validate::validate)
    }
}

impl<T: Validate> Validate for Vec<T> {
    fn validate(&self) -> Result<(), BoxError> {
        self.iter().try_for_each(Validate::validate)
    }
}

impl<K, V: Validate, S> Validate for HashMap<K, V, S> {
    fn validate(&self) -> Result<(), BoxError> {
        self.values().try_for_each(Validate::validate)
    }
}

impl<K, V: Validate> Validate for BTreeMap<K, V> {
    fn validate(&self) -> Result<(), BoxError> {
        self.values().try_for_each(Validate::validate)
    }
}

/// Decode JSON bytes.
pub fn decode<T: DeserializeOwned>(raw: &[u8]) -> Result<T, BoxError> {
    Ok(serde_json::from_slice(raw).map_err(DecodeError::from)?)
}

/// Decode an already parsed JSON value.
pub fn decode_value<T: DeserializeOwned>(value: &Value) -> Result<T, BoxError> {
    Ok(T::deserialize(value).map_err(DecodeError::from)?)
}

/// Decode `raw` into `T`, then validate it.
pub fn bind<T: DeserializeOwned + Validate>(raw: &[u8]) -> Result<T, BoxError> {
    validated(decode(raw)?)
}

/// Decode an already parsed value into `T`, then validate it.
pub fn bind_value<T: DeserializeOwned + Validate>(value: &Value) -> Result<T, BoxError> {
    validated(decode_value(value)?)
}

fn validated<T: Validate>(value: T) -> Result<T, BoxError> {
    value.validate()?;
    Ok(value)
}

/// Raw payload an event source exposes for binding.
#[derive(Debug, Clone, Copy)]
pub enum Payload<'a> {
    /// JSON text (message bodies, request bodies, raw events)
    Bytes(&'a [u8]),
    /// Already parsed JSON (CloudWatch `detail`, flattened DynamoDB images)
    Value(&'a Value),
}

impl Payload<'_> {
    pub fn bind<T: DeserializeOwned + Validate>(&self) -> Result<T, BoxError> {
        match self {
            Payload::Bytes(raw) => bind(raw),
            Payload::Value(value) => bind_value(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static VALIDATIONS: AtomicUsize = AtomicUsize::new(0);

    #[derive(Debug, Deserialize, PartialEq)]
    struct Animal {
        name: String,
        legs: u8,
    }

    #[derive(Debug, Deserialize)]
    struct Counted {}

    impl Validate for Counted {
        fn validate(&self) -> Result<(), BoxError> {
            VALIDATIONS.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    impl Validate for Animal {
        fn validate(&self) -> Result<(), BoxError> {
            if self.legs > 8 {
                return Err(crate::Error::bad_request("too many legs").into());
            }
            Ok(())
        }
    }

    #[test]
    fn test_bind_success() {
        let animal: Animal = bind(br#"{"name": "cat", "legs": 4}"#).unwrap();
        assert_eq!(
            animal,
            Animal {
                name: "cat".to_string(),
                legs: 4
            }
        );
    }

    #[test]
    fn test_bind_error_is_decoder_message() {
        let raw = br#"{"name": "cat", "legs": "four"}"#;
        let expected = serde_json::from_slice::<Animal>(raw).unwrap_err().to_string();

        let err = bind::<Animal>(raw).unwrap_err();

        assert_eq!(err.to_string(), expected);
        assert!(err.downcast_ref::<DecodeError>().is_some());
    }

    #[test]
    fn test_bind_truncated_json() {
        let raw = br#"{"messag"#;
        let expected = serde_json::from_slice::<Animal>(raw).unwrap_err().to_string();

        let err = bind::<Animal>(raw).unwrap_err();

        assert_eq!(err.to_string(), expected);
        assert!(err.to_string().starts_with("EOF while parsing"));
        assert!(err.to_string().ends_with("at line 1 column 8"));
        assert!(err.downcast_ref::<DecodeError>().is_some());
    }

    #[test]
    fn test_bind_returns_validation_error_unchanged() {
        let err = bind::<Animal>(br#"{"name": "centipede", "legs": 100}"#).unwrap_err();

        let err = err.downcast_ref::<crate::Error>().unwrap();
        assert_eq!(err.status_code, 400);
        assert_eq!(err.message, "too many legs");
    }

    #[test]
    fn test_bind_skips_validation_on_decode_error() {
        let err = bind::<Counted>(b"not json").unwrap_err();

        assert!(err.downcast_ref::<DecodeError>().is_some());
        assert_eq!(VALIDATIONS.load(Ordering::SeqCst), 0);

        bind::<Counted>(b"{}").unwrap();
        assert_eq!(VALIDATIONS.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_payload_value() {
        let value = serde_json::json!({"name": "spider", "legs": 8});

        let animal: Animal = Payload::Value(&value).bind().unwrap();
        assert_eq!(animal.legs, 8);

        let value = serde_json::json!({"name": "millipede", "legs": 100});
        let err = Payload::Value(&value).bind::<Animal>().unwrap_err();
        assert_eq!(err.to_string(), "status: 400, message: too many legs");
    }

    #[test]
    fn test_containers_validate_their_items() {
        let err = bind::<Vec<Animal>>(br#"[{"name": "cat", "legs": 4}, {"name": "x", "legs": 9}]"#)
            .unwrap_err();
        assert_eq!(err.to_string(), "status: 400, message: too many legs");

        let map: HashMap<String, Value> = bind(br#"{"a": 1}"#).unwrap();
        assert_eq!(map["a"], 1);
    }
}
