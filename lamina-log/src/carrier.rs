//! Copy-on-write value carrier for one invocation.
//!
//! A [`Carrier`] stores typed values keyed by `TypeId`. It is never mutated in
//! place: [`Carrier::with`] returns a new carrier that shares every existing
//! entry with the original. Middleware replace the context's carrier with the
//! extended one, so layers further in see the addition while any copy an
//! outer layer kept stays as it was.
//!
//! # Example
//!
//! ```rust
//! use lamina_log::Carrier;
//!
//! let base = Carrier::new().with(42i32);
//! let extended = base.with("hello".to_string());
//!
//! assert_eq!(extended.get::<i32>(), Some(&42));
//! assert_eq!(extended.get::<String>(), Some(&"hello".to_string()));
//! assert_eq!(base.get::<String>(), None);
//! ```

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

/// Immutable typed value map.
#[derive(Clone, Default)]
pub struct Carrier {
    map: Arc<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
}

impl Carrier {
    /// Create an empty carrier.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a new carrier equal to this one with `value` set.
    ///
    /// If a value of this type already exists, the new carrier holds the
    /// replacement; `self` is left untouched.
    pub fn with<T: Send + Sync + 'static>(&self, value: T) -> Self {
        let mut map = HashMap::with_capacity(self.map.len() + 1);
        map.extend(self.map.iter().map(|(k, v)| (*k, Arc::clone(v))));
        map.insert(TypeId::of::<T>(), Arc::new(value) as Arc<dyn Any + Send + Sync>);
        Self { map: Arc::new(map) }
    }

    /// Get a reference to a typed value.
    #[inline]
    pub fn get<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.map
            .get(&TypeId::of::<T>())
            .and_then(|value| value.downcast_ref::<T>())
    }

    /// Check if a value of this type exists.
    #[inline]
    pub fn contains<T: Send + Sync + 'static>(&self) -> bool {
        self.map.contains_key(&TypeId::of::<T>())
    }

    /// Number of stored values.
    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Check if nothing is stored.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl std::fmt::Debug for Carrier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Carrier")
            .field("count", &self.map.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_and_get() {
        let carrier = Carrier::new().with(42i32).with("hello".to_string());

        assert_eq!(carrier.get::<i32>(), Some(&42));
        assert_eq!(carrier.get::<String>(), Some(&"hello".to_string()));
        assert_eq!(carrier.get::<f64>(), None);
        assert_eq!(carrier.len(), 2);
    }

    #[test]
    fn test_with_does_not_mutate_original() {
        let original = Carrier::new().with(1u8);
        let replaced = original.with(2u8);

        assert_eq!(original.get::<u8>(), Some(&1));
        assert_eq!(replaced.get::<u8>(), Some(&2));
    }

    #[test]
    fn test_empty() {
        let carrier = Carrier::new();

        assert!(carrier.is_empty());
        assert!(!carrier.contains::<i32>());
        assert!(carrier.with(0i32).contains::<i32>());
    }
}
