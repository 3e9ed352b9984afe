//! Correlation identifiers carried through an invocation.

use crate::Carrier;
use uuid::Uuid;

#[derive(Debug, Clone)]
struct CorrelationId(String);

/// Return a carrier equal to `carrier` with its correlation ID set to `id`.
pub fn with_correlation_id(carrier: &Carrier, id: impl Into<String>) -> Carrier {
    carrier.with(CorrelationId(id.into()))
}

/// Correlation ID stored on the carrier.
///
/// Returns an empty string when there is no carrier or no ID was set; a
/// missing ID is not an error.
///
/// ```rust
/// use lamina_log::{Carrier, correlation_id};
///
/// assert_eq!(correlation_id(None), "");
/// assert_eq!(correlation_id(&Carrier::new()), "");
/// ```
pub fn correlation_id<'a>(carrier: impl Into<Option<&'a Carrier>>) -> String {
    carrier
        .into()
        .and_then(|c| c.get::<CorrelationId>())
        .map(|id| id.0.clone())
        .unwrap_or_default()
}

/// Generate a fresh correlation ID (UUID v4, 36 characters).
pub fn new_correlation_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_correlation_id() {
        let carrier = with_correlation_id(&Carrier::new(), "my-id");
        assert_eq!(correlation_id(&carrier), "my-id");
    }

    #[test]
    fn test_correlation_id_missing() {
        assert_eq!(correlation_id(None), "");
        assert_eq!(correlation_id(&Carrier::new()), "");
        assert_eq!(correlation_id(&Carrier::new().with(7u32)), "");
    }

    #[test]
    fn test_with_correlation_id_keeps_input() {
        let first = with_correlation_id(&Carrier::new(), "first");
        let second = with_correlation_id(&first, "second");

        assert_eq!(correlation_id(&first), "first");
        assert_eq!(correlation_id(&second), "second");
    }

    #[test]
    fn test_new_correlation_id() {
        let id = new_correlation_id();
        assert_eq!(id.len(), 36);
        assert_ne!(id, new_correlation_id());
    }
}
