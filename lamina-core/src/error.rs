// Error types shared by every lamina event source

use serde::Serialize;
use thiserror::Error;

/// Error currency of handlers and middleware.
///
/// Identical to `lambda_runtime::Error`, so handler errors can be returned
/// to the runtime unchanged.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Outcome of a handler or middleware.
pub type HandlerResult = Result<(), BoxError>;

/// Framework error with an HTTP status.
///
/// Returning this from an API Gateway handler selects the response status;
/// only `message` appears in the JSON body.
///
/// ```rust
/// use lamina_core::Error;
///
/// let err = Error::new(400, "name is required");
/// assert_eq!(err.to_string(), "status: 400, message: name is required");
/// assert_eq!(serde_json::to_string(&err).unwrap(), r#"{"message":"name is required"}"#);
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("status: {status_code}, message: {message}")]
pub struct Error {
    #[serde(skip)]
    pub status_code: u16,
    pub message: String,
}

impl Error {
    pub fn new(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            status_code,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(400, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(404, message)
    }

    /// The generic 500 used for any error that is not a framework error.
    pub fn internal() -> Self {
        Self::new(500, "Internal server error")
    }

    /// Map a handler error to the framework error reported to the caller.
    ///
    /// Framework errors keep their status and message; anything else becomes
    /// [`Error::internal`] so internal details never reach the response.
    pub fn classify(err: &BoxError) -> Self {
        err.downcast_ref::<Error>()
            .cloned()
            .unwrap_or_else(Self::internal)
    }
}

/// Raw payload could not be decoded as JSON into the requested type.
///
/// Displays the decoder message unchanged.
#[derive(Error, Debug)]
#[error(transparent)]
pub struct DecodeError(#[from] serde_json::Error);

impl DecodeError {
    pub fn into_inner(self) -> serde_json::Error {
        self.0
    }
}
