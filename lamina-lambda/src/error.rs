//! Lambda error types.

use thiserror::Error;

/// Result type for Lambda operations.
pub type Result<T> = std::result::Result<T, LambdaError>;

/// Lambda runtime errors.
#[derive(Debug, Error)]
pub enum LambdaError {
    /// Response conversion error.
    #[error("Response conversion error: {0}")]
    Response(String),

    /// Lambda runtime error.
    #[error("Lambda runtime error: {0}")]
    Runtime(String),
}

impl From<lambda_runtime::Error> for LambdaError {
    fn from(err: lambda_runtime::Error) -> Self {
        Self::Runtime(err.to_string())
    }
}

impl From<http::Error> for LambdaError {
    fn from(err: http::Error) -> Self {
        Self::Response(err.to_string())
    }
}
