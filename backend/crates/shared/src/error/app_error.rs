//! Application Error - Unified error type for the service
//!
//! Defines [`AppError`] struct and [`AppResult<T>`] type alias.

use std::borrow::Cow;
use std::error::Error;
use std::fmt;

use super::kind::ErrorKind;

/// Unified error type used by every crate in the workspace.
///
/// ## Fields
/// * `kind` - error classification, drives logging level and wire behavior
/// * `message` - operator-facing message
/// * `source` - original error (optional, for debugging)
///
/// ## Examples
/// ```rust
/// use kernel::error::{app_error::AppError, kind::ErrorKind};
///
/// let err = AppError::protocol_violation("expected HELLO");
/// assert_eq!(err.kind(), ErrorKind::ProtocolViolation);
/// ```
pub struct AppError {
    kind: ErrorKind,
    message: Cow<'static, str>,
    source: Option<Box<dyn Error + Send + Sync + 'static>>,
}

/// Shorthand for `Result<T, AppError>`.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    // ========================================================================
    // Constructors
    // ========================================================================

    #[inline]
    pub fn new(kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    // ========================================================================
    // Convenience constructors
    // ========================================================================

    /// Malformed or out-of-sequence client input.
    #[inline]
    pub fn protocol_violation(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::ProtocolViolation, message)
    }

    /// Secure randomness was unavailable.
    #[inline]
    pub fn generation_failure(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::GenerationFailure, message)
    }

    /// A deadline was exceeded.
    #[inline]
    pub fn timeout(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Timeout, message)
    }

    // ========================================================================
    // Builder methods
    // ========================================================================

    /// Attach the original error for debugging.
    #[inline]
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether this error should be logged at error level.
    #[inline]
    pub fn is_operational(&self) -> bool {
        self.kind.is_operational()
    }
}

impl fmt::Debug for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut builder = f.debug_struct("AppError");
        builder.field("kind", &self.kind);
        builder.field("message", &self.message);
        if let Some(source) = &self.source {
            builder.field("source", source);
        }
        builder.finish()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn Error + 'static))
    }
}

// ============================================================================
// Result extension traits
// ============================================================================

/// Extension trait converting `Result<T, E>` into `AppResult<T>`.
pub trait ResultExt<T, E> {
    /// Wrap the error with the given kind and message.
    fn map_app_err(self, kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> AppResult<T>
    where
        E: Error + Send + Sync + 'static;
}

impl<T, E> ResultExt<T, E> for Result<T, E> {
    fn map_app_err(self, kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> AppResult<T>
    where
        E: Error + Send + Sync + 'static,
    {
        self.map_err(|e| AppError::new(kind, message).with_source(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_error() {
        let err = AppError::new(ErrorKind::Timeout, "deadline exceeded");
        assert_eq!(err.kind(), ErrorKind::Timeout);
        assert_eq!(err.message(), "deadline exceeded");
        assert!(err.source().is_none());
    }

    #[test]
    fn test_convenience_constructors() {
        assert_eq!(
            AppError::protocol_violation("x").kind(),
            ErrorKind::ProtocolViolation
        );
        assert_eq!(
            AppError::generation_failure("x").kind(),
            ErrorKind::GenerationFailure
        );
        assert_eq!(AppError::timeout("x").kind(), ErrorKind::Timeout);
    }

    #[test]
    fn test_with_source() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = AppError::new(ErrorKind::Internal, "failed to read file").with_source(io_err);
        assert!(err.source().is_some());
    }

    #[test]
    fn test_display() {
        let err = AppError::timeout("exchange deadline exceeded");
        assert_eq!(err.to_string(), "[Timeout] exchange deadline exceeded");
    }

    #[test]
    fn test_is_operational() {
        assert!(!AppError::protocol_violation("x").is_operational());
        assert!(AppError::new(ErrorKind::Internal, "x").is_operational());
    }

    #[test]
    fn test_result_ext() {
        let result: Result<i32, std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "not found",
        ));
        let app_result = result.map_app_err(ErrorKind::Config, "missing quotes file");
        assert!(app_result.is_err());
        assert_eq!(app_result.unwrap_err().kind(), ErrorKind::Config);
    }
}
