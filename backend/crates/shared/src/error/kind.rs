//! Error Kind - Classification of errors
//!
//! Defines the [`ErrorKind`] enum covering every way a connection or the
//! process can fail.

use serde::Serialize;

/// Error classification used across the service.
///
/// Each variant carries the observable behavior a failure of that class has
/// on the wire: most client-caused failures close the connection without a
/// response line, while operational failures are logged at error level.
///
/// ## Notes
/// * `non_exhaustive` - more variants may be added later
///
/// ## Examples
/// ```rust
/// use kernel::error::kind::ErrorKind;
///
/// let kind = ErrorKind::ProtocolViolation;
/// assert!(kind.closes_silently());
/// assert!(!kind.is_operational());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum ErrorKind {
    /// Malformed or out-of-sequence client input
    ProtocolViolation,
    /// Rejected by rate limiting, blacklist, or global capacity
    AdmissionDenied,
    /// Secure randomness unavailable while minting a challenge
    GenerationFailure,
    /// A read/write deadline was exceeded
    Timeout,
    /// A (challenge, solution) pair was submitted again
    ReplayAttempt,
    /// Invalid or inconsistent configuration
    Config,
    /// Socket or file I/O failed
    Io,
    /// Anything that should not happen
    Internal,
}

impl ErrorKind {
    /// Human-readable name of the classification.
    ///
    /// ## Examples
    /// ```rust
    /// use kernel::error::kind::ErrorKind;
    /// assert_eq!(ErrorKind::Timeout.as_str(), "Timeout");
    /// ```
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ProtocolViolation => "Protocol Violation",
            ErrorKind::AdmissionDenied => "Admission Denied",
            ErrorKind::GenerationFailure => "Generation Failure",
            ErrorKind::Timeout => "Timeout",
            ErrorKind::ReplayAttempt => "Replay Attempt",
            ErrorKind::Config => "Config",
            ErrorKind::Io => "I/O",
            ErrorKind::Internal => "Internal",
        }
    }

    /// Whether a failure of this kind closes the connection with no
    /// response line at all.
    #[inline]
    pub const fn closes_silently(&self) -> bool {
        matches!(
            self,
            ErrorKind::ProtocolViolation | ErrorKind::AdmissionDenied | ErrorKind::Timeout
        )
    }

    /// Whether this kind indicates a server-side operational problem.
    ///
    /// Operational failures should be logged at error level; everything
    /// else is ordinary client misbehavior.
    #[inline]
    pub const fn is_operational(&self) -> bool {
        matches!(
            self,
            ErrorKind::GenerationFailure
                | ErrorKind::Config
                | ErrorKind::Io
                | ErrorKind::Internal
        )
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
