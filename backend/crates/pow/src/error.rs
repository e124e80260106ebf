//! PoW Error Types
//!
//! Engine-specific error variants that integrate with the unified
//! `kernel::error::AppError` system.

use kernel::error::app_error::AppError;
use thiserror::Error;

/// PoW-specific result type alias
pub type PowResult<T> = Result<T, PowError>;

/// PoW-specific error variants
///
/// Malformed solutions and failed difficulty checks are ordinary
/// rejections (`verify_solution` returns `false`), not errors. The only
/// operational failure is randomness exhaustion while minting a challenge.
#[derive(Debug, Error)]
pub enum PowError {
    /// Secure randomness unavailable while generating a challenge
    #[error("failed to generate challenge: {0}")]
    ChallengeGeneration(#[from] platform::crypto::CryptoError),
}

impl From<PowError> for AppError {
    fn from(err: PowError) -> Self {
        match err {
            PowError::ChallengeGeneration(source) => {
                AppError::generation_failure("failed to generate challenge").with_source(source)
            }
        }
    }
}
