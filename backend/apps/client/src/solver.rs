//! Solution Search
//!
//! Brute-force nonce search against the server's leading-zero-bit target.
//! The client hashes exactly what the server will hash, the ASCII
//! concatenation of the challenge and the candidate hex string.

use platform::crypto::{CryptoError, random_bytes, to_hex};
use pow::domain::services::{solution_hash, verify_difficulty};

pub struct Solver {
    difficulty_bits: u8,
}

impl Solver {
    pub fn new(difficulty_bits: u8) -> Self {
        Self { difficulty_bits }
    }

    /// Try random 8-byte nonces until one meets the target. Expected cost
    /// grows as 2^difficulty hashes.
    pub fn solve(&self, challenge: &str) -> Result<String, CryptoError> {
        let mut attempts = 0u64;
        loop {
            let candidate = to_hex(&random_bytes(8)?);
            attempts += 1;
            if verify_difficulty(&solution_hash(challenge, &candidate), self.difficulty_bits) {
                tracing::debug!(attempts, "solution found");
                return Ok(candidate);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solutions_satisfy_the_target() {
        let solver = Solver::new(4);
        let solution = solver.solve("aabbccdd").unwrap();
        assert!(verify_difficulty(
            &solution_hash("aabbccdd", &solution),
            4
        ));
    }

    #[test]
    fn test_zero_difficulty_accepts_the_first_nonce() {
        let solver = Solver::new(0);
        assert!(solver.solve("00").is_ok());
    }
}
