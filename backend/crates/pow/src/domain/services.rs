//! Domain Services
//!
//! Pure domain logic for PoW verification.

use platform::crypto::sha256;

/// Count leading zero bits in a SHA-256 hash
pub fn count_leading_zero_bits(hash: &[u8; 32]) -> u32 {
    let mut count = 0u32;
    for &byte in hash {
        if byte == 0 {
            count += 8;
        } else {
            count += byte.leading_zeros();
            break;
        }
    }
    count
}

/// Verify that a hash meets the difficulty requirement
pub fn verify_difficulty(hash: &[u8; 32], difficulty_bits: u8) -> bool {
    count_leading_zero_bits(hash) >= u32::from(difficulty_bits)
}

/// Compute SHA-256 of the concatenated challenge and solution hex strings.
///
/// The hash is taken over the ASCII of `challenge ‖ solution`, not the
/// decoded bytes, matching what clients compute while searching.
pub fn solution_hash(challenge: &str, solution: &str) -> [u8; 32] {
    let mut combined = String::with_capacity(challenge.len() + solution.len());
    combined.push_str(challenge);
    combined.push_str(solution);
    sha256(combined.as_bytes())
}
