//! Multipart boundary generation.
//!
//! A boundary is a run of dashes followed by four random 32-bit values in
//! hex. The randomness source is a parameter so callers can pin the output.

use rand::RngCore;
use std::fmt::Write;

/// Literal prefix that makes the token recognizable in captured traffic
const BOUNDARY_PREFIX: &str = "---------------------------";

/// Number of random 32-bit words appended to the prefix
const RANDOM_WORDS: usize = 4;

/// Total length of a generated boundary (prefix + 8 hex digits per word)
pub const BOUNDARY_LENGTH: usize = BOUNDARY_PREFIX.len() + RANDOM_WORDS * 8;

/// Generate a fresh boundary from the thread-local generator.
pub fn generate_boundary() -> String {
    generate_boundary_with(&mut rand::thread_rng())
}

/// Generate a boundary drawing its random words from `rng`.
pub fn generate_boundary_with<R: RngCore + ?Sized>(rng: &mut R) -> String {
    let mut boundary = String::with_capacity(BOUNDARY_LENGTH);
    boundary.push_str(BOUNDARY_PREFIX);
    for _ in 0..RANDOM_WORDS {
        // Writing into a String cannot fail
        let _ = write!(boundary, "{:08X}", rng.next_u32());
    }
    boundary
}
