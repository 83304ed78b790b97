//! CSPRNG seam.
//!
//! Randomness is injected through `rand::RngCore` rather than read from
//! a process-wide global, so tests can substitute a seeded generator.

use rand::RngCore;
use rand::rngs::OsRng;

/// Draw `len` cryptographically random bytes from the OS source.
///
/// This is the production entry point; call sites that need
/// determinism in tests take an `Rng` parameter directly instead of
/// calling this function.
#[must_use]
pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    OsRng.fill_bytes(&mut bytes);
    bytes
}
