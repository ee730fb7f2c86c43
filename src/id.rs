//! Run identifier generation.
//!
//! Identifiers are embedded in archive file names and only need to be
//! collision-resistant within a day, but they are drawn from the OS entropy
//! source so a transient entropy failure surfaces as an error instead of a
//! silent fall back to a weaker generator.

use rand::rngs::OsRng;
use rand::RngCore;

use crate::error::{BackupError, Result};

const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

// Largest multiple of the alphabet size below 256. Bytes at or above this are
// redrawn so every character stays uniform.
const REJECT_AT: u8 = 252;

/// Generate a `length`-character identifier over `A-Z0-9`.
pub fn generate_id(length: usize) -> Result<String> {
    let mut id = String::with_capacity(length);
    let mut buf = [0u8; 32];
    while id.len() < length {
        OsRng
            .try_fill_bytes(&mut buf)
            .map_err(BackupError::RandomSource)?;
        for &byte in &buf {
            if id.len() == length {
                break;
            }
            if byte < REJECT_AT {
                id.push(ALPHABET[(byte % ALPHABET.len() as u8) as usize] as char);
            }
        }
    }
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn generated_ids_have_requested_length_and_alphabet() {
        for length in [0, 1, 6, 32] {
            let id = generate_id(length).unwrap();
            assert_eq!(id.len(), length);
            assert!(id.bytes().all(|b| ALPHABET.contains(&b)));
        }
    }

    #[test]
    fn generated_ids_are_collision_resistant() {
        let mut seen = HashSet::new();
        for _ in 0..10_000 {
            seen.insert(generate_id(6).unwrap());
        }
        // 36^6 is ~2.2 billion, so the expected number of birthday collisions
        // in 10k draws is ~0.02. More than a couple means a broken generator.
        assert!(seen.len() >= 9_998, "got {} unique ids", seen.len());
    }
}
