//! Salted password hashing.
//!
//! A credential is an HMAC-SHA-512 of the plaintext keyed with a fresh
//! per-user random salt, so identical passwords hash differently across
//! users and precomputed tables are useless. Verification recomputes the
//! keyed hash and compares over the full length in constant time.

use hmac::{Hmac, Mac};
use rand::{rngs::OsRng, RngCore};
use sha2::Sha512;

use super::error::AuthError;

type HmacSha512 = Hmac<Sha512>;

/// Salt size matches the HMAC-SHA-512 output size.
pub const SALT_LEN: usize = 64;

/// Derive a fresh (salt, hash) pair for a plaintext password.
///
/// The salt is never reused: every call draws new bytes from the OS random
/// source. The HMAC context is a local value, dropped on every exit path.
///
/// # Errors
///
/// Returns [`AuthError::EntropySource`] when the OS random source fails.
/// There is no recovery path; callers abort the operation.
pub fn derive(plaintext: &[u8]) -> Result<(Vec<u8>, Vec<u8>), AuthError> {
    let mut salt = vec![0u8; SALT_LEN];
    OsRng
        .try_fill_bytes(&mut salt)
        .map_err(|err| AuthError::EntropySource(err.into()))?;

    let hash = keyed_hash(&salt, plaintext)
        .ok_or_else(|| AuthError::EntropySource(anyhow::anyhow!("hmac rejected generated salt")))?;

    Ok((salt, hash))
}

/// Check a plaintext password against a stored (salt, hash) pair.
///
/// The comparison covers the full hash length regardless of where the first
/// mismatch sits, so response timing does not reveal matching prefixes. A
/// length mismatch is a non-match; no byte is read out of bounds.
#[must_use]
pub fn verify(plaintext: &[u8], salt: &[u8], expected_hash: &[u8]) -> bool {
    match keyed_hash(salt, plaintext) {
        Some(computed) => constant_time_eq(&computed, expected_hash),
        None => false,
    }
}

fn keyed_hash(salt: &[u8], plaintext: &[u8]) -> Option<Vec<u8>> {
    // HMAC accepts keys of any length; new_from_slice only fails for
    // fixed-key MACs.
    let Ok(mut mac) = HmacSha512::new_from_slice(salt) else {
        return None;
    };
    mac.update(plaintext);
    Some(mac.finalize().into_bytes().to_vec())
}

/// Full-length equality: XOR every byte pair and OR the differences
/// together, deciding only after the whole buffer has been read.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}
