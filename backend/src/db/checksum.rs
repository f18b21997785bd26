//! SHA-256 digests for values that must never be stored in the clear.

use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 of `content`.
///
/// Login tokens are persisted only as this digest; a lookup hashes the
/// presented token and searches by the result.
pub fn sha256_hex(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}
