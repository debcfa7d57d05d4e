//! Content hashing for drift detection and archive integrity

use sha2::{Digest, Sha256};

/// Compute the hex-encoded SHA-256 digest of a byte slice.
///
/// Deterministic and pure; the same bytes always produce the same digest.
/// Used uniformly for tracked-file drift detection, archive integrity
/// checks, and config snapshot fingerprints.
pub fn hash_bytes(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    hex::encode(hasher.finalize())
}
