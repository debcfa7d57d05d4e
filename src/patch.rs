//! # Patch Helpers
//!
//! Supporting pieces for converting a pristine tracked file into a patched
//! one: the compressed snapshot of the pre-modification content, the
//! literal text substitution, and the diagnostic diff written to the patch
//! sibling.
//!
//! The snapshot is gzip-compressed and base64-encoded so it can live
//! inside the JSON state document; it is the only copy of the original
//! remote bytes once the working file has been modified, and is what
//! `raw_remote_content` recovers without re-fetching.
//!
//! The diff is a reproducible before/after block, deliberately not a
//! minimal line diff. It exists for human inspection of what a patch did,
//! not for mechanical re-application.

use std::io::{Read, Write};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::error::{Error, Result};

/// Compress and encode content for embedding in the state document.
pub fn encode_snapshot(content: &[u8]) -> Result<String> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(content)?;
    let compressed = encoder.finish()?;
    Ok(BASE64.encode(compressed))
}

/// Decode and decompress a snapshot back into the original bytes.
pub fn decode_snapshot(encoded: &str) -> Result<Vec<u8>> {
    let compressed = BASE64.decode(encoded).map_err(|e| Error::Serialization {
        message: format!("invalid snapshot encoding: {}", e),
    })?;
    let mut decoder = GzDecoder::new(compressed.as_slice());
    let mut content = Vec::new();
    decoder
        .read_to_end(&mut content)
        .map_err(|e| Error::Serialization {
            message: format!("invalid snapshot compression: {}", e),
        })?;
    Ok(content)
}

/// Literal all-occurrences substitution over raw bytes.
///
/// Byte-level so that substitution works regardless of the file's
/// encoding. An empty `from` is a no-op rather than an infinite expansion.
pub fn substitute(content: &[u8], from: &[u8], to: &[u8]) -> Vec<u8> {
    if from.is_empty() {
        return content.to_vec();
    }
    let mut out = Vec::with_capacity(content.len());
    let mut i = 0;
    while i < content.len() {
        if content[i..].starts_with(from) {
            out.extend_from_slice(to);
            i += from.len();
        } else {
            out.push(content[i]);
            i += 1;
        }
    }
    out
}

/// Render the diagnostic before/after block written to the patch sibling.
///
/// Not a minimal line diff; just the full content on both sides of the
/// modification, stable across runs for identical inputs.
pub fn diagnostic_diff(before: &[u8], after: &[u8]) -> String {
    format!(
        "--- before\n{}\n--- after\n{}\n",
        String::from_utf8_lossy(before),
        String::from_utf8_lossy(after)
    )
}
