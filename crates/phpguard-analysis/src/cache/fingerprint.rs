//! Content fingerprints keying the AST cache.

use std::path::Path;
use std::time::UNIX_EPOCH;

use xxhash_rust::xxh3::xxh3_128;

/// Identifies one version of a file's content.
///
/// Two fingerprints are equal only when both the 128-bit content hash and
/// the modification time match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    pub content_hash: u128,
    pub content_len: usize,
    /// Modification time in nanoseconds since the epoch, when the file has one.
    pub mtime_ns: Option<u128>,
}

impl Fingerprint {
    /// Fingerprint `content` as read from `path`.
    pub fn compute(path: &Path, content: &str) -> Self {
        Self {
            content_hash: hash_content(content.as_bytes()),
            content_len: content.len(),
            mtime_ns: modification_time(path),
        }
    }

    /// Fingerprint of content that has no backing file.
    #[cfg(test)]
    pub(crate) fn of_content(content: &str) -> Self {
        Self {
            content_hash: hash_content(content.as_bytes()),
            content_len: content.len(),
            mtime_ns: None,
        }
    }
}

pub fn hash_content(content: &[u8]) -> u128 {
    xxh3_128(content)
}

fn modification_time(path: &Path) -> Option<u128> {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_nanos())
}
