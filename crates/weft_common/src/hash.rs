//! Content hashing used for parameter fingerprints and generated names.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 128-bit XXH3 digest of some canonical byte encoding.
///
/// Parameter values too long (or too structured) to appear verbatim in a
/// generated module name are summarized by the hex form of this hash. XXH3 is
/// stable across runs and platforms, so generated names are reproducible.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash([u8; 16]);

impl ContentHash {
    /// Hashes `data` with XXH3-128.
    pub fn from_bytes(data: &[u8]) -> Self {
        Self(xxhash_rust::xxh3::xxh3_128(data).to_le_bytes())
    }

    /// Hashes the UTF-8 bytes of `text`.
    pub fn from_text(text: &str) -> Self {
        Self::from_bytes(text.as_bytes())
    }

    /// Returns the raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Returns the first `n` hex digits of the digest (at most 32).
    pub fn short_hex(&self, n: usize) -> String {
        let mut s = self.to_string();
        s.truncate(n.min(32));
        s
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({})", self.short_hex(8))
    }
}
