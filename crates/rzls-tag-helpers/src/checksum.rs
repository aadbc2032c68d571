//! Structural content checksums.
//!
//! Every descriptor hashes all of its fields into a SHA-256 digest when it is
//! built. Equality and hashing of descriptors go through that digest, so two
//! descriptors deserialized independently from the same source compare equal.

use std::fmt;

use sha2::Digest;
use sha2::Sha256;

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Checksum([u8; 32]);

impl Checksum {
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Checksum({self})")
    }
}

/// Incremental checksum writer.
///
/// Every value is framed with a tag byte and a `\0` separator so that adjacent
/// fields cannot run into each other (`"ab" + "c"` differs from `"a" + "bc"`).
pub(crate) struct ChecksumBuilder {
    hasher: Sha256,
}

impl ChecksumBuilder {
    pub(crate) fn new() -> Self {
        Self {
            hasher: Sha256::new(),
        }
    }

    pub(crate) fn append_str(&mut self, value: &str) -> &mut Self {
        self.hasher.update(b"s");
        self.hasher.update(value.as_bytes());
        self.hasher.update(b"\0");
        self
    }

    pub(crate) fn append_opt_str(&mut self, value: Option<&str>) -> &mut Self {
        match value {
            Some(value) => self.append_str(value),
            None => {
                self.hasher.update(b"n\0");
                self
            }
        }
    }

    pub(crate) fn append_bool(&mut self, value: bool) -> &mut Self {
        self.hasher.update(if value { b"t\0" } else { b"f\0" });
        self
    }

    pub(crate) fn append_u32(&mut self, value: u32) -> &mut Self {
        self.hasher.update(b"i");
        self.hasher.update(value.to_le_bytes());
        self.hasher.update(b"\0");
        self
    }

    pub(crate) fn append_checksum(&mut self, value: Checksum) -> &mut Self {
        self.hasher.update(b"c");
        self.hasher.update(value.0);
        self
    }

    /// Frame a sequence with its length so that empty and missing lists differ
    /// from their neighbours.
    pub(crate) fn append_len(&mut self, len: usize) -> &mut Self {
        self.append_u32(u32::try_from(len).unwrap_or(u32::MAX))
    }

    pub(crate) fn finish(self) -> Checksum {
        Checksum(self.hasher.finalize().into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_framing_separates_fields() {
        let mut left = ChecksumBuilder::new();
        left.append_str("ab").append_str("c");
        let mut right = ChecksumBuilder::new();
        right.append_str("a").append_str("bc");
        assert_ne!(left.finish(), right.finish());
    }

    #[test]
    fn test_none_differs_from_empty() {
        let mut none = ChecksumBuilder::new();
        none.append_opt_str(None);
        let mut empty = ChecksumBuilder::new();
        empty.append_opt_str(Some(""));
        assert_ne!(none.finish(), empty.finish());
    }

    #[test]
    fn test_display_is_lowercase_hex() {
        let checksum = ChecksumBuilder::new().finish();
        let text = checksum.to_string();
        assert_eq!(text.len(), 64);
        // SHA-256 of the empty input.
        assert!(text.starts_with("e3b0c442"));
    }
}
