//! Prefix-compression codebook.
//!
//! The codebook maps up to [`NUM_COMPRESSION_PREFIXES`] prefix strings to
//! single-byte codes. A compressed term is one codebook byte followed by
//! the term's suffix after the prefix is stripped; a term matching no
//! prefix keeps its raw bytes behind the reserved escape byte.
//!
//! Encoding scans prefixes sorted descending by length so the longest
//! match always wins. Compression and expansion round-trip exactly.

use crate::error::{Error, Result};

/// Maximum number of prefixes a codebook can hold.
pub const NUM_COMPRESSION_PREFIXES: usize = 128;

/// First codebook byte; prefix `i` is encoded as `COMPRESSION_PREFIX_BASE + i`.
pub const COMPRESSION_PREFIX_BASE: u8 = 0x80;

/// Escape byte for terms that match no codebook prefix.
pub const NO_PREFIX_BYTE: u8 = 0x7F;

/// An opaque prefix-compressed term. Decoding requires the owning
/// vocabulary's codebook.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompressedTerm(Vec<u8>);

impl CompressedTerm {
    /// Wrap raw codebook-encoded bytes, e.g. read back from disk.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// The encoded bytes: one codebook byte, then the suffix.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// One codebook entry: a single-byte code and the prefix it stands for.
#[derive(Clone, Debug)]
struct PrefixEntry {
    code: u8,
    prefix: String,
}

/// The compression codebook.
///
/// Construction assigns codes in descending-length order, so the encode
/// scan can stop at the first match.
#[derive(Clone, Debug, Default)]
pub struct PrefixCodebook {
    /// Entries sorted descending by prefix length, for encoding.
    by_length: Vec<PrefixEntry>,
    /// Prefix for each code offset, for decoding.
    by_code: Vec<String>,
}

impl PrefixCodebook {
    /// Build a codebook from a list of prefixes. Order is irrelevant.
    pub fn new<I, S>(prefixes: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut sorted: Vec<String> = prefixes.into_iter().map(Into::into).collect();
        if sorted.len() > NUM_COMPRESSION_PREFIXES {
            return Err(Error::TooManyPrefixes(sorted.len()));
        }
        sorted.sort_by(|a, b| b.len().cmp(&a.len()));
        let by_length = sorted
            .iter()
            .enumerate()
            .map(|(i, prefix)| PrefixEntry {
                code: COMPRESSION_PREFIX_BASE + i as u8,
                prefix: prefix.clone(),
            })
            .collect();
        Ok(Self {
            by_length,
            by_code: sorted,
        })
    }

    /// Number of prefixes in the codebook.
    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    /// True when the codebook holds no prefixes.
    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }

    /// The prefixes in code order, as handed to the serializer.
    pub fn prefixes(&self) -> &[String] {
        &self.by_code
    }

    /// Encode `word`: longest matching prefix wins, no match escapes.
    pub fn compress(&self, word: &str) -> CompressedTerm {
        for entry in &self.by_length {
            if let Some(suffix) = word.strip_prefix(entry.prefix.as_str()) {
                let mut bytes = Vec::with_capacity(1 + suffix.len());
                bytes.push(entry.code);
                bytes.extend_from_slice(suffix.as_bytes());
                return CompressedTerm(bytes);
            }
        }
        let mut bytes = Vec::with_capacity(1 + word.len());
        bytes.push(NO_PREFIX_BYTE);
        bytes.extend_from_slice(word.as_bytes());
        CompressedTerm(bytes)
    }

    /// Decode a term produced by [`compress`](Self::compress).
    ///
    /// Panics on a leading byte outside this codebook; the deserializer
    /// validates codes before terms reach here.
    pub fn expand(&self, term: &CompressedTerm) -> String {
        let (&code, suffix) = term
            .0
            .split_first()
            .expect("compressed term is never empty");
        let suffix = std::str::from_utf8(suffix).expect("compressed suffix is valid UTF-8");
        if code == NO_PREFIX_BYTE {
            return suffix.to_string();
        }
        let idx = (code - COMPRESSION_PREFIX_BASE) as usize;
        let mut word = String::with_capacity(self.by_code[idx].len() + suffix.len());
        word.push_str(&self.by_code[idx]);
        word.push_str(suffix);
        word
    }

    /// True when `code` is a valid leading byte under this codebook.
    pub fn is_valid_code(&self, code: u8) -> bool {
        code == NO_PREFIX_BYTE
            || (code >= COMPRESSION_PREFIX_BASE
                && ((code - COMPRESSION_PREFIX_BASE) as usize) < self.by_code.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codebook_assigns_codes_by_length() {
        let book = PrefixCodebook::new(["<http://w3.org/", "<http://example.org/"]).unwrap();
        // Longest prefix gets the first code.
        let term = book.compress("<http://example.org/foo>");
        assert_eq!(term.as_bytes()[0], COMPRESSION_PREFIX_BASE);
        assert_eq!(&term.as_bytes()[1..], b"foo>");
        let other = book.compress("<http://w3.org/bar>");
        assert_eq!(other.as_bytes()[0], COMPRESSION_PREFIX_BASE + 1);
        assert_eq!(&other.as_bytes()[1..], b"bar>");
    }

    #[test]
    fn test_round_trip() {
        let book =
            PrefixCodebook::new(["<http://example.org/", "<http://w3.org/", "\"common-"]).unwrap();
        for word in [
            "<http://example.org/foo>",
            "<http://w3.org/bar>",
            "\"common-value\"@en",
            "<urn:no-prefix-here>",
            "\"plain\"",
        ] {
            assert_eq!(book.expand(&book.compress(word)), word);
        }
    }

    #[test]
    fn test_no_match_uses_escape_byte() {
        let book = PrefixCodebook::new(["<http://example.org/"]).unwrap();
        let term = book.compress("\"literal\"");
        assert_eq!(term.as_bytes()[0], NO_PREFIX_BYTE);
        assert_eq!(book.expand(&term), "\"literal\"");
    }

    #[test]
    fn test_longest_match_wins() {
        let book = PrefixCodebook::new(["<http://e/", "<http://e/deep/"]).unwrap();
        let term = book.compress("<http://e/deep/x>");
        // The longer prefix owns the first code and must win the scan.
        assert_eq!(term.as_bytes()[0], COMPRESSION_PREFIX_BASE);
        assert_eq!(&term.as_bytes()[1..], b"x>");
    }

    #[test]
    fn test_too_many_prefixes_rejected() {
        let prefixes: Vec<String> = (0..NUM_COMPRESSION_PREFIXES + 1)
            .map(|i| format!("<p{i}/"))
            .collect();
        assert!(matches!(
            PrefixCodebook::new(prefixes),
            Err(Error::TooManyPrefixes(_))
        ));
    }

    #[test]
    fn test_empty_codebook_round_trips() {
        let book = PrefixCodebook::new(Vec::<String>::new()).unwrap();
        let term = book.compress("<anything>");
        assert_eq!(term.as_bytes()[0], NO_PREFIX_BYTE);
        assert_eq!(book.expand(&term), "<anything>");
    }
}
