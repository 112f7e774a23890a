//! Vocabulary serialization: text, binary-merge, and compressed formats.
//!
//! ## Formats
//!
//! **Text vocabulary** (`*.vocab`): one term per line, UTF-8, pre-sorted
//! by the active comparator.
//!
//! **Binary merge format** (`*.vocab.bin`): per term:
//! ```text
//! len: u32 LE
//! utf8_bytes: [u8; len]
//! global_id_slot: [0u8; 8]   (filled during merge)
//! ```
//!
//! **Compressed vocabulary** (`*.vocab.tvc`):
//! ```text
//! magic: "TVC1" (4B)
//! prefix_count: u32 LE
//! For each prefix: len: u32 LE, utf8_bytes
//! word_count: u64 LE
//! For each word: len: u32 LE, codebook_byte + suffix_bytes
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::codebook::{CompressedTerm, PrefixCodebook};
use crate::error::{Error, Result};
use crate::vocabulary::{CompressedVocabulary, PlainVocabulary, Vocabulary, WordStore};

/// Magic bytes for a compressed vocabulary file.
const COMPRESSED_MAGIC: [u8; 4] = *b"TVC1";

impl<W: WordStore> Vocabulary<W> {
    /// Load the word array from a text vocabulary file, replacing the
    /// current contents. Lines must already be sorted by the active
    /// comparator.
    pub fn read_from_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path)?);
        self.clear();
        for line in reader.lines() {
            self.push_back(&line?);
        }
        tracing::debug!(words = self.len(), file = %path.display(), "loaded vocabulary");
        Ok(())
    }
}

impl PlainVocabulary {
    /// Write the word array as a text vocabulary file, one term per line.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path.as_ref())?);
        for idx in 0..self.len() {
            writer.write_all(self.word_ref(idx as u64).unwrap_or_default().as_bytes())?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Write the binary merge format: length-prefixed terms, each followed
    /// by an 8-byte zeroed slot the partial-vocabulary merge fills with
    /// the global id.
    pub fn write_to_binary_file_for_merging(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path.as_ref())?);
        for idx in 0..self.len() {
            let word = self.word_ref(idx as u64).unwrap_or_default();
            writer.write_all(&(word.len() as u32).to_le_bytes())?;
            writer.write_all(word.as_bytes())?;
            writer.write_all(&[0u8; 8])?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl CompressedVocabulary {
    /// Write the codebook and encoded words as a compressed vocabulary file.
    pub fn write_compressed(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path.as_ref())?);
        writer.write_all(&COMPRESSED_MAGIC)?;
        let prefixes = self.codebook().prefixes();
        writer.write_all(&(prefixes.len() as u32).to_le_bytes())?;
        for prefix in prefixes {
            writer.write_all(&(prefix.len() as u32).to_le_bytes())?;
            writer.write_all(prefix.as_bytes())?;
        }
        writer.write_all(&(self.len() as u64).to_le_bytes())?;
        for idx in 0..self.len() {
            let encoded = self.store().encoded(idx).as_bytes();
            writer.write_all(&(encoded.len() as u32).to_le_bytes())?;
            writer.write_all(encoded)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Read a compressed vocabulary file, replacing the codebook and the
    /// word array. Ordering settings are untouched.
    pub fn read_compressed(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut data = Vec::new();
        File::open(path)?.read_to_end(&mut data)?;
        let mut cursor = Cursor::new(&data);

        let magic = cursor.take_bytes(4)?;
        if magic != COMPRESSED_MAGIC {
            return Err(Error::format("compressed vocabulary: invalid magic"));
        }
        let prefix_count = cursor.take_u32()? as usize;
        let mut prefixes = Vec::with_capacity(prefix_count);
        for _ in 0..prefix_count {
            let len = cursor.take_u32()? as usize;
            let bytes = cursor.take_bytes(len)?;
            let prefix = std::str::from_utf8(bytes)
                .map_err(|e| Error::format(format!("codebook prefix not UTF-8: {e}")))?;
            prefixes.push(prefix.to_string());
        }
        let codebook = PrefixCodebook::new(prefixes)?;

        let word_count = cursor.take_u64()? as usize;
        self.clear();
        self.store_mut().set_codebook(codebook);
        self.reserve(word_count);
        for _ in 0..word_count {
            let len = cursor.take_u32()? as usize;
            if len == 0 {
                return Err(Error::format("compressed vocabulary: empty entry"));
            }
            let bytes = cursor.take_bytes(len)?;
            if !self.codebook().is_valid_code(bytes[0]) {
                return Err(Error::format(format!(
                    "compressed vocabulary: unknown codebook byte 0x{:02x}",
                    bytes[0]
                )));
            }
            std::str::from_utf8(&bytes[1..])
                .map_err(|e| Error::format(format!("compressed suffix not UTF-8: {e}")))?;
            self.store_mut()
                .push_encoded(CompressedTerm::from_bytes(bytes.to_vec()));
        }
        tracing::debug!(
            words = self.len(),
            prefixes = self.codebook().len(),
            file = %path.display(),
            "loaded compressed vocabulary"
        );
        Ok(())
    }
}

/// Re-encode a sorted text vocabulary with the given compression prefixes.
///
/// Reads `infile` (one term per line), builds a codebook from `prefixes`,
/// and writes the compressed vocabulary format to `outfile` in the same
/// word order.
pub fn prefix_compress_file(
    infile: impl AsRef<Path>,
    outfile: impl AsRef<Path>,
    prefixes: &[String],
) -> Result<()> {
    let mut vocab = CompressedVocabulary::new();
    let config = crate::config::VocabularyConfig {
        compression_prefixes: prefixes.to_vec(),
        ..Default::default()
    };
    vocab.configure(&config)?;
    let reader = BufReader::new(File::open(infile.as_ref())?);
    for line in reader.lines() {
        // Bypass push_back: the infile order is whatever the index build
        // produced, which need not match this vocabulary's comparator.
        let line = line?;
        let encoded = vocab.codebook().compress(&line);
        vocab.store_mut().push_encoded(encoded);
    }
    vocab.write_compressed(outfile)
}

/// Byte-buffer reader with truncation checks.
struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn take_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        if self.pos + len > self.data.len() {
            return Err(Error::format(format!(
                "truncated at byte {} (wanted {} more)",
                self.pos, len
            )));
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    fn take_u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.take_bytes(4)?.try_into().unwrap()))
    }

    fn take_u64(&mut self) -> Result<u64> {
        Ok(u64::from_le_bytes(self.take_bytes(8)?.try_into().unwrap()))
    }
}
