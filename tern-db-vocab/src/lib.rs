//! # Tern DB Vocab
//!
//! The vocabulary: a bijection between RDF term strings and dense numeric
//! ids, backed by a sorted word array with optional prefix compression and
//! a two-tier internal/external layout.
//!
//! This crate provides:
//! - The term comparator with optional case-insensitive ordering
//!   ([`TermComparator`])
//! - The prefix-compression codebook ([`PrefixCodebook`], [`CompressedTerm`])
//! - The vocabulary itself, generic over plain or compressed word storage
//!   ([`Vocabulary`], [`PlainVocabulary`], [`CompressedVocabulary`])
//! - The externalized literal store seam ([`ExternalStore`])
//! - On-disk text and binary formats ([`io`])
//!
//! ## Ordering invariant
//!
//! The word array is strictly sorted under the active comparator with no
//! duplicates. Every lookup is a binary search; `get_id(w)` and `at(id)`
//! are inverse on the stored set.

pub mod codebook;
pub mod comparator;
pub mod config;
pub mod error;
pub mod external;
pub mod io;
pub mod vocabulary;

pub use codebook::{CompressedTerm, PrefixCodebook, NUM_COMPRESSION_PREFIXES};
pub use comparator::TermComparator;
pub use config::VocabularyConfig;
pub use error::{Error, Result};
pub use external::{ExternalStore, InMemoryExternalStore};
pub use vocabulary::{
    is_literal, language_of, CompressedVocabulary, CompressedWords, PlainVocabulary, PlainWords,
    TermLookup, Vocabulary, WordStore,
};
