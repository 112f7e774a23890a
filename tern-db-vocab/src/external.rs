//! Externalized literal store seam.
//!
//! Rarely-queried terms (foreign-language literals, bulk entity
//! namespaces) live outside the sorted in-memory array in a keyed store
//! whose ids are shifted into the range above the internal words. The
//! store itself is opaque to the vocabulary; only random access by local
//! index and reverse lookup are required.

use crate::comparator::TermComparator;

/// Random-access string store backing the externalized id range.
///
/// Indices are store-local and dense starting at 0; the vocabulary offsets
/// them by its internal word count.
pub trait ExternalStore: Send + Sync {
    /// Number of externalized words.
    fn len(&self) -> usize;

    /// True when the store holds no words.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Word at the given local index.
    fn get(&self, index: usize) -> Option<String>;

    /// Local index of `word`, if present.
    fn get_id(&self, word: &str) -> Option<usize>;
}

/// Heap-backed external store.
///
/// Holds its words sorted under the vocabulary's comparator so reverse
/// lookup is a binary search. Serves as the store for small datasets and
/// as the test double for the on-disk store.
#[derive(Debug, Default)]
pub struct InMemoryExternalStore {
    words: Vec<String>,
    comparator: TermComparator,
}

impl InMemoryExternalStore {
    /// Create an empty store ordered by `comparator`.
    pub fn new(comparator: TermComparator) -> Self {
        Self {
            words: Vec::new(),
            comparator,
        }
    }

    /// Build from words pre-sorted under `comparator`.
    pub fn from_sorted(words: Vec<String>, comparator: TermComparator) -> Self {
        debug_assert!(words
            .windows(2)
            .all(|pair| comparator.less(&pair[0], &pair[1])));
        Self { words, comparator }
    }

    /// Append a word; must preserve the sorted order.
    pub fn push_back(&mut self, word: &str) {
        debug_assert!(self
            .words
            .last()
            .map_or(true, |last| self.comparator.less(last, word)));
        self.words.push(word.to_string());
    }
}

impl ExternalStore for InMemoryExternalStore {
    fn len(&self) -> usize {
        self.words.len()
    }

    fn get(&self, index: usize) -> Option<String> {
        self.words.get(index).cloned()
    }

    fn get_id(&self, word: &str) -> Option<usize> {
        self.words
            .binary_search_by(|probe| self.comparator.compare(probe, word))
            .ok()
    }
}
