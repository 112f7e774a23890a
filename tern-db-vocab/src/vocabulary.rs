//! The vocabulary: sorted term array with id lookups.
//!
//! [`Vocabulary`] wraps a strictly sorted word array and answers
//! id↔term lookups, ordered boundary queries, and prefix ranges. It is
//! generic over the word storage:
//!
//! - [`PlainWords`]: uncompressed `Vec<String>`, lookups borrow
//! - [`CompressedWords`]: codebook-encoded entries, lookups decode to
//!   owned strings and the id space extends into the external store
//!
//! Both layouts implement the [`TermLookup`] interface the planner
//! programs against; the concrete layout is selected at load time.
//!
//! # Id space
//!
//! Ids `0..len()` index the internal array. Ids `len()..len()+external.len()`
//! index the externalized store. [`ID_NO_VALUE`] never resolves.

use std::borrow::Cow;

use hashbrown::{HashMap, HashSet};
use tern_db_core::{Id, IdRange, ID_NO_VALUE};

use crate::codebook::{CompressedTerm, PrefixCodebook};
use crate::comparator::{split_term, TermComparator};
use crate::config::VocabularyConfig;
use crate::error::Result;
use crate::external::{ExternalStore, InMemoryExternalStore};

/// True when `word` is an RDF literal (starts with `"`).
pub fn is_literal(word: &str) -> bool {
    word.starts_with('"')
}

/// Language tag of a literal, without the `@`. `None` for untagged
/// literals, datatyped literals, and non-literals.
pub fn language_of(word: &str) -> Option<&str> {
    let split = split_term(word);
    if split.is_literal {
        split.langtag.strip_prefix('@')
    } else {
        None
    }
}

/// Word storage behind a [`Vocabulary`].
pub trait WordStore: Default {
    /// Number of stored words.
    fn len(&self) -> usize;

    /// True when no words are stored.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Decoded word at `idx`. Borrows where the layout allows it.
    fn word(&self, idx: usize) -> Cow<'_, str>;

    /// Append a word, encoding it as the layout requires.
    fn push(&mut self, word: &str);

    /// Drop all words, keeping layout settings (codebook etc.).
    fn clear(&mut self);

    /// Reserve room for `additional` more words.
    fn reserve(&mut self, additional: usize);

    /// Apply configuration that concerns the storage layout.
    fn configure(&mut self, config: &VocabularyConfig) -> Result<()>;
}

/// Uncompressed word storage.
#[derive(Debug, Default)]
pub struct PlainWords {
    words: Vec<String>,
}

impl PlainWords {
    /// Borrowed word access, bypassing the `Cow` wrapper.
    pub fn get(&self, idx: usize) -> Option<&str> {
        self.words.get(idx).map(String::as_str)
    }
}

impl WordStore for PlainWords {
    fn len(&self) -> usize {
        self.words.len()
    }

    fn word(&self, idx: usize) -> Cow<'_, str> {
        Cow::Borrowed(&self.words[idx])
    }

    fn push(&mut self, word: &str) {
        self.words.push(word.to_string());
    }

    fn clear(&mut self) {
        self.words.clear();
    }

    fn reserve(&mut self, additional: usize) {
        self.words.reserve(additional);
    }

    fn configure(&mut self, _config: &VocabularyConfig) -> Result<()> {
        Ok(())
    }
}

/// Prefix-compressed word storage.
#[derive(Debug, Default)]
pub struct CompressedWords {
    words: Vec<CompressedTerm>,
    codebook: PrefixCodebook,
}

impl CompressedWords {
    /// The active codebook.
    pub fn codebook(&self) -> &PrefixCodebook {
        &self.codebook
    }

    /// Append an already-encoded term, e.g. from the deserializer.
    pub(crate) fn push_encoded(&mut self, term: CompressedTerm) {
        self.words.push(term);
    }

    pub(crate) fn set_codebook(&mut self, codebook: PrefixCodebook) {
        self.codebook = codebook;
    }

    pub(crate) fn encoded(&self, idx: usize) -> &CompressedTerm {
        &self.words[idx]
    }
}

impl WordStore for CompressedWords {
    fn len(&self) -> usize {
        self.words.len()
    }

    fn word(&self, idx: usize) -> Cow<'_, str> {
        Cow::Owned(self.codebook.expand(&self.words[idx]))
    }

    fn push(&mut self, word: &str) {
        self.words.push(self.codebook.compress(word));
    }

    fn clear(&mut self) {
        self.words.clear();
    }

    fn reserve(&mut self, additional: usize) {
        self.words.reserve(additional);
    }

    fn configure(&mut self, config: &VocabularyConfig) -> Result<()> {
        self.codebook = PrefixCodebook::new(config.compression_prefixes.iter().cloned())?;
        Ok(())
    }
}

/// Common lookup interface over plain and compressed vocabularies.
pub trait TermLookup {
    /// Number of internal words.
    fn len(&self) -> usize;

    /// Decoded term for `id`, or `None` for `ID_NO_VALUE` and
    /// out-of-range ids.
    fn at(&self, id: Id) -> Option<Cow<'_, str>>;

    /// Id of `word` if present in the internal or external store.
    fn get_id(&self, word: &str) -> Option<Id>;

    /// Boundary id for a `< word` filter.
    fn id_for_lt(&self, word: &str) -> Id;

    /// Boundary id for a `<= word` filter.
    fn id_for_le(&self, word: &str) -> Id;

    /// Boundary id for a `> word` filter.
    fn id_for_gt(&self, word: &str) -> Id;

    /// Boundary id for a `>= word` filter.
    fn id_for_ge(&self, word: &str) -> Id;

    /// Inclusive id range of all words starting with `prefix`.
    fn prefix_range(&self, prefix: &str) -> Option<IdRange>;
}

/// A read-optimized term dictionary.
///
/// Populate with words pre-sorted under the active comparator (or via
/// [`create_from_set`](Vocabulary::<PlainWords>::create_from_set)), then
/// treat as read-only. All range queries assume the sorted invariant.
pub struct Vocabulary<W: WordStore> {
    words: W,
    external: Box<dyn ExternalStore>,
    externalized_prefixes: Vec<String>,
    internalized_langs: Vec<String>,
    comparator: TermComparator,
}

/// Uncompressed vocabulary; lookups borrow from the word array.
pub type PlainVocabulary = Vocabulary<PlainWords>;

/// Prefix-compressed vocabulary with externalized upper id range.
pub type CompressedVocabulary = Vocabulary<CompressedWords>;

impl<W: WordStore> Default for Vocabulary<W> {
    fn default() -> Self {
        Self {
            words: W::default(),
            external: Box::new(InMemoryExternalStore::default()),
            externalized_prefixes: Vec::new(),
            internalized_langs: vec!["en".to_string()],
            comparator: TermComparator::new(),
        }
    }
}

impl<W: WordStore> Vocabulary<W> {
    /// Create an empty vocabulary with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply configuration. Call before populating; the comparator and
    /// codebook must not change under a populated array.
    pub fn configure(&mut self, config: &VocabularyConfig) -> Result<()> {
        assert!(
            self.words.is_empty(),
            "vocabulary must be configured before it is populated"
        );
        self.comparator = TermComparator::with_ignore_case(config.ignore_case);
        self.externalized_prefixes = config.externalized_prefixes.clone();
        self.internalized_langs = config.internalized_langs.clone();
        self.words.configure(config)
    }

    /// Attach the externalized literal store.
    pub fn set_external_store(&mut self, store: Box<dyn ExternalStore>) {
        self.external = store;
    }

    /// The active comparator.
    pub fn comparator(&self) -> &TermComparator {
        &self.comparator
    }

    /// Direct access to the word storage.
    pub fn store(&self) -> &W {
        &self.words
    }

    pub(crate) fn store_mut(&mut self) -> &mut W {
        &mut self.words
    }

    /// Number of internal words.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// True when the internal array is empty.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Drop all words but keep prefixes, languages, and ordering settings.
    pub fn clear(&mut self) {
        self.words.clear();
    }

    /// Reserve space for `additional` more words.
    pub fn reserve(&mut self, additional: usize) {
        self.words.reserve(additional);
    }

    /// Append a word. The caller feeds words in comparator order.
    pub fn push_back(&mut self, word: &str) {
        debug_assert!(
            self.words.is_empty()
                || self
                    .comparator
                    .less(self.words.word(self.words.len() - 1).as_ref(), word),
            "push_back violates the sorted/unique invariant: {word:?}"
        );
        self.words.push(word);
    }

    /// True when `word` belongs in the externalized store under the
    /// current configuration. The classification is stable, so id lookups
    /// can route to the correct store without probing both.
    pub fn should_be_externalized(&self, word: &str) -> bool {
        self.should_entity_be_externalized(word) || self.should_literal_be_externalized(word)
    }

    /// Prefix-based externalization rule.
    pub fn should_entity_be_externalized(&self, word: &str) -> bool {
        self.externalized_prefixes
            .iter()
            .any(|prefix| word.starts_with(prefix.as_str()))
    }

    /// Language-based externalization rule: tagged literals stay internal
    /// only for the configured languages. Untagged and datatyped literals
    /// stay internal.
    pub fn should_literal_be_externalized(&self, word: &str) -> bool {
        match language_of(word) {
            Some(lang) => !self.internalized_langs.iter().any(|l| l == lang),
            None => false,
        }
    }

    /// Index of the first word not less than `word`.
    fn lower_bound(&self, word: &str) -> usize {
        let mut lo = 0;
        let mut hi = self.words.len();
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if self.comparator.less(self.words.word(mid).as_ref(), word) {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        lo
    }

    /// Index past the last word whose first `prefix.len()` bytes still
    /// match `prefix` under the comparator. Candidates are truncated to
    /// the prefix length, collapsing all extensions into equality.
    fn upper_bound_for_prefix(&self, prefix: &str, first: usize) -> usize {
        let mut lo = first;
        let mut hi = self.words.len();
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            let candidate = self.words.word(mid);
            let truncated = truncate_to_boundary(candidate.as_ref(), prefix.len());
            if self.comparator.less(prefix, truncated) {
                hi = mid;
            } else {
                lo = mid + 1;
            }
        }
        lo
    }

    /// Prefix test under the active comparator.
    fn starts_with(&self, word: &str, prefix: &str) -> bool {
        if self.comparator.is_ignore_case() {
            word.to_lowercase().starts_with(&prefix.to_lowercase())
        } else {
            word.starts_with(prefix)
        }
    }

    fn lookup_at(&self, id: Id) -> Option<Cow<'_, str>> {
        if id == ID_NO_VALUE {
            return None;
        }
        let idx = id as usize;
        if idx < self.words.len() {
            Some(self.words.word(idx))
        } else {
            self.external
                .get(idx - self.words.len())
                .map(Cow::Owned)
        }
    }

    fn lookup_get_id(&self, word: &str) -> Option<Id> {
        if self.should_be_externalized(word) {
            return self
                .external
                .get_id(word)
                .map(|local| (local + self.words.len()) as Id);
        }
        let idx = self.lower_bound(word);
        if idx < self.words.len() && self.words.word(idx).as_ref() == word {
            Some(idx as Id)
        } else {
            None
        }
    }

    fn lookup_lt(&self, word: &str) -> Id {
        self.lower_bound(word) as Id
    }

    fn lookup_le(&self, word: &str) -> Id {
        let mut idx = self.lower_bound(word);
        if idx < self.words.len() && idx > 0 && self.words.word(idx).as_ref() != word {
            // The word itself is absent and the cursor landed one past the
            // last smaller entry; step back so a <= filter excludes the
            // larger neighbor.
            idx -= 1;
        }
        idx as Id
    }

    fn lookup_gt(&self, word: &str) -> Id {
        let mut idx = self.lower_bound(word);
        if idx < self.words.len() && idx > 0 && self.words.word(idx).as_ref() != word {
            // Absent word: nothing sorts between idx-1 and the cursor, so
            // the strictly-greater boundary may use the lower neighbor.
            idx -= 1;
        }
        idx as Id
    }

    fn lookup_ge(&self, word: &str) -> Id {
        self.lower_bound(word) as Id
    }

    fn lookup_prefix_range(&self, prefix: &str) -> Option<IdRange> {
        let first = self.lower_bound(prefix);
        let past = self.upper_bound_for_prefix(prefix, first);
        if past == 0 {
            return None;
        }
        let last = past - 1;
        let first_ok = first < self.words.len()
            && self.starts_with(self.words.word(first).as_ref(), prefix);
        let last_ok = last < self.words.len()
            && self.starts_with(self.words.word(last).as_ref(), prefix);
        if first_ok && last_ok && first <= last {
            Some(IdRange::new(first as Id, last as Id))
        } else {
            None
        }
    }
}

impl<W: WordStore> TermLookup for Vocabulary<W> {
    fn len(&self) -> usize {
        Vocabulary::len(self)
    }

    fn at(&self, id: Id) -> Option<Cow<'_, str>> {
        self.lookup_at(id)
    }

    fn get_id(&self, word: &str) -> Option<Id> {
        self.lookup_get_id(word)
    }

    fn id_for_lt(&self, word: &str) -> Id {
        self.lookup_lt(word)
    }

    fn id_for_le(&self, word: &str) -> Id {
        self.lookup_le(word)
    }

    fn id_for_gt(&self, word: &str) -> Id {
        self.lookup_gt(word)
    }

    fn id_for_ge(&self, word: &str) -> Id {
        self.lookup_ge(word)
    }

    fn prefix_range(&self, prefix: &str) -> Option<IdRange> {
        self.lookup_prefix_range(prefix)
    }
}

impl Vocabulary<PlainWords> {
    /// Borrowed word access; `None` for out-of-range ids. Internal words
    /// only, since external entries materialize owned strings.
    pub fn word_ref(&self, id: Id) -> Option<&str> {
        if id == ID_NO_VALUE {
            return None;
        }
        self.store().get(id as usize)
    }

    /// Populate from an unsorted set of words, replacing the current
    /// contents. Sorts under the active comparator.
    pub fn create_from_set(&mut self, set: HashSet<String>) {
        let comparator = self.comparator;
        let mut sorted: Vec<String> = set.into_iter().collect();
        sorted.sort_by(|a, b| comparator.compare(a, b));
        self.clear();
        self.reserve(sorted.len());
        for word in &sorted {
            self.push_back(word);
        }
    }

    /// Snapshot of the word → id mapping.
    pub fn as_map(&self) -> HashMap<String, Id> {
        (0..self.len())
            .map(|idx| (self.store().word(idx).into_owned(), idx as Id))
            .collect()
    }
}

impl Vocabulary<CompressedWords> {
    /// The active compression codebook.
    pub fn codebook(&self) -> &PrefixCodebook {
        self.store().codebook()
    }
}

/// Truncate `s` to at most `max_bytes`, backing off to a char boundary.
fn truncate_to_boundary(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VocabularyConfig;

    fn case_insensitive() -> VocabularyConfig {
        VocabularyConfig {
            ignore_case: true,
            ..VocabularyConfig::default()
        }
    }

    fn sample_plain() -> PlainVocabulary {
        let mut vocab = PlainVocabulary::new();
        vocab.configure(&case_insensitive()).unwrap();
        for word in ["\"Apple\"", "\"apple\"", "\"banana\"", "<http://x>", "<http://y>"] {
            vocab.push_back(word);
        }
        vocab
    }

    #[test]
    fn test_round_trip_all_words() {
        let vocab = sample_plain();
        for idx in 0..vocab.len() {
            let word = vocab.at(idx as Id).unwrap().into_owned();
            assert_eq!(vocab.get_id(&word), Some(idx as Id));
        }
    }

    #[test]
    fn test_id_monotonicity() {
        let vocab = sample_plain();
        let cmp = *vocab.comparator();
        for a in 0..vocab.len() {
            for b in 0..vocab.len() {
                let wa = vocab.at(a as Id).unwrap().into_owned();
                let wb = vocab.at(b as Id).unwrap().into_owned();
                if cmp.less(&wa, &wb) {
                    assert!(a < b, "{wa} < {wb} but ids {a} >= {b}");
                }
            }
        }
    }

    #[test]
    fn test_prefix_range_case_insensitive() {
        let vocab = sample_plain();
        let range = vocab.prefix_range("\"a").unwrap();
        assert_eq!((range.first, range.last), (0, 1));
    }

    #[test]
    fn test_prefix_range_miss() {
        let vocab = sample_plain();
        assert!(vocab.prefix_range("\"z").is_none());
        assert!(vocab.prefix_range("<urn:").is_none());
    }

    #[test]
    fn test_boundary_lookups() {
        let vocab = sample_plain();
        assert_eq!(vocab.id_for_ge("\"b\""), 2);
        assert_eq!(vocab.get_id("\"banana\""), Some(2));
        // Absent word: le/gt step back to the lower neighbor.
        assert_eq!(vocab.id_for_le("\"azz\""), 1);
        assert_eq!(vocab.id_for_gt("\"azz\""), 1);
        // Present word: boundaries land on the hit itself.
        assert_eq!(vocab.id_for_le("\"banana\""), 2);
        assert_eq!(vocab.id_for_lt("\"banana\""), 2);
    }

    #[test]
    fn test_at_out_of_range() {
        let vocab = sample_plain();
        assert!(vocab.at(ID_NO_VALUE).is_none());
        assert!(vocab.at(99).is_none());
        assert_eq!(vocab.word_ref(3), Some("<http://x>"));
    }

    #[test]
    fn test_create_from_set_sorts() {
        let mut vocab = PlainVocabulary::new();
        vocab.configure(&case_insensitive()).unwrap();
        let set: HashSet<String> = ["\"banana\"", "\"Apple\"", "<http://x>", "\"apple\""]
            .iter()
            .map(|s| s.to_string())
            .collect();
        vocab.create_from_set(set);
        assert_eq!(vocab.word_ref(0), Some("\"Apple\""));
        assert_eq!(vocab.word_ref(1), Some("\"apple\""));
        assert_eq!(vocab.word_ref(2), Some("\"banana\""));
        let map = vocab.as_map();
        assert_eq!(map.get("\"banana\""), Some(&2));
    }

    #[test]
    fn test_compressed_round_trip() {
        let mut vocab = CompressedVocabulary::new();
        let config = VocabularyConfig {
            compression_prefixes: vec!["<http://example.org/".to_string()],
            ..VocabularyConfig::default()
        };
        vocab.configure(&config).unwrap();
        for word in [
            "\"zz\"",
            "<http://example.org/a>",
            "<http://example.org/b>",
            "<urn:raw>",
        ] {
            vocab.push_back(word);
        }
        for idx in 0..vocab.len() {
            let word = vocab.at(idx as Id).unwrap().into_owned();
            assert_eq!(vocab.get_id(&word), Some(idx as Id), "word {word}");
        }
        assert_eq!(
            vocab.prefix_range("<http://example.org/").map(|r| (r.first, r.last)),
            Some((1, 2))
        );
    }

    #[test]
    fn test_externalization_routing() {
        let mut vocab = CompressedVocabulary::new();
        let config = VocabularyConfig {
            externalized_prefixes: vec!["<http://statements/".to_string()],
            ..VocabularyConfig::default()
        };
        vocab.configure(&config).unwrap();
        vocab.push_back("\"kept\"@en");
        vocab.push_back("<http://kept>");

        let mut store = InMemoryExternalStore::new(*vocab.comparator());
        store.push_back("\"weg\"@de");
        store.push_back("<http://statements/s1>");
        vocab.set_external_store(Box::new(store));

        // Language rule: non-internalized langtag goes external.
        assert!(vocab.should_be_externalized("\"weg\"@de"));
        assert!(!vocab.should_be_externalized("\"kept\"@en"));
        assert!(!vocab.should_be_externalized("\"untagged\""));
        // Prefix rule.
        assert!(vocab.should_be_externalized("<http://statements/s1>"));

        // External ids sit above the internal range and round-trip.
        assert_eq!(vocab.get_id("\"weg\"@de"), Some(2));
        assert_eq!(vocab.at(2).as_deref(), Some("\"weg\"@de"));
        assert_eq!(vocab.get_id("<http://statements/s1>"), Some(3));
        assert_eq!(vocab.get_id("\"kept\"@en"), Some(0));
    }

    #[test]
    fn test_language_of() {
        assert_eq!(language_of("\"haus\"@de"), Some("de"));
        assert_eq!(language_of("\"x\""), None);
        assert_eq!(language_of("\"1\"^^<http://int>"), None);
        assert_eq!(language_of("<http://iri>"), None);
    }
}
