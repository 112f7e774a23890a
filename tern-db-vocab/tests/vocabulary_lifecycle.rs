//! End-to-end vocabulary lifecycle: configure, populate, query, reload.

use tempfile::TempDir;
use tern_db_vocab::{
    CompressedVocabulary, PlainVocabulary, TermLookup, VocabularyConfig,
};

fn case_insensitive_words() -> Vec<&'static str> {
    vec!["\"Apple\"", "\"apple\"", "\"banana\"", "<http://x>", "<http://y>"]
}

#[test]
fn plain_vocabulary_range_queries() {
    let mut vocab = PlainVocabulary::new();
    vocab
        .configure(&VocabularyConfig {
            ignore_case: true,
            ..VocabularyConfig::default()
        })
        .unwrap();
    for word in case_insensitive_words() {
        vocab.push_back(word);
    }

    // Prefix lookup covers both case variants of "a…".
    let range = vocab.prefix_range("\"a").unwrap();
    assert_eq!((range.first, range.last), (0, 1));

    assert_eq!(vocab.get_id("\"banana\""), Some(2));
    assert_eq!(vocab.id_for_ge("\"b\""), 2);
    assert_eq!(vocab.get_id("\"missing\""), None);
}

#[test]
fn plain_vocabulary_survives_file_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("terms.vocab");

    let mut vocab = PlainVocabulary::new();
    vocab
        .configure(&VocabularyConfig {
            ignore_case: true,
            ..VocabularyConfig::default()
        })
        .unwrap();
    for word in case_insensitive_words() {
        vocab.push_back(word);
    }
    vocab.write_to_file(&path).unwrap();

    let mut reloaded = PlainVocabulary::new();
    reloaded
        .configure(&VocabularyConfig {
            ignore_case: true,
            ..VocabularyConfig::default()
        })
        .unwrap();
    reloaded.read_from_file(&path).unwrap();

    assert_eq!(reloaded.len(), vocab.len());
    for idx in 0..vocab.len() as u64 {
        assert_eq!(reloaded.at(idx), vocab.at(idx));
        let word = vocab.at(idx).unwrap().into_owned();
        assert_eq!(reloaded.get_id(&word), Some(idx));
    }
}

#[test]
fn compressed_vocabulary_preserves_lookup_semantics() {
    let words = [
        "\"plain\"",
        "<http://example.org/a>",
        "<http://example.org/b>",
        "<http://example.org/c>",
        "<urn:other>",
    ];
    let config = VocabularyConfig {
        compression_prefixes: vec!["<http://example.org/".to_string()],
        ..VocabularyConfig::default()
    };

    let mut compressed = CompressedVocabulary::new();
    compressed.configure(&config).unwrap();
    let mut plain = PlainVocabulary::new();
    plain.configure(&config).unwrap();
    for word in words {
        compressed.push_back(word);
        plain.push_back(word);
    }

    // Compression must not change any observable lookup result.
    for word in words {
        assert_eq!(compressed.get_id(word), plain.get_id(word), "{word}");
    }
    let c = compressed.prefix_range("<http://example.org/").unwrap();
    let p = plain.prefix_range("<http://example.org/").unwrap();
    assert_eq!((c.first, c.last), (p.first, p.last));
    assert_eq!((c.first, c.last), (1, 3));
}
