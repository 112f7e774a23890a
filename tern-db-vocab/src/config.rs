//! Vocabulary configuration.
//!
//! Pure data — no I/O, no storage dependency. Resolved once before load
//! and applied through [`Vocabulary::configure`](crate::Vocabulary::configure);
//! the settings survive [`clear`](crate::Vocabulary::clear).

use serde::{Deserialize, Serialize};

/// Settings applied to a vocabulary before it is populated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VocabularyConfig {
    /// Case-insensitive ordering for the word array and all lookups.
    pub ignore_case: bool,

    /// Compression codebook prefixes (compressed vocabularies only;
    /// ignored by the plain layout). At most 128 entries.
    pub compression_prefixes: Vec<String>,

    /// Words starting with one of these prefixes are routed to the
    /// externalized store. Good for entity namespaces that rarely appear
    /// in queries or results but dominate space.
    pub externalized_prefixes: Vec<String>,

    /// Literals whose language tag is in this list stay internal;
    /// all other tagged literals are externalized.
    pub internalized_langs: Vec<String>,
}

impl Default for VocabularyConfig {
    fn default() -> Self {
        Self {
            ignore_case: false,
            compression_prefixes: Vec::new(),
            externalized_prefixes: Vec::new(),
            internalized_langs: vec!["en".to_string()],
        }
    }
}
