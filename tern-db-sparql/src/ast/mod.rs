//! Parsed-query IR node types.
//!
//! The grammar parser emits these types with terms still in their source
//! spelling (`prefix:local` shortcuts, alias expressions); the passes in
//! [`crate::passes`] normalize them in place.

pub mod path;
pub mod pattern;
pub mod query;

pub use path::{PathKind, PropertyPath};
pub use pattern::{FilterType, GraphPattern, GraphPatternOperation, SparqlFilter, SparqlTriple};
pub use query::{Alias, OrderKey, ParsedQuery, SparqlPrefix};
