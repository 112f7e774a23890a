//! # Tern DB Sparql
//!
//! The parsed-query intermediate representation: the tree the SPARQL
//! grammar parser emits and the planner consumes.
//!
//! The IR is a strict ownership tree — graph patterns own their nested
//! operations, subqueries own an independent [`ParsedQuery`] — and is
//! mutated only by the post-parse passes before the planner observes it
//! read-only:
//!
//! - [`ParsedQuery::expand_prefixes`]: resolve `prefix:local` shortcuts
//!   against the declared prefixes
//! - [`ParsedQuery::parse_aliases`]: turn `(AGG(?x) AS ?y)` select
//!   entries into [`Alias`](ast::Alias) records
//! - [`ParsedQuery::recompute_ids`]: assign every graph pattern a
//!   distinct id within its subquery's id space
//! - [`PropertyPath::compute_can_be_null`](ast::PropertyPath::compute_can_be_null):
//!   mark path subtrees that can match the empty path
//!
//! Every node renders to the textual dump used for plan-cache keys and
//! debug logging via `Display`.

pub mod ast;
pub mod error;
pub mod passes;

pub use ast::{
    Alias, FilterType, GraphPattern, GraphPatternOperation, OrderKey, ParsedQuery, PathKind,
    PropertyPath, SparqlFilter, SparqlPrefix, SparqlTriple,
};
pub use error::{ParseError, Result};
