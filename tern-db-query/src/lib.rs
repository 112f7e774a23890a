//! # Tern DB Query
//!
//! Physical query operators for the Tern triple-store engine.
//!
//! Operators consume and produce [`IdTable`](tern_db_core::IdTable)s:
//! densely packed numeric tuple tables whose cells are vocabulary ids.
//! Inputs are materialized before computation starts, so the compute
//! paths are pure, suspension-free, and cancellable only at loop
//! boundaries.
//!
//! The crate currently carries the bounded-distance reachability
//! operator ([`TransitivePath`]), which answers SPARQL property-path
//! patterns like `?s ex:knows+ ?o` or `?s ex:parent{2,3} ?o` over an
//! edge relation.

pub mod error;
pub mod transitive_path;

pub use error::{Error, Result};
pub use transitive_path::{BoundSide, Endpoint, TransitivePath, UNBOUNDED_DIST};
