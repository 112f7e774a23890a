//! # Tern DB Core
//!
//! Shared id-space types for the Tern triple-store query engine.
//!
//! This crate provides:
//! - The dense term id type ([`Id`]) and its absent-value sentinel
//! - Inclusive id ranges for prefix and comparison filters ([`IdRange`])
//! - The row-major numeric tuple table operators exchange ([`IdTable`])
//! - Cooperative cancellation for long-running scans ([`CancellationToken`])
//!
//! ## Design Principles
//!
//! 1. **Ids are dense**: vocabulary ids index directly into word arrays;
//!    no hashing on the execution path
//! 2. **Tables are construct-only**: operators produce new tables and never
//!    mutate their inputs
//! 3. **Cancellation is cooperative**: inner loops stay suspension-free,
//!    outer loops poll a shared flag

pub mod cancel;
pub mod error;
pub mod id_table;
pub mod ids;

pub use cancel::CancellationToken;
pub use error::{Error, Result};
pub use id_table::IdTable;
pub use ids::{Id, IdRange, ID_NO_VALUE};
