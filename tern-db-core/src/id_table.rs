//! Row-major numeric tuple table.
//!
//! [`IdTable`] is the single tuple format exchanged between physical
//! operators: a densely packed `Vec<Id>` plus a runtime column count.
//! Rows are contiguous, so `row(i)` is a cheap slice into the buffer.
//!
//! Tables are append-only during construction and read-only afterwards.
//! Width is fixed at creation; pushing a row of the wrong arity is a
//! programming error and panics. The row count is tracked explicitly so
//! zero-width tables (all output columns projected away) still count
//! their rows.

use crate::ids::Id;

/// A densely packed two-dimensional array of term ids.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IdTable {
    data: Vec<Id>,
    width: usize,
    rows: usize,
}

impl IdTable {
    /// Create an empty table with `width` columns.
    pub fn new(width: usize) -> Self {
        Self {
            data: Vec::new(),
            width,
            rows: 0,
        }
    }

    /// Create an empty table with `width` columns and room for `rows` rows.
    pub fn with_capacity(width: usize, rows: usize) -> Self {
        Self {
            data: Vec::with_capacity(width * rows),
            width,
            rows: 0,
        }
    }

    /// Build a table from a row literal. Handy in tests and fixtures.
    pub fn from_rows(width: usize, rows: &[&[Id]]) -> Self {
        let mut table = Self::with_capacity(width, rows.len());
        for row in rows {
            table.push_row(row);
        }
        table
    }

    /// Number of columns.
    pub fn num_cols(&self) -> usize {
        self.width
    }

    /// Number of rows.
    pub fn num_rows(&self) -> usize {
        self.rows
    }

    /// True when the table holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Reserve room for `rows` additional rows.
    pub fn reserve(&mut self, rows: usize) {
        self.data.reserve(rows * self.width);
    }

    /// Append a row. Panics when `row.len()` differs from the table width.
    pub fn push_row(&mut self, row: &[Id]) {
        assert_eq!(
            row.len(),
            self.width,
            "row arity {} does not match table width {}",
            row.len(),
            self.width
        );
        self.data.extend_from_slice(row);
        self.rows += 1;
    }

    /// Row `i` as a slice. Panics when out of range.
    pub fn row(&self, i: usize) -> &[Id] {
        assert!(i < self.rows, "row {i} out of range ({} rows)", self.rows);
        let start = i * self.width;
        &self.data[start..start + self.width]
    }

    /// Single cell access.
    pub fn at(&self, row: usize, col: usize) -> Id {
        debug_assert!(col < self.width);
        self.data[row * self.width + col]
    }

    /// Iterate over rows in order.
    pub fn rows(&self) -> impl Iterator<Item = &[Id]> {
        (0..self.rows).map(move |i| &self.data[i * self.width..(i + 1) * self.width])
    }
}
