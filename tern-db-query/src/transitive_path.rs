//! Bounded-distance reachability over an edge relation.
//!
//! [`TransitivePath`] computes all pairs `(a, b)` connected by a directed
//! path of `min_dist..=max_dist` edges drawn from a two-column slice of
//! its input table. Either endpoint may be a variable, a fixed id, or
//! bound to a column of another operator's materialized result.
//!
//! The search is a breadth-first frontier expansion per start node. A
//! per-start visited map guarantees each target is found at its shortest
//! distance and emitted at most once; pairs from different starts are
//! independent.
//!
//! ## Output layout
//!
//! Columns appear in (left, right) endpoint order. A variable endpoint
//! contributes one column; a fixed endpoint contributes none; a bound
//! endpoint contributes the binding table's columns minus the join
//! column, with the binding's row multiplicity preserved.

use std::sync::Arc;
use std::time::Instant;

use hashbrown::{HashMap, HashSet};
use tern_db_core::{CancellationToken, Id, IdTable};

use crate::error::{Error, Result};

/// Sentinel for an unbounded maximum path length (`p*`, `p+`).
pub const UNBOUNDED_DIST: usize = usize::MAX;

/// One side of a transitive path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endpoint {
    /// Free endpoint; emitted as an output column.
    Variable,
    /// Endpoint fixed to a single id; restricts paths, emits no column.
    Fixed(Id),
}

impl Endpoint {
    fn is_variable(&self) -> bool {
        matches!(self, Endpoint::Variable)
    }
}

/// A side bound to the materialized result of another operator.
///
/// Path endpoints on this side are constrained to the ids in `input_col`;
/// output rows carry the binding row's remaining columns.
#[derive(Clone, Debug)]
pub struct BoundSide {
    pub table: Arc<IdTable>,
    pub input_col: usize,
}

impl BoundSide {
    fn carried_width(&self) -> usize {
        self.table.num_cols() - 1
    }
}

/// Bounded-distance transitive path operator.
///
/// Immutable after construction; [`compute`](Self::compute) is pure over
/// the materialized inputs and never retries or blocks.
#[derive(Clone, Debug)]
pub struct TransitivePath {
    /// Edge relation; rows are `left → right` edges through the two
    /// configured columns.
    sub: Arc<IdTable>,
    left_sub_col: usize,
    right_sub_col: usize,
    left: Endpoint,
    right: Endpoint,
    min_dist: usize,
    max_dist: usize,
    left_bound: Option<BoundSide>,
    right_bound: Option<BoundSide>,
}

impl TransitivePath {
    /// Create an unbound transitive path over `sub`.
    ///
    /// `left_sub_col` / `right_sub_col` select the edge columns;
    /// `min_dist..=max_dist` bounds the path length in edges, with
    /// [`UNBOUNDED_DIST`] as the open upper bound.
    pub fn new(
        sub: Arc<IdTable>,
        left: Endpoint,
        right: Endpoint,
        left_sub_col: usize,
        right_sub_col: usize,
        min_dist: usize,
        max_dist: usize,
    ) -> Result<Self> {
        if left_sub_col >= sub.num_cols() || right_sub_col >= sub.num_cols() {
            return Err(Error::invalid_plan(format!(
                "edge columns ({left_sub_col}, {right_sub_col}) out of range for width {}",
                sub.num_cols()
            )));
        }
        if min_dist > max_dist {
            return Err(Error::invalid_plan(format!(
                "inverted distance bounds: min {min_dist} > max {max_dist}"
            )));
        }
        Ok(Self {
            sub,
            left_sub_col,
            right_sub_col,
            left,
            right,
            min_dist,
            max_dist,
            left_bound: None,
            right_bound: None,
        })
    }

    /// Bind the left side to `input_col` of another operator's result.
    ///
    /// Path starts are then drawn from that column instead of the whole
    /// edge relation, which shrinks the search when the binding is small.
    pub fn bind_left_side(&self, table: Arc<IdTable>, input_col: usize) -> Result<Self> {
        if self.is_bound() {
            return Err(Error::AlreadyBound);
        }
        if !self.left.is_variable() {
            return Err(Error::invalid_plan(
                "cannot bind the left side: it is fixed to a constant".to_string(),
            ));
        }
        if input_col >= table.num_cols() {
            return Err(Error::invalid_plan(format!(
                "binding column {input_col} out of range for width {}",
                table.num_cols()
            )));
        }
        let mut bound = self.clone();
        bound.left_bound = Some(BoundSide { table, input_col });
        Ok(bound)
    }

    /// Bind the right side to `input_col` of another operator's result.
    pub fn bind_right_side(&self, table: Arc<IdTable>, input_col: usize) -> Result<Self> {
        if self.is_bound() {
            return Err(Error::AlreadyBound);
        }
        if !self.right.is_variable() {
            return Err(Error::invalid_plan(
                "cannot bind the right side: it is fixed to a constant".to_string(),
            ));
        }
        if input_col >= table.num_cols() {
            return Err(Error::invalid_plan(format!(
                "binding column {input_col} out of range for width {}",
                table.num_cols()
            )));
        }
        let mut bound = self.clone();
        bound.right_bound = Some(BoundSide { table, input_col });
        Ok(bound)
    }

    /// True once either side has been bound. A side may be bound at most
    /// once, and never both.
    pub fn is_bound(&self) -> bool {
        self.left_bound.is_some() || self.right_bound.is_some()
    }

    /// Number of output columns.
    pub fn result_width(&self) -> usize {
        let left_width = match &self.left_bound {
            Some(bound) => bound.carried_width(),
            None => usize::from(self.left.is_variable()),
        };
        let right_width = match &self.right_bound {
            Some(bound) => bound.carried_width(),
            None => usize::from(self.right.is_variable()),
        };
        left_width + right_width
    }

    /// True when the result is provably empty without running the search.
    pub fn known_empty_result(&self) -> bool {
        if let Some(bound) = &self.left_bound {
            if bound.table.is_empty() {
                return true;
            }
        }
        if let Some(bound) = &self.right_bound {
            if bound.table.is_empty() {
                return true;
            }
        }
        // Reflexive pairs keep min_dist = 0 alive even without edges.
        if self.min_dist == 0 {
            return false;
        }
        if self.sub.is_empty() {
            return true;
        }
        if let Endpoint::Fixed(value) = self.left {
            if !self.column_contains(self.left_sub_col, value) {
                return true;
            }
        }
        if let Endpoint::Fixed(value) = self.right {
            if !self.column_contains(self.right_sub_col, value) {
                return true;
            }
        }
        false
    }

    /// Heuristic upper bound on the number of result rows.
    ///
    /// Non-negative and non-decreasing in `max_dist`: edges times the
    /// admitted depth span, clamped to the reachable pair domain, scaled
    /// by the binding size when a side is bound.
    pub fn size_estimate(&self) -> usize {
        if self.known_empty_result() {
            return 0;
        }
        let distinct_left = self.distinct_in_column(self.left_sub_col).max(1);
        let distinct_right = self.distinct_in_column(self.right_sub_col).max(1);
        let node_count = distinct_left.saturating_add(distinct_right);
        let span = if self.max_dist == UNBOUNDED_DIST {
            node_count
        } else {
            (self.max_dist - self.min_dist + 1).min(node_count)
        };
        let domain = distinct_left.saturating_mul(distinct_right);
        let base = self.sub.num_rows().saturating_mul(span).min(domain).max(1);
        if let Some(bound) = &self.left_bound {
            return bound
                .table
                .num_rows()
                .saturating_mul(base.div_ceil(distinct_left));
        }
        if let Some(bound) = &self.right_bound {
            return bound
                .table
                .num_rows()
                .saturating_mul(base.div_ceil(distinct_right));
        }
        base
    }

    /// Heuristic compute cost: one scan of the edge relation plus the
    /// emitted pairs.
    pub fn cost_estimate(&self) -> usize {
        self.sub.num_rows().saturating_add(self.size_estimate())
    }

    /// Estimated average duplication of an output column.
    pub fn multiplicity(&self, col: usize) -> f64 {
        let distinct = self.distinct_source_of_output_col(col).max(1);
        self.size_estimate() as f64 / distinct as f64
    }

    /// One-line operator description for plan dumps.
    pub fn descriptor(&self) -> String {
        let side = |endpoint: &Endpoint, bound: &Option<BoundSide>| match (endpoint, bound) {
            (_, Some(b)) => format!("bound[{} rows]", b.table.num_rows()),
            (Endpoint::Variable, None) => "var".to_string(),
            (Endpoint::Fixed(v), None) => format!("fixed {v}"),
        };
        let max = if self.max_dist == UNBOUNDED_DIST {
            "*".to_string()
        } else {
            self.max_dist.to_string()
        };
        format!(
            "TransitivePath left {} right {} dist {}..{}",
            side(&self.left, &self.left_bound),
            side(&self.right, &self.right_bound),
            self.min_dist,
            max
        )
    }

    /// Run the path search and materialize the result table.
    pub fn compute(&self, cancel: &CancellationToken) -> Result<IdTable> {
        let started = Instant::now();
        let result = if self.right_bound.is_some() {
            self.compute_right_bound(cancel)?
        } else {
            self.compute_forward(cancel)?
        };
        tracing::debug!(
            rows = result.num_rows(),
            ms = started.elapsed().as_millis() as u64,
            op = %self.descriptor(),
            "transitive path computed"
        );
        Ok(result)
    }

    /// Forward search: starts on the left, targets on the right. Covers
    /// the unbound, left-fixed, and left-bound modes.
    fn compute_forward(&self, cancel: &CancellationToken) -> Result<IdTable> {
        let adjacency = self.adjacency(self.left_sub_col, self.right_sub_col);
        let mut result = IdTable::new(self.result_width());

        if let Some(bound) = &self.left_bound {
            // Reachable sets are cached per distinct start so duplicate
            // binding rows pay the BFS once but keep their multiplicity.
            let mut cache: HashMap<Id, Vec<Id>> = HashMap::new();
            let mut row_buf = Vec::with_capacity(self.result_width());
            for row in bound.table.rows() {
                cancel.check()?;
                let start = row[bound.input_col];
                if !cache.contains_key(&start) {
                    let targets = self.search(&adjacency, start, cancel)?;
                    cache.insert(start, targets);
                }
                for target in &cache[&start] {
                    if !self.right_admits(*target) {
                        continue;
                    }
                    row_buf.clear();
                    push_row_without(&mut row_buf, row, bound.input_col);
                    if self.right.is_variable() {
                        row_buf.push(*target);
                    }
                    result.push_row(&row_buf);
                }
            }
            return Ok(result);
        }

        let starts = self.forward_starts();
        let mut row_buf = Vec::with_capacity(self.result_width());
        for start in starts {
            cancel.check()?;
            let targets = self.search(&adjacency, start, cancel)?;
            for target in targets {
                if !self.right_admits(target) {
                    continue;
                }
                row_buf.clear();
                if self.left.is_variable() {
                    row_buf.push(start);
                }
                if self.right.is_variable() {
                    row_buf.push(target);
                }
                result.push_row(&row_buf);
            }
        }
        Ok(result)
    }

    /// Right-bound search: walk the reversed edges from the binding's
    /// ids, so every reached node is a valid left endpoint.
    fn compute_right_bound(&self, cancel: &CancellationToken) -> Result<IdTable> {
        let bound = self.right_bound.as_ref().expect("right side is bound");
        let reversed = self.adjacency(self.right_sub_col, self.left_sub_col);
        let mut result = IdTable::new(self.result_width());
        let mut cache: HashMap<Id, Vec<Id>> = HashMap::new();
        let mut row_buf = Vec::with_capacity(self.result_width());

        for row in bound.table.rows() {
            cancel.check()?;
            let start = row[bound.input_col];
            if !cache.contains_key(&start) {
                let sources = self.search(&reversed, start, cancel)?;
                cache.insert(start, sources);
            }
            for source in &cache[&start] {
                if !self.left_admits(*source) {
                    continue;
                }
                row_buf.clear();
                if self.left.is_variable() {
                    row_buf.push(*source);
                }
                push_row_without(&mut row_buf, row, bound.input_col);
                result.push_row(&row_buf);
            }
        }
        Ok(result)
    }

    /// Breadth-first expansion from `start`, returning every node whose
    /// shortest distance lies in `min_dist..=max_dist`. Each node appears
    /// at most once.
    fn search(
        &self,
        adjacency: &HashMap<Id, Vec<Id>>,
        start: Id,
        cancel: &CancellationToken,
    ) -> Result<Vec<Id>> {
        let mut visited: HashSet<Id> = HashSet::new();
        visited.insert(start);
        let mut frontier = vec![start];
        let mut next = Vec::new();
        let mut out = Vec::new();
        let mut depth = 0usize;
        loop {
            cancel.check()?;
            if depth >= self.min_dist {
                out.extend_from_slice(&frontier);
            }
            if depth == self.max_dist || frontier.is_empty() {
                break;
            }
            next.clear();
            for &node in &frontier {
                if let Some(successors) = adjacency.get(&node) {
                    for &succ in successors {
                        if visited.insert(succ) {
                            next.push(succ);
                        }
                    }
                }
            }
            std::mem::swap(&mut frontier, &mut next);
            depth += 1;
        }
        Ok(out)
    }

    /// Group the edge relation into an adjacency map `from → [to]`.
    fn adjacency(&self, from_col: usize, to_col: usize) -> HashMap<Id, Vec<Id>> {
        let mut adjacency: HashMap<Id, Vec<Id>> = HashMap::new();
        for row in self.sub.rows() {
            adjacency
                .entry(row[from_col])
                .or_default()
                .push(row[to_col]);
        }
        adjacency
    }

    /// Start nodes for the forward modes (left not bound).
    fn forward_starts(&self) -> Vec<Id> {
        match self.left {
            Endpoint::Fixed(value) => vec![value],
            Endpoint::Variable => {
                let mut seen: HashSet<Id> = HashSet::new();
                let mut starts = Vec::new();
                for row in self.sub.rows() {
                    if seen.insert(row[self.left_sub_col]) {
                        starts.push(row[self.left_sub_col]);
                    }
                }
                if self.min_dist == 0 {
                    // Pure targets still contribute their reflexive pair.
                    for row in self.sub.rows() {
                        if seen.insert(row[self.right_sub_col]) {
                            starts.push(row[self.right_sub_col]);
                        }
                    }
                }
                starts
            }
        }
    }

    fn right_admits(&self, target: Id) -> bool {
        match self.right {
            Endpoint::Variable => true,
            Endpoint::Fixed(value) => target == value,
        }
    }

    fn left_admits(&self, source: Id) -> bool {
        match self.left {
            Endpoint::Variable => true,
            Endpoint::Fixed(value) => source == value,
        }
    }

    fn column_contains(&self, col: usize, value: Id) -> bool {
        self.sub.rows().any(|row| row[col] == value)
    }

    fn distinct_in_column(&self, col: usize) -> usize {
        let mut seen: HashSet<Id> = HashSet::new();
        for row in self.sub.rows() {
            seen.insert(row[col]);
        }
        seen.len()
    }

    /// Distinct-count proxy for an output column: endpoint columns use
    /// the matching edge column, carried binding columns use the binding
    /// table.
    fn distinct_source_of_output_col(&self, col: usize) -> usize {
        let left_width = match &self.left_bound {
            Some(bound) => bound.carried_width(),
            None => usize::from(self.left.is_variable()),
        };
        if col < left_width {
            return match &self.left_bound {
                Some(bound) => {
                    let source_col = if col < bound.input_col { col } else { col + 1 };
                    distinct_in_table(&bound.table, source_col)
                }
                None => self.distinct_in_column(self.left_sub_col),
            };
        }
        let right_col = col - left_width;
        match &self.right_bound {
            Some(bound) => {
                let source_col = if right_col < bound.input_col {
                    right_col
                } else {
                    right_col + 1
                };
                distinct_in_table(&bound.table, source_col)
            }
            None => self.distinct_in_column(self.right_sub_col),
        }
    }
}

/// Append `row` to `buf`, skipping the column at `skip`.
fn push_row_without(buf: &mut Vec<Id>, row: &[Id], skip: usize) {
    for (i, &cell) in row.iter().enumerate() {
        if i != skip {
            buf.push(cell);
        }
    }
}

fn distinct_in_table(table: &IdTable, col: usize) -> usize {
    let mut seen: HashSet<Id> = HashSet::new();
    for row in table.rows() {
        seen.insert(row[col]);
    }
    seen.len()
}
