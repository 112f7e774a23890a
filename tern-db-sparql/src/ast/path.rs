//! SPARQL property-path trees.
//!
//! A [`PropertyPath`] sits in the predicate position of a triple pattern
//! and describes a traversal:
//!
//! | Syntax | Node | Description |
//! |--------|------|-------------|
//! | `iri` | `Iri` | Direct predicate |
//! | `^p` | `Inverse` | Reverse direction |
//! | `p/q` | `Sequence` | Path then path |
//! | `p\|q` | `Alternative` | Either path |
//! | `p*` | `Transitive` | Unbounded closure |
//! | `p+` | `TransitiveMin` | At-least-`limit` closure |
//! | `p?`, `p*N` | `TransitiveMax` | At-most-`limit` closure |
//!
//! Each node carries a `can_be_null` flag: whether the path can match
//! without consuming an edge. The planner needs it to decide where a
//! zero-length path collapses both endpoints onto the same node.

use std::fmt;

/// The operation at a property-path node, with per-variant payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PathKind {
    /// Leaf predicate IRI (or a still-unexpanded `prefix:local` form).
    Iri(String),
    /// `^p`
    Inverse(Box<PropertyPath>),
    /// `p/q`
    Sequence(Box<PropertyPath>, Box<PropertyPath>),
    /// `p|q`
    Alternative(Box<PropertyPath>, Box<PropertyPath>),
    /// `p*`
    Transitive(Box<PropertyPath>),
    /// `p+` and friends: at least `limit` steps.
    TransitiveMin { limit: u16, inner: Box<PropertyPath> },
    /// `p?` (`limit` 1) and `p*N`: at most `limit` steps.
    TransitiveMax { limit: u16, inner: Box<PropertyPath> },
}

/// A property-path tree node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertyPath {
    pub kind: PathKind,
    /// Whether the subtree can match the empty path. Maintained by
    /// [`compute_can_be_null`](Self::compute_can_be_null).
    pub can_be_null: bool,
}

impl PropertyPath {
    fn node(kind: PathKind) -> Self {
        Self {
            kind,
            can_be_null: false,
        }
    }

    /// Create a leaf predicate path.
    pub fn iri(iri: impl Into<String>) -> Self {
        Self::node(PathKind::Iri(iri.into()))
    }

    /// Create an inverse path `^p`.
    pub fn inverse(inner: PropertyPath) -> Self {
        Self::node(PathKind::Inverse(Box::new(inner)))
    }

    /// Create a sequence path `p/q`.
    pub fn sequence(left: PropertyPath, right: PropertyPath) -> Self {
        Self::node(PathKind::Sequence(Box::new(left), Box::new(right)))
    }

    /// Create an alternative path `p|q`.
    pub fn alternative(left: PropertyPath, right: PropertyPath) -> Self {
        Self::node(PathKind::Alternative(Box::new(left), Box::new(right)))
    }

    /// Create an unbounded transitive path `p*`.
    pub fn transitive(inner: PropertyPath) -> Self {
        Self::node(PathKind::Transitive(Box::new(inner)))
    }

    /// Create a lower-bounded transitive path (`p+` is `limit` 1).
    pub fn transitive_min(limit: u16, inner: PropertyPath) -> Self {
        Self::node(PathKind::TransitiveMin {
            limit,
            inner: Box::new(inner),
        })
    }

    /// Create an upper-bounded transitive path (`p?` is `limit` 1).
    pub fn transitive_max(limit: u16, inner: PropertyPath) -> Self {
        Self::node(PathKind::TransitiveMax {
            limit,
            inner: Box::new(inner),
        })
    }

    /// Child nodes, 0 to 2.
    pub fn children(&self) -> Vec<&PropertyPath> {
        match &self.kind {
            PathKind::Iri(_) => Vec::new(),
            PathKind::Inverse(inner)
            | PathKind::Transitive(inner)
            | PathKind::TransitiveMin { inner, .. }
            | PathKind::TransitiveMax { inner, .. } => vec![inner],
            PathKind::Sequence(left, right) | PathKind::Alternative(left, right) => {
                vec![left, right]
            }
        }
    }

    /// Recompute `can_be_null` for the whole subtree, post-order.
    ///
    /// A node can be null when all of its children can (and it has any),
    /// or when it is a closure that admits zero steps.
    pub fn compute_can_be_null(&mut self) {
        let mut all_children_null = true;
        let mut has_children = false;
        match &mut self.kind {
            PathKind::Iri(_) => {}
            PathKind::Inverse(inner)
            | PathKind::Transitive(inner)
            | PathKind::TransitiveMin { inner, .. }
            | PathKind::TransitiveMax { inner, .. } => {
                has_children = true;
                inner.compute_can_be_null();
                all_children_null &= inner.can_be_null;
            }
            PathKind::Sequence(left, right) | PathKind::Alternative(left, right) => {
                has_children = true;
                left.compute_can_be_null();
                right.compute_can_be_null();
                all_children_null &= left.can_be_null && right.can_be_null;
            }
        }
        self.can_be_null = has_children && all_children_null;
        match &self.kind {
            PathKind::Transitive(_) | PathKind::TransitiveMax { .. } => {
                self.can_be_null = true;
            }
            PathKind::TransitiveMin { limit: 0, .. } => {
                self.can_be_null = true;
            }
            _ => {}
        }
    }

    /// Apply `f` to every IRI leaf, depth-first.
    pub fn for_each_iri_mut<F, E>(&mut self, f: &mut F) -> Result<(), E>
    where
        F: FnMut(&mut String) -> Result<(), E>,
    {
        match &mut self.kind {
            PathKind::Iri(iri) => f(iri),
            PathKind::Inverse(inner)
            | PathKind::Transitive(inner)
            | PathKind::TransitiveMin { inner, .. }
            | PathKind::TransitiveMax { inner, .. } => inner.for_each_iri_mut(f),
            PathKind::Sequence(left, right) | PathKind::Alternative(left, right) => {
                left.for_each_iri_mut(f)?;
                right.for_each_iri_mut(f)
            }
        }
    }
}

impl fmt::Display for PropertyPath {
    /// Renders with explicit precedence parentheses; closure forms render
    /// as `()*`, `()+`, `()?`, and `()*N`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            PathKind::Iri(iri) => write!(f, "{iri}"),
            PathKind::Inverse(inner) => write!(f, "^({inner})"),
            PathKind::Sequence(left, right) => write!(f, "({left})/({right})"),
            PathKind::Alternative(left, right) => write!(f, "({left})|({right})"),
            PathKind::Transitive(inner) => write!(f, "({inner})*"),
            PathKind::TransitiveMin { inner, .. } => write!(f, "({inner})+"),
            PathKind::TransitiveMax { limit: 1, inner } => write!(f, "({inner})?"),
            PathKind::TransitiveMax { limit, inner } => write!(f, "({inner})*{limit}"),
        }
    }
}
