//! Top-level parsed query.
//!
//! [`ParsedQuery`] is the root IR node: prefix declarations, the SELECT
//! clause, the WHERE tree, and the solution modifiers. Its `Display`
//! rendering is the canonical textual dump used as the operator-plan
//! cache key and in debug logs.

use std::fmt;

use super::pattern::GraphPattern;

/// A PREFIX declaration: `prefix` maps to the IRI `iri` (with brackets).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SparqlPrefix {
    pub prefix: String,
    pub iri: String,
}

impl SparqlPrefix {
    pub fn new(prefix: impl Into<String>, iri: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            iri: iri.into(),
        }
    }
}

impl fmt::Display for SparqlPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}: {}}}", self.prefix, self.iri)
    }
}

/// One ORDER BY key with its direction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderKey {
    pub key: String,
    pub desc: bool,
}

impl OrderKey {
    pub fn new(key: impl Into<String>, desc: bool) -> Self {
        Self {
            key: key.into(),
            desc,
        }
    }
}

/// An alias binding an aggregate expression to an output variable,
/// parsed from a `(AGG(?in) AS ?out)` select entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Alias {
    pub is_aggregate: bool,
    /// The aggregated input variable, e.g. `?x`.
    pub in_var: String,
    /// The variable the result is bound to, e.g. `?cnt`.
    pub out_var: String,
    /// The original expression text, kept for equality checks and dumps.
    pub function: String,
}

/// Root node of the parsed-query IR.
///
/// Constructed by the grammar parser, normalized by the post-parse
/// passes, then observed read-only by the planner. Subqueries own an
/// independent `ParsedQuery` with their own prefix scope and pattern-id
/// space.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParsedQuery {
    pub prefixes: Vec<SparqlPrefix>,
    pub selected_variables: Vec<String>,
    pub aliases: Vec<Alias>,
    pub root: GraphPattern,
    pub limit: Option<String>,
    pub text_limit: Option<String>,
    pub offset: Option<String>,
    pub distinct: bool,
    pub reduced: bool,
    pub order_by: Vec<OrderKey>,
}

impl ParsedQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign every graph pattern in this query a distinct sequential id.
    ///
    /// Nested subqueries are renumbered from zero in their own id space;
    /// their ids may repeat ids of the enclosing query.
    pub fn recompute_ids(&mut self) {
        let mut counter = 0usize;
        self.root.recompute_ids(&mut counter);
    }
}

impl fmt::Display for ParsedQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PREFIX: {{")?;
        for (i, prefix) in self.prefixes.iter().enumerate() {
            write!(f, "\n\t{prefix}")?;
            if i + 1 < self.prefixes.len() {
                write!(f, ",")?;
            }
        }
        write!(f, "\n}}")?;

        write!(f, "\nSELECT: {{\n\t")?;
        for (i, var) in self.selected_variables.iter().enumerate() {
            write!(f, "{var}")?;
            if i + 1 < self.selected_variables.len() {
                write!(f, ", ")?;
            }
        }
        write!(f, "\n}}")?;

        write!(f, "\nWHERE: \n")?;
        self.root.write_indented(f, 1)?;

        write!(
            f,
            "\nLIMIT: {}",
            self.limit.as_deref().unwrap_or("no limit specified")
        )?;
        write!(
            f,
            "\nTEXTLIMIT: {}",
            self.text_limit.as_deref().unwrap_or("no limit specified")
        )?;
        write!(
            f,
            "\nOFFSET: {}",
            self.offset.as_deref().unwrap_or("no offset specified")
        )?;
        write!(
            f,
            "\nDISTINCT modifier is {}present.",
            if self.distinct { "" } else { "not " }
        )?;
        write!(
            f,
            "\nREDUCED modifier is {}present.",
            if self.reduced { "" } else { "not " }
        )?;
        write!(f, "\nORDER BY: ")?;
        if self.order_by.is_empty() {
            write!(f, "not specified")?;
        } else {
            for key in &self.order_by {
                write!(
                    f,
                    "{} ({})\t",
                    key.key,
                    if key.desc { "DESC" } else { "ASC" }
                )?;
            }
        }
        writeln!(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::path::PropertyPath;
    use crate::ast::pattern::{GraphPatternOperation, SparqlTriple};

    fn leaf_pattern(marker: &str) -> GraphPattern {
        let mut pattern = GraphPattern::new();
        pattern
            .triples
            .push(SparqlTriple::new(marker, PropertyPath::iri("<p>"), "?o"));
        pattern
    }

    #[test]
    fn test_dump_sections() {
        let mut query = ParsedQuery::new();
        query
            .prefixes
            .push(SparqlPrefix::new("ex", "<http://example.org/>"));
        query.selected_variables.push("?s".to_string());
        query.root = leaf_pattern("?s");
        query.limit = Some("10".to_string());
        query.distinct = true;
        query.order_by.push(OrderKey::new("?s", true));

        let dump = query.to_string();
        assert!(dump.contains("PREFIX: {"));
        assert!(dump.contains("{ex: <http://example.org/>}"));
        assert!(dump.contains("SELECT: {\n\t?s"));
        assert!(dump.contains("LIMIT: 10"));
        assert!(dump.contains("TEXTLIMIT: no limit specified"));
        assert!(dump.contains("DISTINCT modifier is present."));
        assert!(dump.contains("REDUCED modifier is not present."));
        assert!(dump.contains("?s (DESC)"));
    }

    #[test]
    fn test_recompute_ids_distinct_across_tree() {
        let mut query = ParsedQuery::new();
        query.root = leaf_pattern("?a");
        query.root.children.push(GraphPatternOperation::Optional(
            leaf_pattern("?b"),
        ));
        query.root.children.push(GraphPatternOperation::Union(
            leaf_pattern("?c"),
            leaf_pattern("?d"),
        ));
        query.root.children.push(GraphPatternOperation::TransPath {
            left: "?c".to_string(),
            right: "?d".to_string(),
            min: 1,
            max: 3,
            pattern: leaf_pattern("?e"),
        });
        query.recompute_ids();

        let mut ids = vec![query.root.id];
        for op in &query.root.children {
            match op {
                GraphPatternOperation::Optional(p) => ids.push(p.id),
                GraphPatternOperation::Union(a, b) => {
                    ids.push(a.id);
                    ids.push(b.id);
                }
                GraphPatternOperation::TransPath { pattern, .. } => ids.push(pattern.id),
                GraphPatternOperation::Subquery(_) => {}
            }
        }
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), ids.len(), "duplicate pattern id assigned");
        assert_eq!(sorted, (0..ids.len()).collect::<Vec<_>>());
    }

    #[test]
    fn test_recompute_ids_subquery_gets_own_space() {
        let mut sub = ParsedQuery::new();
        sub.root = leaf_pattern("?inner");
        sub.root
            .children
            .push(GraphPatternOperation::Optional(leaf_pattern("?inner2")));

        let mut query = ParsedQuery::new();
        query.root = leaf_pattern("?outer");
        query
            .root
            .children
            .push(GraphPatternOperation::Subquery(Box::new(sub)));
        query.recompute_ids();

        assert_eq!(query.root.id, 0);
        if let GraphPatternOperation::Subquery(sub) = &query.root.children[0] {
            // The subquery restarts at zero: its ids repeat the parent's.
            assert_eq!(sub.root.id, 0);
            if let GraphPatternOperation::Optional(inner) = &sub.root.children[0] {
                assert_eq!(inner.id, 1);
            } else {
                panic!("expected optional child");
            }
        } else {
            panic!("expected subquery child");
        }
    }
}
