//! Graph patterns, triples, and filters.
//!
//! A [`GraphPattern`] is a conjunctive block: its triple patterns and
//! filters apply together, nested operations compose around it. The tree
//! is strict — subpatterns are owned, sharing happens by copy.

use std::fmt;

use super::path::PropertyPath;
use super::query::ParsedQuery;

/// A triple pattern. Subject and object are term or variable strings in
/// their source spelling; the predicate is a property-path tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SparqlTriple {
    pub s: String,
    pub p: PropertyPath,
    pub o: String,
}

impl SparqlTriple {
    pub fn new(s: impl Into<String>, p: PropertyPath, o: impl Into<String>) -> Self {
        Self {
            s: s.into(),
            p,
            o: o.into(),
        }
    }
}

impl fmt::Display for SparqlTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{s: {}, p: {}, o: {}}}", self.s, self.p, self.o)
    }
}

/// Comparison or matching operation of a FILTER clause.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterType {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    LangMatches,
    Prefix,
    Regex,
}

/// A FILTER clause over two term-or-variable operands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SparqlFilter {
    pub filter_type: FilterType,
    pub lhs: String,
    pub rhs: String,
    /// Case-insensitive matching; only meaningful for `Regex`.
    pub regex_ignore_case: bool,
}

impl SparqlFilter {
    pub fn new(filter_type: FilterType, lhs: impl Into<String>, rhs: impl Into<String>) -> Self {
        Self {
            filter_type,
            lhs: lhs.into(),
            rhs: rhs.into(),
            regex_ignore_case: false,
        }
    }
}

impl fmt::Display for SparqlFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FILTER({}", self.lhs)?;
        match self.filter_type {
            FilterType::Eq => write!(f, " = ")?,
            FilterType::Ne => write!(f, " != ")?,
            FilterType::Lt => write!(f, " < ")?,
            FilterType::Le => write!(f, " <= ")?,
            FilterType::Gt => write!(f, " > ")?,
            FilterType::Ge => write!(f, " >= ")?,
            FilterType::LangMatches => write!(f, " LANG_MATCHES ")?,
            FilterType::Prefix => write!(f, " PREFIX ")?,
            FilterType::Regex => {
                write!(f, " REGEX ")?;
                if self.regex_ignore_case {
                    write!(f, "ignoring case ")?;
                }
            }
        }
        write!(f, "{})", self.rhs)
    }
}

/// A conjunctive block of triples and filters with nested operations.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GraphPattern {
    pub triples: Vec<SparqlTriple>,
    pub filters: Vec<SparqlFilter>,
    pub children: Vec<GraphPatternOperation>,
    /// Left-join semantics when this pattern hangs under an OPTIONAL.
    pub optional: bool,
    /// Dense pattern id within the enclosing subquery's id space.
    /// Assigned by [`ParsedQuery::recompute_ids`].
    pub id: usize,
}

impl GraphPattern {
    pub fn new() -> Self {
        Self::default()
    }

    /// Walk the subtree assigning sequential ids from `counter`.
    ///
    /// The counter is threaded through OPTIONAL, UNION, and transitive
    /// path children; a subquery restarts from zero because it forms an
    /// independent id space.
    pub(crate) fn recompute_ids(&mut self, counter: &mut usize) {
        self.id = *counter;
        *counter += 1;
        for op in &mut self.children {
            match op {
                GraphPatternOperation::Optional(pattern) => pattern.recompute_ids(counter),
                GraphPatternOperation::Union(left, right) => {
                    left.recompute_ids(counter);
                    right.recompute_ids(counter);
                }
                GraphPatternOperation::TransPath { pattern, .. } => {
                    pattern.recompute_ids(counter)
                }
                GraphPatternOperation::Subquery(query) => query.recompute_ids(),
            }
        }
    }

    pub(crate) fn write_indented(
        &self,
        f: &mut fmt::Formatter<'_>,
        indentation: usize,
    ) -> fmt::Result {
        let outer = "  ".repeat(indentation.saturating_sub(1));
        let inner = "  ".repeat(indentation);
        write!(f, "{outer}{{")?;
        for (i, triple) in self.triples.iter().enumerate() {
            let sep = if i + 1 < self.triples.len() { "," } else { "" };
            write!(f, "\n{inner}{triple}{sep}")?;
        }
        for (i, filter) in self.filters.iter().enumerate() {
            let sep = if i + 1 < self.filters.len() { "," } else { "" };
            write!(f, "\n{inner}{filter}{sep}")?;
        }
        for child in &self.children {
            writeln!(f)?;
            child.write_indented(f, indentation + 1)?;
        }
        write!(f, "\n{outer}}}")
    }
}

impl fmt::Display for GraphPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 1)
    }
}

/// A nested operation inside a graph pattern. Exactly one variant's
/// payload exists per node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GraphPatternOperation {
    /// OPTIONAL { pattern }
    Optional(GraphPattern),
    /// { left } UNION { right }
    Union(GraphPattern, GraphPattern),
    /// A nested SELECT with its own prefix scope and id space.
    Subquery(Box<ParsedQuery>),
    /// A transitive-path block between two endpoint terms.
    TransPath {
        left: String,
        right: String,
        min: usize,
        max: usize,
        pattern: GraphPattern,
    },
}

impl GraphPatternOperation {
    pub(crate) fn write_indented(
        &self,
        f: &mut fmt::Formatter<'_>,
        indentation: usize,
    ) -> fmt::Result {
        let outer = "  ".repeat(indentation.saturating_sub(1));
        match self {
            GraphPatternOperation::Optional(pattern) => {
                write!(f, "{outer}OPTIONAL ")?;
                pattern.write_indented(f, indentation)
            }
            GraphPatternOperation::Union(left, right) => {
                left.write_indented(f, indentation)?;
                write!(f, " UNION ")?;
                right.write_indented(f, indentation)
            }
            GraphPatternOperation::Subquery(query) => write!(f, "{outer}{query}"),
            GraphPatternOperation::TransPath {
                left,
                right,
                min,
                max,
                pattern,
            } => {
                write!(
                    f,
                    "{outer}TRANS PATH from {left} to {right} with at least {min} and at most {max} steps of "
                )?;
                pattern.write_indented(f, indentation)
            }
        }
    }
}

impl fmt::Display for GraphPatternOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_renders_fixed_equality() {
        let filter = SparqlFilter::new(FilterType::Eq, "?x", "?y");
        assert_eq!(filter.to_string(), "FILTER(?x = ?y)");
        let lt = SparqlFilter::new(FilterType::Lt, "?x", "\"10\"");
        assert_eq!(lt.to_string(), "FILTER(?x < \"10\")");
    }

    #[test]
    fn test_filter_regex_ignore_case() {
        let mut filter = SparqlFilter::new(FilterType::Regex, "?name", "\"^ad\"");
        filter.regex_ignore_case = true;
        assert_eq!(filter.to_string(), "FILTER(?name REGEX ignoring case \"^ad\")");
    }

    #[test]
    fn test_triple_renders_path() {
        let triple = SparqlTriple::new(
            "?s",
            PropertyPath::transitive(PropertyPath::iri("<knows>")),
            "?o",
        );
        assert_eq!(triple.to_string(), "{s: ?s, p: (<knows>)*, o: ?o}");
    }

    #[test]
    fn test_pattern_dump_contains_members() {
        let mut pattern = GraphPattern::new();
        pattern
            .triples
            .push(SparqlTriple::new("?s", PropertyPath::iri("<p>"), "?o"));
        pattern
            .filters
            .push(SparqlFilter::new(FilterType::Ne, "?s", "?o"));
        let mut inner = GraphPattern::new();
        inner.optional = true;
        pattern
            .children
            .push(GraphPatternOperation::Optional(inner));

        let dump = pattern.to_string();
        assert!(dump.contains("{s: ?s, p: <p>, o: ?o}"));
        assert!(dump.contains("FILTER(?s != ?o)"));
        assert!(dump.contains("OPTIONAL"));
    }
}
