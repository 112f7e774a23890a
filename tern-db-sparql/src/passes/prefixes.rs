//! Prefix expansion.
//!
//! Rewrites every `prefix:localname` shortcut in the tree to its full
//! bracketed IRI, using the query's PREFIX declarations plus the
//! reserved engine prefix. Subqueries inherit the parent's declarations
//! and are expanded recursively in their own scope.

use hashbrown::HashMap;

use crate::ast::{
    GraphPattern, GraphPatternOperation, ParsedQuery, PathKind, PropertyPath, SparqlPrefix,
};
use crate::error::{ParseError, Result};

/// Reserved prefix available in every query without a declaration.
pub const INTERNAL_PREFIX: &str = "ql";

/// IRI the reserved prefix resolves to; engine-internal magic predicates
/// (text search, language filters) live under it.
pub const INTERNAL_PREFIX_IRI: &str = "<tern-internal-function/>";

/// Canonical form of a predicate restricted to one language: the
/// annotation wraps the expanded IRI.
pub fn to_language_tagged_predicate(iri: &str, lang: &str) -> String {
    format!("@{lang}@{iri}")
}

impl ParsedQuery {
    /// Expand `prefix:localname` shortcuts everywhere in the query.
    ///
    /// After this pass no IRI position contains a shortcut whose prefix
    /// is declared; undeclared prefixes are left untouched for the
    /// planner to reject.
    pub fn expand_prefixes(&mut self) -> Result<()> {
        let mut map: HashMap<String, String> = HashMap::new();
        map.insert(INTERNAL_PREFIX.to_string(), INTERNAL_PREFIX_IRI.to_string());
        for prefix in &self.prefixes {
            map.insert(prefix.prefix.clone(), prefix.iri.clone());
        }
        let declared = self.prefixes.clone();
        expand_pattern(&mut self.root, &map, &declared)?;
        tracing::trace!(prefixes = map.len(), "expanded query prefixes");
        Ok(())
    }
}

fn expand_pattern(
    pattern: &mut GraphPattern,
    map: &HashMap<String, String>,
    declared: &[SparqlPrefix],
) -> Result<()> {
    for op in &mut pattern.children {
        match op {
            GraphPatternOperation::Subquery(query) => {
                // The subquery inherits the declarations and expands in
                // its own scope; pattern ids are not shared.
                query.prefixes = declared.to_vec();
                query.expand_prefixes()?;
            }
            GraphPatternOperation::Optional(child) => expand_pattern(child, map, declared)?,
            GraphPatternOperation::Union(left, right) => {
                expand_pattern(left, map, declared)?;
                expand_pattern(right, map, declared)?;
            }
            GraphPatternOperation::TransPath { pattern: child, .. } => {
                expand_pattern(child, map, declared)?
            }
        }
    }

    for triple in &mut pattern.triples {
        expand_term(&mut triple.s, map)?;
        expand_path(&mut triple.p, map)?;
        let in_context = matches!(&triple.p.kind, PathKind::Iri(iri) if iri.contains("in-context"));
        if in_context {
            // Text-search objects hold space-separated words; each one is
            // expanded on its own.
            let mut tokens: Vec<String> = triple.o.split(' ').map(str::to_string).collect();
            for token in &mut tokens {
                expand_term(token, map)?;
            }
            triple.o = tokens.join(" ");
        } else {
            expand_term(&mut triple.o, map)?;
        }
    }

    for filter in &mut pattern.filters {
        expand_term(&mut filter.lhs, map)?;
        expand_term(&mut filter.rhs, map)?;
    }
    Ok(())
}

fn expand_path(path: &mut PropertyPath, map: &HashMap<String, String>) -> Result<()> {
    path.for_each_iri_mut(&mut |iri| expand_term(iri, map))
}

/// Expand a single term in IRI position.
///
/// Variables and bracketed IRIs pass through. A leading `@lang@`
/// annotation is stripped and reapplied around the expanded predicate.
/// In `"literal"^^prefix:local` only the datatype part is rewritten.
pub(crate) fn expand_term(term: &mut String, map: &HashMap<String, String>) -> Result<()> {
    if term.starts_with('?') || term.starts_with('<') {
        return Ok(());
    }
    let mut langtag: Option<String> = None;
    if let Some(rest) = term.strip_prefix('@') {
        let Some(second) = rest.find('@') else {
            return Err(ParseError::MissingLanguageDelimiter(term.clone()));
        };
        langtag = Some(rest[..second].to_string());
        *term = rest[second + 1..].to_string();
    }

    // Skip over a datatype marker so the colon of `^^prefix:local` is
    // found instead of one inside the literal.
    let from = term.find("^^").map(|pos| pos + 2).unwrap_or(0);
    if let Some(rel) = term[from..].find(':') {
        let colon = from + rel;
        if let Some(uri) = map.get(&term[from..colon]) {
            // Drop the IRI's closing bracket, splice in the local part.
            *term = format!(
                "{}{}{}>",
                &term[..from],
                &uri[..uri.len() - 1],
                &term[colon + 1..]
            );
        }
    }

    if let Some(lang) = langtag {
        *term = to_language_tagged_predicate(term, &lang);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::SparqlTriple;

    fn example_map() -> HashMap<String, String> {
        let mut map = HashMap::new();
        map.insert("ex".to_string(), "<http://example.org/>".to_string());
        map
    }

    fn expand(term: &str) -> Result<String> {
        let mut term = term.to_string();
        expand_term(&mut term, &example_map())?;
        Ok(term)
    }

    #[test]
    fn test_variables_and_iris_untouched() {
        assert_eq!(expand("?s").unwrap(), "?s");
        assert_eq!(expand("<http://x>").unwrap(), "<http://x>");
    }

    #[test]
    fn test_shortcut_expansion() {
        assert_eq!(expand("ex:knows").unwrap(), "<http://example.org/knows>");
        assert_eq!(expand("ex:alice").unwrap(), "<http://example.org/alice>");
    }

    #[test]
    fn test_unknown_prefix_left_alone() {
        assert_eq!(expand("nope:thing").unwrap(), "nope:thing");
    }

    #[test]
    fn test_datatype_suffix_expansion() {
        assert_eq!(
            expand("\"5\"^^ex:int").unwrap(),
            "\"5\"^^<http://example.org/int>"
        );
    }

    #[test]
    fn test_language_annotation_round_trip() {
        assert_eq!(
            expand("@en@ex:label").unwrap(),
            "@en@<http://example.org/label>"
        );
        // Already-expanded predicate keeps its annotation too.
        assert_eq!(expand("@en@<http://x>").unwrap(), "@en@<http://x>");
    }

    #[test]
    fn test_missing_language_delimiter_fails() {
        assert!(matches!(
            expand("@en-only"),
            Err(ParseError::MissingLanguageDelimiter(_))
        ));
    }

    #[test]
    fn test_full_query_expansion() {
        let mut query = ParsedQuery::new();
        query
            .prefixes
            .push(SparqlPrefix::new("ex", "<http://example.org/>"));
        query.root.triples.push(SparqlTriple::new(
            "?s",
            PropertyPath::iri("ex:knows"),
            "ex:alice",
        ));
        query.expand_prefixes().unwrap();

        let triple = &query.root.triples[0];
        assert_eq!(triple.s, "?s");
        assert_eq!(triple.p, PropertyPath::iri("<http://example.org/knows>"));
        assert_eq!(triple.o, "<http://example.org/alice>");
    }

    #[test]
    fn test_path_leaves_expanded_independently() {
        let mut query = ParsedQuery::new();
        query
            .prefixes
            .push(SparqlPrefix::new("ex", "<http://example.org/>"));
        query.root.triples.push(SparqlTriple::new(
            "?s",
            PropertyPath::sequence(
                PropertyPath::iri("ex:a"),
                PropertyPath::transitive(PropertyPath::iri("ex:b")),
            ),
            "?o",
        ));
        query.expand_prefixes().unwrap();
        assert_eq!(
            query.root.triples[0].p.to_string(),
            "(<http://example.org/a>)/((<http://example.org/b>)*)"
        );
    }

    #[test]
    fn test_in_context_object_tokenized() {
        let mut query = ParsedQuery::new();
        query
            .prefixes
            .push(SparqlPrefix::new("ex", "<http://example.org/>"));
        query.root.triples.push(SparqlTriple::new(
            "?t",
            PropertyPath::iri("<word-in-context>"),
            "ex:alice ex:bob plain",
        ));
        query.expand_prefixes().unwrap();
        assert_eq!(
            query.root.triples[0].o,
            "<http://example.org/alice> <http://example.org/bob> plain"
        );
    }

    #[test]
    fn test_reserved_prefix_always_available() {
        let mut query = ParsedQuery::new();
        query.root.triples.push(SparqlTriple::new(
            "?s",
            PropertyPath::iri("ql:contains-word"),
            "?o",
        ));
        query.expand_prefixes().unwrap();
        assert_eq!(
            query.root.triples[0].p,
            PropertyPath::iri("<tern-internal-function/contains-word>")
        );
    }

    #[test]
    fn test_subquery_inherits_prefixes() {
        let mut sub = ParsedQuery::new();
        sub.root.triples.push(SparqlTriple::new(
            "?x",
            PropertyPath::iri("ex:inner"),
            "?y",
        ));

        let mut query = ParsedQuery::new();
        query
            .prefixes
            .push(SparqlPrefix::new("ex", "<http://example.org/>"));
        query
            .root
            .children
            .push(GraphPatternOperation::Subquery(Box::new(sub)));
        query.expand_prefixes().unwrap();

        if let GraphPatternOperation::Subquery(sub) = &query.root.children[0] {
            assert_eq!(sub.prefixes.len(), 1);
            assert_eq!(
                sub.root.triples[0].p,
                PropertyPath::iri("<http://example.org/inner>")
            );
        } else {
            panic!("expected subquery");
        }
    }

    #[test]
    fn test_filters_expanded() {
        use crate::ast::{FilterType, SparqlFilter};
        let mut query = ParsedQuery::new();
        query
            .prefixes
            .push(SparqlPrefix::new("ex", "<http://example.org/>"));
        query
            .root
            .filters
            .push(SparqlFilter::new(FilterType::Eq, "?x", "ex:alice"));
        query.expand_prefixes().unwrap();
        assert_eq!(query.root.filters[0].rhs, "<http://example.org/alice>");
    }
}
