//! Alias parsing for the SELECT clause and ORDER BY keys.
//!
//! A selected variable of the form `(AGG(?in) AS ?out)` is recorded as an
//! [`Alias`] and the select slot is rewritten to the bare output
//! variable. ORDER BY keys get the same treatment, keeping their
//! direction.

use crate::ast::{Alias, ParsedQuery};
use crate::error::{ParseError, Result};

/// Aggregate functions an alias may start with (case-insensitive).
const AGGREGATE_KEYWORDS: [&str; 9] = [
    "count",
    "group_concat",
    "first",
    "last",
    "sample",
    "min",
    "max",
    "sum",
    "avg",
];

impl ParsedQuery {
    /// Parse every parenthesized select entry and ORDER BY key into an
    /// alias, rewriting the slot to the output variable.
    pub fn parse_aliases(&mut self) -> Result<()> {
        for i in 0..self.selected_variables.len() {
            if self.selected_variables[i].starts_with('(') {
                let inner = strip_parentheses(&self.selected_variables[i])?;
                self.selected_variables[i] = self.parse_alias(&inner)?;
            }
        }
        for i in 0..self.order_by.len() {
            if self.order_by[i].key.starts_with('(') {
                let inner = strip_parentheses(&self.order_by[i].key)?;
                // Direction survives; only the key name changes.
                self.order_by[i].key = self.parse_alias(&inner)?;
            }
        }
        Ok(())
    }

    /// Parse one alias body (parentheses already stripped) and register
    /// it. Returns the output variable name.
    fn parse_alias(&mut self, inner: &str) -> Result<String> {
        let lower = inner.to_lowercase();
        if !AGGREGATE_KEYWORDS
            .iter()
            .any(|keyword| lower.starts_with(keyword))
        {
            return Err(ParseError::UnknownAlias(inner.to_string()));
        }

        let as_pos = lower
            .find(" as ")
            .ok_or_else(|| ParseError::MissingAsKeyword(inner.to_string()))?;
        let out_var = inner[as_pos + 4..].trim().to_string();

        let open = inner[..as_pos]
            .find('(')
            .ok_or_else(|| ParseError::MissingInputVariable(inner.to_string()))?;
        let body = &inner[open + 1..as_pos];
        let mut tokens = body.split_whitespace();
        let mut token = tokens
            .next()
            .ok_or_else(|| ParseError::MissingInputVariable(inner.to_string()))?;
        if token.eq_ignore_ascii_case("distinct") {
            token = tokens
                .next()
                .ok_or_else(|| ParseError::MissingInputVariable(inner.to_string()))?;
        } else if token.len() > 8 && token[..8].eq_ignore_ascii_case("distinct") {
            token = &token[8..];
        }
        let in_var = token.trim_end_matches(')').trim();
        if in_var.is_empty() {
            return Err(ParseError::MissingInputVariable(inner.to_string()));
        }

        let alias = Alias {
            is_aggregate: true,
            in_var: in_var.to_string(),
            out_var: out_var.clone(),
            function: inner.to_string(),
        };
        for other in &self.aliases {
            if other.out_var == alias.out_var {
                if other.is_aggregate != alias.is_aggregate || other.function != alias.function {
                    return Err(ParseError::ConflictingAlias(alias.out_var));
                }
                // Identical alias already registered; nothing to add.
                return Ok(out_var);
            }
        }
        self.aliases.push(alias);
        Ok(out_var)
    }
}

fn strip_parentheses(entry: &str) -> Result<String> {
    entry
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
        .map(str::to_string)
        .ok_or_else(|| ParseError::MissingParentheses(entry.to_string()))
}
