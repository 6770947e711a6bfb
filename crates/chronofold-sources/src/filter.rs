//! Document filters shared by the bundled sources.
//!
//! The language is a small subset of the usual document-store syntax:
//!
//! - `*:*` matches every document
//! - `field:pattern` matches when the field's string form matches the glob
//!   `pattern` (`*`, `?`, `[..]` and `{a,b}` are supported)
//! - clauses joined with ` AND ` must all match
//!
//! A missing field never matches. A multi-valued field matches if any element
//! matches.

use chronofold::{AttributeValue, RawFragment, SourceError};
use globset::{Glob, GlobMatcher};

#[derive(Debug, Clone)]
struct Clause {
    field: String,
    matcher: GlobMatcher,
}

/// A parsed document filter.
#[derive(Debug, Clone)]
pub struct Filter {
    clauses: Vec<Clause>,
}

impl Filter {
    /// Parses a filter expression.
    pub fn parse(expression: &str) -> Result<Self, SourceError> {
        let invalid = |reason: String| SourceError::InvalidQuery {
            query: expression.to_string(),
            reason,
        };

        let expression = expression.trim();
        if expression.is_empty() {
            return Err(invalid("empty filter".to_string()));
        }

        let mut clauses = Vec::new();
        for clause in expression.split(" AND ") {
            let clause = clause.trim();
            let (field, pattern) = clause
                .split_once(':')
                .ok_or_else(|| invalid(format!("expected `field:pattern`, got `{clause}`")))?;
            if field.is_empty() || pattern.is_empty() {
                return Err(invalid(format!("incomplete clause `{clause}`")));
            }
            if field == "*" && pattern == "*" {
                continue;
            }
            if field == "*" {
                return Err(invalid("field wildcards are only allowed in `*:*`".to_string()));
            }
            let matcher = Glob::new(pattern)
                .map_err(|err| invalid(err.to_string()))?
                .compile_matcher();
            clauses.push(Clause {
                field: field.to_string(),
                matcher,
            });
        }

        Ok(Self { clauses })
    }

    /// Returns `true` if this filter matches every document.
    pub fn matches_all(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Tests one document.
    pub fn matches(&self, document: &RawFragment) -> bool {
        self.clauses.iter().all(|clause| {
            document
                .field(&clause.field)
                .is_some_and(|value| value_matches(&clause.matcher, &value))
        })
    }
}

fn value_matches(matcher: &GlobMatcher, value: &AttributeValue) -> bool {
    match value {
        AttributeValue::List(items) => items.iter().any(|item| value_matches(matcher, item)),
        other => matcher.is_match(other.to_string()),
    }
}
