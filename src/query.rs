//! Opaque query objects forwarded to raw series sources.

use std::fmt;

/// A request for raw fragments.
///
/// The engine never looks inside a `Query`; it only hands it to the source.
/// Parameters carry source-specific hints such as a server-side aggregation
/// (`cf = metric{max}`), which a source may or may not honor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    filter: String,
    params: Vec<(String, String)>,
}

impl Query {
    /// Query matching every document.
    pub const MATCH_ALL: &'static str = "*:*";

    /// Creates a query with the given filter expression.
    pub fn new(filter: impl Into<String>) -> Self {
        Self {
            filter: filter.into(),
            params: Vec::new(),
        }
    }

    /// Creates a query matching every document.
    pub fn all() -> Self {
        Self::new(Self::MATCH_ALL)
    }

    /// Sets a parameter, replacing any earlier value for the same name.
    #[must_use]
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.params.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.params.push((name, value)),
        }
        self
    }

    /// The filter expression.
    pub fn filter(&self) -> &str {
        &self.filter
    }

    /// Looks up a parameter.
    pub fn get_param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// All parameters in insertion order.
    pub fn params(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q={}", self.filter)?;
        for (name, value) in &self.params {
            write!(f, "&{name}={value}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_replace_and_display() {
        let query = Query::new("name:*Load*")
            .param("cf", "metric{min}")
            .param("cf", "metric{max}")
            .param("rows", "10");
        assert_eq!(query.get_param("cf"), Some("metric{max}"));
        assert_eq!(query.params().count(), 2);
        assert_eq!(query.to_string(), "q=name:*Load*&cf=metric{max}&rows=10");
    }

    #[test]
    fn test_match_all() {
        assert_eq!(Query::all().filter(), "*:*");
        assert_eq!(Query::all().get_param("cf"), None);
    }
}
