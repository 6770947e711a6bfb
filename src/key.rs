//! Ready-made group key functions.

use thiserror::Error;

use crate::error::BoxError;
use crate::timeseries::TimeSeries;

/// A key attribute is absent from the series being grouped.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("series has no `{0}` attribute to group by")]
pub struct MissingKeyAttribute(pub String);

/// Groups by the string form of one attribute.
pub fn attribute<K, V>(
    name: impl Into<String>,
) -> impl Fn(&TimeSeries<K, V>) -> Result<String, BoxError> + Clone {
    let name = name.into();
    move |series: &TimeSeries<K, V>| {
        series
            .attribute(&name)
            .map(ToString::to_string)
            .ok_or_else(|| MissingKeyAttribute(name.clone()).into())
    }
}

/// Groups by several attributes joined with `separator`.
///
/// `attributes(["name", "host"], "-")` keys a series with `name=Load, host=h1`
/// as `Load-h1`. Every listed attribute must be present.
pub fn attributes<K, V, I, S>(
    names: I,
    separator: &str,
) -> impl Fn(&TimeSeries<K, V>) -> Result<String, BoxError> + Clone
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let names: Vec<String> = names.into_iter().map(Into::into).collect();
    let separator = separator.to_string();
    move |series: &TimeSeries<K, V>| {
        let mut key = String::new();
        for (i, name) in names.iter().enumerate() {
            let value = series
                .attribute(name)
                .ok_or_else(|| MissingKeyAttribute(name.clone()))?;
            if i > 0 {
                key.push_str(&separator);
            }
            key.push_str(&value.to_string());
        }
        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series() -> TimeSeries<i64, f64> {
        TimeSeries::from_points([(1, 1.0)])
            .with_attribute("name", "Load")
            .with_attribute("host", "h1")
            .with_attribute("cores", 8i64)
    }

    #[test]
    fn test_single_attribute() {
        let key = attribute("host");
        assert_eq!(key(&series()).unwrap(), "h1");
    }

    #[test]
    fn test_joined_attributes() {
        let key = attributes(["name", "host", "cores"], "-");
        assert_eq!(key(&series()).unwrap(), "Load-h1-8");
    }

    #[test]
    fn test_missing_attribute_fails() {
        let key = attributes(["name", "region"], "-");
        let err = key(&series()).unwrap_err();
        assert_eq!(err.to_string(), "series has no `region` attribute to group by");
        assert!(err.downcast_ref::<MissingKeyAttribute>().is_some());
    }
}
