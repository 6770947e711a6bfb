//! Ready-made merge operators.
//!
//! All operators borrow both inputs and build a new series.

use crate::error::BoxError;
use crate::timeseries::TimeSeries;

/// Merges pointwise with `op`, see [`TimeSeries::merge_with`].
pub fn pointwise<K, V, F>(
    op: F,
) -> impl Fn(&TimeSeries<K, V>, &TimeSeries<K, V>) -> Result<TimeSeries<K, V>, BoxError> + Clone
where
    K: Ord + Clone,
    V: Clone,
    F: Fn(&V, &V) -> V + Clone,
{
    move |left: &TimeSeries<K, V>, right: &TimeSeries<K, V>| {
        Ok(TimeSeries::merge_with(left, right, &op))
    }
}

/// Pointwise mean of the two values: `(a + b) / 2`.
///
/// Note that folding three or more series this way weights later series more
/// heavily; it is not the mean over all inputs.
pub fn average<K>()
-> impl Fn(&TimeSeries<K, f64>, &TimeSeries<K, f64>) -> Result<TimeSeries<K, f64>, BoxError> + Clone
where
    K: Ord + Clone,
{
    pointwise(|a: &f64, b: &f64| (a + b) / 2.0)
}

/// Pointwise maximum.
pub fn maximum<K>()
-> impl Fn(&TimeSeries<K, f64>, &TimeSeries<K, f64>) -> Result<TimeSeries<K, f64>, BoxError> + Clone
where
    K: Ord + Clone,
{
    pointwise(|a: &f64, b: &f64| a.max(*b))
}

/// Pointwise minimum.
pub fn minimum<K>()
-> impl Fn(&TimeSeries<K, f64>, &TimeSeries<K, f64>) -> Result<TimeSeries<K, f64>, BoxError> + Clone
where
    K: Ord + Clone,
{
    pointwise(|a: &f64, b: &f64| a.min(*b))
}

/// Concatenates both point lists.
///
/// Points sharing a timestamp are all kept, left ones first. Attributes are
/// unioned with the left series winning.
pub fn concat<K, V>()
-> impl Fn(&TimeSeries<K, V>, &TimeSeries<K, V>) -> Result<TimeSeries<K, V>, BoxError> + Clone
where
    K: Ord + Clone,
    V: Clone,
{
    |left: &TimeSeries<K, V>, right: &TimeSeries<K, V>| {
        let mut attributes = right.attributes().clone();
        attributes.extend(
            left.attributes()
                .iter()
                .map(|(name, value)| (name.clone(), value.clone())),
        );
        let points = left.points().iter().chain(right.points()).cloned();
        Ok(TimeSeries::new(points, attributes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average() {
        let a = TimeSeries::from_points([(1i64, 10.0)]);
        let b = TimeSeries::from_points([(1i64, 20.0)]);
        let merged = average()(&a, &b).unwrap();
        assert_eq!(merged.points(), &[(1, 15.0)]);
    }

    #[test]
    fn test_average_is_idempotent() {
        let a = TimeSeries::from_points([(1i64, 10.0), (2, 3.0)]).with_attribute("host", "h1");
        let merged = average()(&a, &a).unwrap();
        assert_eq!(merged, a);
    }

    #[test]
    fn test_maximum_and_minimum() {
        let a = TimeSeries::from_points([(1i64, 10.0), (2, 1.0)]);
        let b = TimeSeries::from_points([(1i64, 5.0), (2, 7.0)]);
        assert_eq!(maximum()(&a, &b).unwrap().points(), &[(1, 10.0), (2, 7.0)]);
        assert_eq!(minimum()(&a, &b).unwrap().points(), &[(1, 5.0), (2, 1.0)]);
    }

    #[test]
    fn test_concat_keeps_duplicates_left_first() {
        let a = TimeSeries::from_points([(1i64, "a1"), (3, "a3")]).with_attribute("src", "a");
        let b = TimeSeries::from_points([(1i64, "b1"), (2, "b2")]).with_attribute("src", "b");
        let merged = concat()(&a, &b).unwrap();
        assert_eq!(
            merged.points(),
            &[(1, "a1"), (1, "b1"), (2, "b2"), (3, "a3")]
        );
        assert_eq!(merged.attribute("src").unwrap().to_string(), "a");
    }
}
