//! The logical time series value produced by converters and merged by the engine.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::attribute::AttributeValue;

/// An ordered sequence of `(timestamp, value)` points with string-keyed attributes.
///
/// A `TimeSeries` is immutable once constructed. Merging two series always
/// produces a new instance; neither input is touched.
///
/// # Type Parameters
///
/// - `K`: timestamp type, ordered (`i64` milliseconds for stored documents)
/// - `V`: value type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    from = "SeriesParts<K, V>",
    bound(deserialize = "K: Ord + Deserialize<'de>, V: Deserialize<'de>")
)]
pub struct TimeSeries<K, V> {
    points: Vec<(K, V)>,
    attributes: BTreeMap<String, AttributeValue>,
}

// Decoded form; converted through `TimeSeries::new` so points end up sorted.
#[derive(Deserialize)]
struct SeriesParts<K, V> {
    points: Vec<(K, V)>,
    #[serde(default)]
    attributes: BTreeMap<String, AttributeValue>,
}

impl<K: Ord, V> From<SeriesParts<K, V>> for TimeSeries<K, V> {
    fn from(parts: SeriesParts<K, V>) -> Self {
        Self::new(parts.points, parts.attributes)
    }
}

impl<K: Ord, V> TimeSeries<K, V> {
    /// Creates a series from points and attributes.
    ///
    /// Points are sorted by timestamp. The sort is stable, so points sharing
    /// a timestamp keep their relative order.
    pub fn new(
        points: impl IntoIterator<Item = (K, V)>,
        attributes: BTreeMap<String, AttributeValue>,
    ) -> Self {
        let mut points: Vec<(K, V)> = points.into_iter().collect();
        points.sort_by(|a, b| a.0.cmp(&b.0));
        Self { points, attributes }
    }

    /// Creates a series with no attributes.
    pub fn from_points(points: impl IntoIterator<Item = (K, V)>) -> Self {
        Self::new(points, BTreeMap::new())
    }

    /// Value of the series read as a step function at `timestamp`.
    ///
    /// That is the value of the last point at or before `timestamp`, or `None`
    /// if the series starts later.
    pub fn value_at(&self, timestamp: &K) -> Option<&V> {
        let idx = self.points.partition_point(|(t, _)| t <= timestamp);
        if idx == 0 {
            None
        } else {
            Some(&self.points[idx - 1].1)
        }
    }
}

impl<K, V> TimeSeries<K, V> {
    /// Returns a copy of this series with one more attribute set.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Returns the points in timestamp order.
    pub fn points(&self) -> &[(K, V)] {
        &self.points
    }

    /// Iterates over the timestamps.
    pub fn timestamps(&self) -> impl Iterator<Item = &K> {
        self.points.iter().map(|(t, _)| t)
    }

    /// Iterates over the values.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.points.iter().map(|(_, v)| v)
    }

    /// Returns all attributes.
    pub fn attributes(&self) -> &BTreeMap<String, AttributeValue> {
        &self.attributes
    }

    /// Returns one attribute by name.
    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns `true` if the series has no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// First timestamp, if any.
    pub fn start(&self) -> Option<&K> {
        self.points.first().map(|(t, _)| t)
    }

    /// Last timestamp, if any.
    pub fn end(&self) -> Option<&K> {
        self.points.last().map(|(t, _)| t)
    }

    /// Splits the series into its parts.
    pub fn into_parts(self) -> (Vec<(K, V)>, BTreeMap<String, AttributeValue>) {
        (self.points, self.attributes)
    }
}

impl<K: Ord + Clone, V: Clone> TimeSeries<K, V> {
    /// Merges two series pointwise into a new series.
    ///
    /// The result's timestamps are the sorted union of both inputs. Each input
    /// is read as a step function (see [`value_at`](Self::value_at)); where
    /// both have a value, `op(left, right)` is emitted, otherwise the single
    /// available value is carried over. Attributes are unioned, the left
    /// series winning on conflicting names.
    pub fn merge_with<F>(left: &Self, right: &Self, mut op: F) -> Self
    where
        F: FnMut(&V, &V) -> V,
    {
        let mut points = Vec::with_capacity(left.len().max(right.len()));
        let (mut i, mut j) = (0, 0);
        let mut last_left: Option<&V> = None;
        let mut last_right: Option<&V> = None;

        while i < left.points.len() || j < right.points.len() {
            let next_left = left.points.get(i).map(|(t, _)| t);
            let next_right = right.points.get(j).map(|(t, _)| t);

            // Pick the smallest pending timestamp and advance every cursor sitting on it.
            let timestamp = match (next_left, next_right) {
                (Some(a), Some(b)) => a.min(b).clone(),
                (Some(a), None) => a.clone(),
                (None, Some(b)) => b.clone(),
                (None, None) => break,
            };
            while let Some((t, v)) = left.points.get(i) {
                if *t != timestamp {
                    break;
                }
                last_left = Some(v);
                i += 1;
            }
            while let Some((t, v)) = right.points.get(j) {
                if *t != timestamp {
                    break;
                }
                last_right = Some(v);
                j += 1;
            }

            let value = match (last_left, last_right) {
                (Some(a), Some(b)) => op(a, b),
                (Some(a), None) => a.clone(),
                (None, Some(b)) => b.clone(),
                (None, None) => continue,
            };
            points.push((timestamp, value));
        }

        let mut attributes = right.attributes.clone();
        for (name, value) in &left.attributes {
            attributes.insert(name.clone(), value.clone());
        }

        Self { points, attributes }
    }
}

#[cfg(feature = "chrono")]
impl<V> TimeSeries<i64, V> {
    /// First timestamp as a UTC date-time, reading timestamps as epoch milliseconds.
    pub fn start_time(&self) -> Option<chrono_v0_4::DateTime<chrono_v0_4::Utc>> {
        self.start()
            .and_then(|ms| chrono_v0_4::DateTime::from_timestamp_millis(*ms))
    }

    /// Last timestamp as a UTC date-time, reading timestamps as epoch milliseconds.
    pub fn end_time(&self) -> Option<chrono_v0_4::DateTime<chrono_v0_4::Utc>> {
        self.end()
            .and_then(|ms| chrono_v0_4::DateTime::from_timestamp_millis(*ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn avg(a: &f64, b: &f64) -> f64 {
        (a + b) / 2.0
    }

    #[test]
    fn test_deserialize_sorts_points() {
        let json = r#"{"points":[[3,30.0],[1,10.0]],"attributes":{"host":"h1"}}"#;
        let ts: TimeSeries<i64, f64> = serde_json::from_str(json).unwrap();
        assert_eq!(ts.points(), &[(1, 10.0), (3, 30.0)]);
        assert_eq!(ts.value_at(&3), Some(&30.0));
        assert_eq!(ts.attribute("host").unwrap().to_string(), "h1");

        let other = TimeSeries::from_points(vec![(2, 20.0)]);
        let merged = TimeSeries::merge_with(&ts, &other, avg);
        assert_eq!(merged.points(), &[(1, 10.0), (2, 15.0), (3, 25.0)]);
    }

    #[test]
    fn test_new_sorts_points() {
        let ts = TimeSeries::from_points(vec![(3, 30.0), (1, 10.0), (2, 20.0)]);
        assert_eq!(ts.points(), &[(1, 10.0), (2, 20.0), (3, 30.0)]);
        assert_eq!(ts.start(), Some(&1));
        assert_eq!(ts.end(), Some(&3));
        assert_eq!(ts.len(), 3);
    }

    #[test]
    fn test_value_at_is_step_function() {
        let ts = TimeSeries::from_points(vec![(10, 1.0), (20, 2.0)]);
        assert_eq!(ts.value_at(&5), None);
        assert_eq!(ts.value_at(&10), Some(&1.0));
        assert_eq!(ts.value_at(&15), Some(&1.0));
        assert_eq!(ts.value_at(&25), Some(&2.0));
    }

    #[test]
    fn test_merge_same_timestamps_applies_operator() {
        let a = TimeSeries::from_points(vec![(1, 10.0)]);
        let b = TimeSeries::from_points(vec![(1, 20.0)]);
        let merged = TimeSeries::merge_with(&a, &b, avg);
        assert_eq!(merged.points(), &[(1, 15.0)]);
    }

    #[test]
    fn test_merge_interleaved_timestamps() {
        let a = TimeSeries::from_points(vec![(1, 10.0), (3, 30.0)]);
        let b = TimeSeries::from_points(vec![(2, 20.0), (4, 40.0)]);
        let merged = TimeSeries::merge_with(&a, &b, avg);

        // t=1: only a; t=2: a holds 10; t=3: b holds 20; t=4: a holds 30
        assert_eq!(
            merged.points(),
            &[(1, 10.0), (2, 15.0), (3, 25.0), (4, 35.0)]
        );
    }

    #[test]
    fn test_merge_does_not_touch_inputs() {
        let a = TimeSeries::from_points(vec![(1, 10.0)]).with_attribute("host", "h1");
        let b = TimeSeries::from_points(vec![(1, 20.0)]).with_attribute("host", "h2");
        let a_before = a.clone();
        let b_before = b.clone();

        let merged = TimeSeries::merge_with(&a, &b, avg);

        assert_eq!(a, a_before);
        assert_eq!(b, b_before);
        assert_eq!(merged.attribute("host"), Some(&AttributeValue::from("h1")));
    }

    #[test]
    fn test_merge_unions_attributes() {
        let a = TimeSeries::from_points(vec![(1, 1.0)]).with_attribute("name", "Load");
        let b = TimeSeries::from_points(vec![(1, 1.0)]).with_attribute("unit", "%");
        let merged = TimeSeries::merge_with(&a, &b, avg);
        assert_eq!(merged.attributes().len(), 2);
    }

    #[test]
    fn test_merge_with_self_is_idempotent_for_average() {
        let a = TimeSeries::from_points(vec![(1, 10.0), (2, 4.0), (5, 8.0)])
            .with_attribute("name", "Load");
        let merged = TimeSeries::merge_with(&a, &a, avg);
        assert_eq!(merged, a);
    }

    #[test]
    fn test_merge_with_empty() {
        let a = TimeSeries::from_points(vec![(1, 10.0)]);
        let empty = TimeSeries::<i64, f64>::from_points(Vec::new());
        assert_eq!(TimeSeries::merge_with(&a, &empty, avg).points(), a.points());
        assert_eq!(TimeSeries::merge_with(&empty, &a, avg).points(), a.points());
    }

    #[cfg(feature = "chrono")]
    #[test]
    fn test_start_time() {
        let ts = TimeSeries::from_points(vec![(1_609_459_200_000i64, 1.0)]);
        let start = ts.start_time().unwrap();
        assert_eq!(start.to_rfc3339(), "2021-01-01T00:00:00+00:00");
    }
}
