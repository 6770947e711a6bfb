//! Conversion of raw fragments into time series.

use std::collections::BTreeMap;

use crate::error::ConversionError;
use crate::fragment::RawFragment;
use crate::timeseries::TimeSeries;

/// Maps one raw fragment into one logical time series.
///
/// Implementations must be pure: no side effects, and no reference to the
/// fragment may outlive the call. The fragment is taken by value for that
/// reason.
pub trait SeriesConverter {
    /// Raw record type accepted by this converter.
    type Fragment;
    /// Timestamp type of the produced series.
    type Time;
    /// Value type of the produced series.
    type Value;

    /// Converts a fragment.
    fn convert(
        &self,
        fragment: Self::Fragment,
    ) -> Result<TimeSeries<Self::Time, Self::Value>, ConversionError>;
}

impl<C: SeriesConverter + ?Sized> SeriesConverter for &C {
    type Fragment = C::Fragment;
    type Time = C::Time;
    type Value = C::Value;

    fn convert(
        &self,
        fragment: Self::Fragment,
    ) -> Result<TimeSeries<Self::Time, Self::Value>, ConversionError> {
        (**self).convert(fragment)
    }
}

/// Converts [`RawFragment`] documents into `TimeSeries<i64, f64>`.
///
/// Every document field becomes an attribute. Attributes declared with
/// [`require`](Self::require) must be present or conversion fails.
#[derive(Debug, Clone)]
pub struct DocumentConverter {
    required: Vec<String>,
    include_id: bool,
}

impl Default for DocumentConverter {
    fn default() -> Self {
        Self {
            required: Vec::new(),
            include_id: true,
        }
    }
}

impl DocumentConverter {
    /// Creates a converter with no required attributes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares an attribute that every document must carry.
    #[must_use]
    pub fn require(mut self, attribute: impl Into<String>) -> Self {
        self.required.push(attribute.into());
        self
    }

    /// Controls whether the document id is copied into the `id` attribute.
    #[must_use]
    pub fn include_id(mut self, include: bool) -> Self {
        self.include_id = include;
        self
    }

    /// Attributes declared as required.
    pub fn required(&self) -> &[String] {
        &self.required
    }
}

impl SeriesConverter for DocumentConverter {
    type Fragment = RawFragment;
    type Time = i64;
    type Value = f64;

    fn convert(&self, fragment: RawFragment) -> Result<TimeSeries<i64, f64>, ConversionError> {
        let RawFragment {
            id,
            timestamps,
            values,
            fields,
        } = fragment;

        let timestamps = timestamps.ok_or(ConversionError::MissingField("timestamps"))?;
        let values = values.ok_or(ConversionError::MissingField("values"))?;
        if timestamps.len() != values.len() {
            return Err(ConversionError::LengthMismatch {
                timestamps: timestamps.len(),
                values: values.len(),
            });
        }

        for name in &self.required {
            let present = fields.contains_key(name) || (name == "id" && id.is_some());
            if !present {
                return Err(ConversionError::MissingAttribute(name.clone()));
            }
        }

        let mut attributes: BTreeMap<_, _> = fields;
        if self.include_id
            && let Some(id) = id
        {
            attributes.insert("id".to_string(), id.to_string().into());
        }

        Ok(TimeSeries::new(timestamps.into_iter().zip(values), attributes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::AttributeValue;
    use uuid::Uuid;

    fn load_fragment() -> RawFragment {
        RawFragment::new()
            .with_points(vec![(2, 20.0), (1, 10.0)])
            .with_field("name", "Load")
            .with_field("host", "h1")
    }

    #[test]
    fn test_convert_well_formed_fragment() {
        let series = DocumentConverter::new().convert(load_fragment()).unwrap();
        assert_eq!(series.points(), &[(1, 10.0), (2, 20.0)]);
        assert_eq!(series.attribute("name"), Some(&AttributeValue::from("Load")));
        assert_eq!(series.attribute("host"), Some(&AttributeValue::from("h1")));
    }

    #[test]
    fn test_missing_timestamps() {
        let mut fragment = load_fragment();
        fragment.timestamps = None;
        let err = DocumentConverter::new().convert(fragment).unwrap_err();
        assert_eq!(err, ConversionError::MissingField("timestamps"));
    }

    #[test]
    fn test_missing_values() {
        let mut fragment = load_fragment();
        fragment.values = None;
        let err = DocumentConverter::new().convert(fragment).unwrap_err();
        assert_eq!(err, ConversionError::MissingField("values"));
    }

    #[test]
    fn test_length_mismatch() {
        let mut fragment = load_fragment();
        fragment.values = Some(vec![1.0]);
        let err = DocumentConverter::new().convert(fragment).unwrap_err();
        assert_eq!(
            err,
            ConversionError::LengthMismatch {
                timestamps: 2,
                values: 1
            }
        );
    }

    #[test]
    fn test_required_attribute() {
        let converter = DocumentConverter::new().require("name").require("metric");
        let err = converter.convert(load_fragment()).unwrap_err();
        assert_eq!(err, ConversionError::MissingAttribute("metric".into()));

        let converter = DocumentConverter::new().require("name").require("host");
        assert!(converter.convert(load_fragment()).is_ok());
    }

    #[test]
    fn test_id_attribute() {
        let id = Uuid::new_v4();
        let fragment = load_fragment().with_id(id);

        let series = DocumentConverter::new().convert(fragment.clone()).unwrap();
        assert_eq!(
            series.attribute("id"),
            Some(&AttributeValue::String(id.to_string()))
        );

        let series = DocumentConverter::new()
            .include_id(false)
            .convert(fragment)
            .unwrap();
        assert!(series.attribute("id").is_none());
    }
}
