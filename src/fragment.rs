//! Raw fragments as they come out of the document store.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::attribute::AttributeValue;

/// One undecoded document as received from a raw series source.
///
/// Structural fields (`timestamps`, `values`) are optional so that a malformed
/// document still decodes and the converter can report what is missing.
/// Every other document field lands in `fields`. An `id` that is not a UUID
/// is kept in `fields` as well.
///
/// ```json
/// {"id": "…", "timestamps": [1, 2], "values": [10.0, 20.0], "name": "Load", "host": "h1"}
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "StoredDocument")]
pub struct RawFragment {
    /// Document identifier assigned by the store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    /// Point timestamps in epoch milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamps: Option<Vec<i64>>,
    /// Point values, parallel to `timestamps`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<f64>>,
    /// Remaining document fields.
    #[serde(flatten)]
    pub fields: BTreeMap<String, AttributeValue>,
}

#[derive(Deserialize)]
struct StoredDocument {
    #[serde(default)]
    timestamps: Option<Vec<i64>>,
    #[serde(default)]
    values: Option<Vec<f64>>,
    #[serde(flatten)]
    fields: BTreeMap<String, AttributeValue>,
}

impl From<StoredDocument> for RawFragment {
    fn from(document: StoredDocument) -> Self {
        let mut fields = document.fields;
        let id = match fields.get("id").and_then(AttributeValue::as_str) {
            Some(raw) => Uuid::parse_str(raw).ok(),
            None => None,
        };
        if id.is_some() {
            fields.remove("id");
        }
        Self {
            id,
            timestamps: document.timestamps,
            values: document.values,
            fields,
        }
    }
}

impl RawFragment {
    /// Creates an empty fragment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the document id.
    #[must_use]
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = Some(id);
        self
    }

    /// Sets the points from `(timestamp, value)` pairs.
    #[must_use]
    pub fn with_points(mut self, points: impl IntoIterator<Item = (i64, f64)>) -> Self {
        let (timestamps, values): (Vec<i64>, Vec<f64>) = points.into_iter().unzip();
        self.timestamps = Some(timestamps);
        self.values = Some(values);
        self
    }

    /// Sets one document field.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Looks up a field by name.
    ///
    /// `id` resolves to the document id rendered as a string, or to a
    /// non-UUID `id` field when the document has no UUID.
    pub fn field(&self, name: &str) -> Option<AttributeValue> {
        if name == "id"
            && let Some(id) = self.id
        {
            return Some(AttributeValue::String(id.to_string()));
        }
        self.fields.get(name).cloned()
    }
}
