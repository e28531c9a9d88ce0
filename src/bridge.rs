//! Presentation boundary.
//!
//! The interactive grid is an external collaborator with a narrow interface:
//! it consumes the enriched table plus the hidden-column registry (to suppress
//! those columns by default, not to delete them) and returns the set of rows
//! the user checked. Pivot/group/sort mechanics live entirely in the widget.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::SanitizeResult;
use crate::types::{HiddenColumnRegistry, Table, Value};

/// Prefix of the field namespace the presentation layer may attach to selected
/// rows. Fields under it are bookkeeping, not data, and are stripped before a
/// selection becomes notification content.
pub const BOOKKEEPING_PREFIX: char = '_';

/// Field name under which bridge implementations record a selected row's
/// origin in the widget.
pub const ROW_ORIGIN_FIELD: &str = "_rowOrigin";

/// A single selected row: field records in the order the widget returned them,
/// bookkeeping fields included.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectedRow {
    /// Field name/value pairs in widget order.
    pub fields: Vec<(String, Value)>,
}

impl SelectedRow {
    /// An empty row record.
    pub fn new() -> Self {
        Self::default()
    }

    /// A row record starting with its widget-origin bookkeeping field.
    pub fn with_origin(origin: impl Into<String>) -> Self {
        Self {
            fields: vec![(ROW_ORIGIN_FIELD.to_string(), Value::Utf8(origin.into()))],
        }
    }

    /// Append a field.
    pub fn push(&mut self, name: impl Into<String>, value: Value) {
        self.fields.push((name.into(), value));
    }

    /// Look up a field by name (first match).
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }
}

// Selected rows cross the widget boundary as JSON objects, so they serialize
// as maps rather than as the underlying pair list.
impl Serialize for SelectedRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for SelectedRow {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RowVisitor;

        impl<'de> Visitor<'de> for RowVisitor {
            type Value = SelectedRow;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of field names to scalar values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut fields = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((name, value)) = access.next_entry::<String, Value>()? {
                    fields.push((name, value));
                }
                Ok(SelectedRow { fields })
            }
        }

        deserializer.deserialize_map(RowVisitor)
    }
}

/// The set of rows a user marked for inclusion in a notification.
///
/// Rows are identified by the records the widget handed back, not by value;
/// an empty selection is valid and means "nothing to notify".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowSelection {
    /// Selected rows in widget order.
    pub rows: Vec<SelectedRow>,
}

impl RowSelection {
    /// A selection over the given rows.
    pub fn new(rows: Vec<SelectedRow>) -> Self {
        Self { rows }
    }

    /// Number of selected rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether nothing was selected.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Decode the JSON array of row records a grid widget posts back.
    ///
    /// ```
    /// use report_escalation::bridge::RowSelection;
    /// use report_escalation::types::Value;
    ///
    /// let payload = r#"[{"Key": "OPS-1", "Count": 3, "_rowOrigin": "n17"}]"#;
    /// let selection = RowSelection::from_json(payload).unwrap();
    /// assert_eq!(selection.len(), 1);
    /// assert_eq!(selection.rows[0].get("Count"), Some(&Value::Int64(3)));
    /// ```
    pub fn from_json(payload: &str) -> SanitizeResult<Self> {
        Ok(serde_json::from_str(payload)?)
    }
}

/// The interactive grid seam.
///
/// Implementations display `table` with the registered columns hidden by
/// default and return the rows the user checked, each row carrying one
/// bookkeeping identifier field (conventionally [`ROW_ORIGIN_FIELD`]).
pub trait PresentationBridge {
    /// Show the enriched table, block until the user is done, return their
    /// selection.
    fn present(&mut self, table: &Table, hidden: &HiddenColumnRegistry) -> RowSelection;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_decodes_from_grid_json() {
        let payload = r#"[
            {"_rowOrigin": "node-4", "Key": "OPS-1", "Score": 1.5, "Open": true, "Note": null},
            {"_rowOrigin": "node-9", "Key": "OPS-2", "Score": 2, "Open": false, "Note": "x"}
        ]"#;
        let selection = RowSelection::from_json(payload).unwrap();
        assert_eq!(selection.len(), 2);

        let first = &selection.rows[0];
        assert_eq!(
            first.get(ROW_ORIGIN_FIELD),
            Some(&Value::Utf8("node-4".to_string()))
        );
        assert_eq!(first.get("Score"), Some(&Value::Float64(1.5)));
        assert_eq!(first.get("Note"), Some(&Value::Null));

        let second = &selection.rows[1];
        assert_eq!(second.get("Score"), Some(&Value::Int64(2)));
        assert_eq!(second.get("Open"), Some(&Value::Bool(false)));
    }

    #[test]
    fn selection_rejects_non_array_payloads() {
        assert!(RowSelection::from_json("{\"rows\": 1}").is_err());
    }

    #[test]
    fn row_round_trips_as_a_json_object() {
        let mut row = SelectedRow::with_origin("node-1");
        row.push("Key", Value::Utf8("OPS-7".to_string()));
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"{"_rowOrigin":"node-1","Key":"OPS-7"}"#);
    }
}
