//! Row model and the cached payload envelope.
//!
//! Every cell is text. A [`Row`] keeps its columns in projection order and
//! serializes as a JSON object in that order, so a row set that goes through
//! the cache comes back exactly as the database produced it.

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;

/// One result row: column name to text value, unique column names, ordered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    cells: Vec<(String, String)>,
}

/// Rows in database result order.
pub type RowSet = Vec<Row>;

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `column` to `value`. An existing column keeps its position.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
        let column = column.into();
        let value = value.into();
        match self.cells.iter_mut().find(|(name, _)| *name == column) {
            Some(cell) => cell.1 = value,
            None => self.cells.push((column, value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cells.iter().map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl<C, V> FromIterator<(C, V)> for Row
where
    C: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (C, V)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (column, value) in iter {
            row.insert(column, value);
        }
        row
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (name, value) in &self.cells {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

struct RowVisitor;

impl<'de> Visitor<'de> for RowVisitor {
    type Value = Row;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of column names to text values")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Row, A::Error> {
        let mut row = Row::new();
        while let Some((column, value)) = access.next_entry::<String, String>()? {
            row.insert(column, value);
        }
        Ok(row)
    }
}

impl<'de> Deserialize<'de> for Row {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_map(RowVisitor)
    }
}

/// What actually sits in the cache for tabular reads: `{"Data": [...]}`.
///
/// The envelope tells an empty result apart from garbage. `"Data": null`
/// is accepted as empty since older writers emitted it for zero rows.
#[derive(Debug, Deserialize)]
struct CachedPayload {
    #[serde(rename = "Data", deserialize_with = "nullable_rows")]
    data: RowSet,
}

fn nullable_rows<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<RowSet, D::Error> {
    Ok(Option::<RowSet>::deserialize(deserializer)?.unwrap_or_default())
}

/// Wrap `rows` in the payload envelope and serialize it.
pub fn encode_payload(rows: &RowSet) -> Result<Vec<u8>> {
    #[derive(Serialize)]
    struct Envelope<'a> {
        #[serde(rename = "Data")]
        data: &'a RowSet,
    }
    Ok(serde_json::to_vec(&Envelope { data: rows })?)
}

/// Parse a payload produced by [`encode_payload`].
pub fn decode_payload(bytes: &[u8]) -> Result<RowSet> {
    let payload: CachedPayload = serde_json::from_slice(bytes)?;
    Ok(payload.data)
}
