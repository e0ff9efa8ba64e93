use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::errors::ReconError;

pub use crate::types::{DatasetName, FieldName};

/// A single cell value as delivered by an external tabular loader.
///
/// Loaders hand most cells over as [`Value::Text`]; typed variants exist for
/// sources that already materialize numbers and dates. Textual rendering is
/// format-preserving: a text cell is echoed verbatim, so locale-specific
/// decimal commas survive the round trip to the exported artifact.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Absent/NULL cell.
    Null,
    /// Raw textual cell, kept exactly as loaded.
    Text(String),
    /// Numeric cell already typed by the loader.
    Number(f64),
    /// Date cell already typed by the loader.
    Date(NaiveDate),
}

impl Value {
    /// Textual representation used for keys, comparisons and export.
    ///
    /// `Null` renders empty, text is verbatim, whole numbers drop the
    /// trailing `.0`, dates render ISO (`%Y-%m-%d`).
    pub fn render(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Text(text) => text.clone(),
            Self::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 9.0e15 {
                    format!("{}", *n as i64)
                } else {
                    n.to_string()
                }
            }
            Self::Date(date) => date.format("%Y-%m-%d").to_string(),
        }
    }

    /// Borrow the inner text when this is a text cell.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Returns `true` for `Null` and for text that is blank after trim.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Text(text) => text.trim().is_empty(),
            _ => false,
        }
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

/// One row of a dataset: an insertion-ordered mapping from field name to
/// value. Field order follows the order fields were set, matching the
/// column order of the originating extract.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: IndexMap<FieldName, Value>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style helper used heavily by fixtures.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<FieldName>, value: impl Into<Value>) -> Self {
        self.set(name, value.into());
        self
    }

    /// Set (or replace) a field value.
    pub fn set(&mut self, name: impl Into<FieldName>, value: Value) {
        self.fields.insert(name.into(), value);
    }

    /// Look up a field value by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Textual representation of a field; missing fields render empty.
    pub fn rendered(&self, name: &str) -> String {
        self.get(name).map(Value::render).unwrap_or_default()
    }

    /// Iterate fields in insertion order.
    pub fn fields(&self) -> impl Iterator<Item = (&FieldName, &Value)> {
        self.fields.iter()
    }

    /// Number of fields set on this record.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` when no field is set.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(FieldName, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (FieldName, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// An ordered sequence of records sharing a declared schema.
///
/// Record order is the order the external extract delivered them in and is
/// preserved by every pipeline stage; dedup tie-breaking depends on it.
/// Stages never mutate their input: each produces a new `Dataset`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    name: DatasetName,
    schema: Vec<FieldName>,
    records: Vec<Record>,
}

impl Dataset {
    /// Create an empty dataset with a declared schema.
    pub fn new(name: impl Into<DatasetName>, schema: Vec<FieldName>) -> Self {
        Self {
            name: name.into(),
            schema,
            records: Vec::new(),
        }
    }

    /// Create a dataset from already-materialized records.
    pub fn with_records(
        name: impl Into<DatasetName>,
        schema: Vec<FieldName>,
        records: Vec<Record>,
    ) -> Self {
        Self {
            name: name.into(),
            schema,
            records,
        }
    }

    /// Dataset label used in errors, logs and metrics.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared column order.
    pub fn schema(&self) -> &[FieldName] {
        &self.schema
    }

    /// Returns `true` when `column` is part of the declared schema.
    pub fn has_column(&self, column: &str) -> bool {
        self.schema.iter().any(|field| field == column)
    }

    /// Fail with a [`ReconError::MissingColumn`] unless `column` exists.
    pub fn require_column(&self, column: &str) -> Result<(), ReconError> {
        if self.has_column(column) {
            Ok(())
        } else {
            Err(ReconError::MissingColumn {
                dataset: self.name.clone(),
                column: column.to_string(),
            })
        }
    }

    /// Append a record, preserving arrival order.
    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    /// Records in arrival order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Iterate records in arrival order.
    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` when the dataset holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// New dataset with the same name/schema keeping records matching
    /// `predicate`, in their original relative order.
    pub fn filter<F>(&self, predicate: F) -> Self
    where
        F: Fn(&Record) -> bool,
    {
        Self {
            name: self.name.clone(),
            schema: self.schema.clone(),
            records: self
                .records
                .iter()
                .filter(|record| predicate(record))
                .cloned()
                .collect(),
        }
    }
}
