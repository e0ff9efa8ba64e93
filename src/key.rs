use serde::{Deserialize, Serialize};

use crate::constants::key::DEFAULT_SEPARATOR;
use crate::data::{Dataset, Record, Value};
use crate::errors::ReconError;
use crate::types::{FieldName, Key};

/// How to derive the reconciliation key for one dataset role.
///
/// The key is the trimmed rendering of each configured field, joined by the
/// separator; a single-field key is the trimmed value alone, with no
/// separator involved.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KeySpec {
    /// Ordered source fields composing the key (e.g. contract, installment).
    pub fields: Vec<FieldName>,
    /// Separator joining the parts.
    #[serde(default = "default_separator")]
    pub separator: String,
}

fn default_separator() -> String {
    DEFAULT_SEPARATOR.to_string()
}

impl KeySpec {
    /// Spec joining `fields` with the default separator.
    pub fn new(fields: Vec<FieldName>) -> Self {
        Self {
            fields,
            separator: default_separator(),
        }
    }

    /// Derive the key for one record.
    ///
    /// Fields missing from the record contribute an empty part; the
    /// schema-level presence check lives in [`append_keys`], since an
    /// absent column is a configuration error rather than a record error.
    pub fn build(&self, record: &Record) -> Key {
        let parts: Vec<String> = self
            .fields
            .iter()
            .map(|field| {
                record
                    .get(field)
                    .map(|value| value.render().trim().to_string())
                    .unwrap_or_default()
            })
            .collect();
        parts.join(&self.separator)
    }
}

/// Derive a key per record and append it under `target` as a new column.
///
/// Fails with [`ReconError::MissingKeyField`] when a configured field is
/// absent from the dataset schema — a configuration error that aborts the
/// run before any record is touched.
pub fn append_keys(dataset: &Dataset, spec: &KeySpec, target: &str) -> Result<Dataset, ReconError> {
    if spec.fields.is_empty() {
        return Err(ReconError::Configuration(format!(
            "key spec for dataset '{}' names no fields",
            dataset.name()
        )));
    }
    for field in &spec.fields {
        if !dataset.has_column(field) {
            return Err(ReconError::MissingKeyField {
                dataset: dataset.name().to_string(),
                field: field.clone(),
            });
        }
    }

    let mut schema = dataset.schema().to_vec();
    if !schema.iter().any(|column| column == target) {
        schema.push(target.to_string());
    }
    let records = dataset
        .iter()
        .map(|record| {
            let mut keyed = record.clone();
            keyed.set(target, Value::Text(spec.build(record)));
            keyed
        })
        .collect();
    Ok(Dataset::with_records(dataset.name(), schema, records))
}
