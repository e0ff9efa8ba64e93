use serde::{Deserialize, Serialize};

use crate::data::{Dataset, Record, Value};
use crate::errors::ReconError;
use crate::types::FieldName;

/// One column of the fixed output layout.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LayoutColumn {
    /// Column name in the exported artifact.
    pub output: String,
    /// Preferred source column.
    pub source: FieldName,
    /// Column used when `source` is absent from the dataset schema.
    #[serde(default)]
    pub fallback: Option<FieldName>,
}

impl LayoutColumn {
    /// Map `output` directly from `source` with no fallback.
    pub fn direct(output: impl Into<String>, source: impl Into<FieldName>) -> Self {
        Self {
            output: output.into(),
            source: source.into(),
            fallback: None,
        }
    }
}

/// A constant column stamped onto every output row (e.g. the creditor tax
/// id the agency requires on each line).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InjectedColumn {
    /// Column name in the exported artifact.
    pub output: String,
    /// Fixed value written to every row.
    pub value: String,
}

/// The fixed, ordered output schema of one exported artifact.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LayoutSpec {
    /// Mapped columns, in output order.
    pub columns: Vec<LayoutColumn>,
    /// Output column whose source must be present: there is no column fit
    /// to stand in for the key, so a missing source (and fallback) aborts.
    pub key_column: String,
    /// Constant columns appended after the mapped ones.
    #[serde(default)]
    pub inject: Vec<InjectedColumn>,
}

/// Project `dataset` into the layout's fixed column order.
///
/// Each output column takes its value from the first of source/fallback
/// present in the schema; when neither is, the column is filled with the
/// empty string — except the designated key column, whose absence is a
/// fatal [`ReconError::MissingKeyColumn`]. Cells are rendered textually
/// and format-preserving: text cells (comma decimals included) are echoed
/// verbatim.
pub fn format_layout(dataset: &Dataset, spec: &LayoutSpec) -> Result<Dataset, ReconError> {
    if !spec.key_column.is_empty()
        && !spec
            .columns
            .iter()
            .any(|column| column.output == spec.key_column)
    {
        return Err(ReconError::Configuration(format!(
            "layout key column '{}' is not among the mapped columns",
            spec.key_column
        )));
    }

    // Resolve each mapped column to a concrete source once, up front.
    let mut resolved: Vec<(&LayoutColumn, Option<&FieldName>)> = Vec::with_capacity(spec.columns.len());
    for column in &spec.columns {
        let source = if dataset.has_column(&column.source) {
            Some(&column.source)
        } else {
            match &column.fallback {
                Some(fallback) if dataset.has_column(fallback) => Some(fallback),
                _ if column.output == spec.key_column => {
                    return Err(ReconError::MissingKeyColumn {
                        column: spec.key_column.clone(),
                    });
                }
                _ => None,
            }
        };
        resolved.push((column, source));
    }

    let mut schema: Vec<FieldName> = spec
        .columns
        .iter()
        .map(|column| column.output.clone())
        .collect();
    schema.extend(spec.inject.iter().map(|injected| injected.output.clone()));

    let records = dataset
        .iter()
        .map(|record| {
            let mut row = Record::new();
            for (column, source) in &resolved {
                let cell = source
                    .map(|field| record.rendered(field))
                    .unwrap_or_default();
                row.set(column.output.clone(), Value::Text(cell));
            }
            for injected in &spec.inject {
                row.set(injected.output.clone(), Value::Text(injected.value.clone()));
            }
            row
        })
        .collect();
    Ok(Dataset::with_records(dataset.name(), schema, records))
}
