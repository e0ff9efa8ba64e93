use thiserror::Error;

use crate::types::{DatasetName, FieldName, Key};

/// Error type for configuration and structural reconciliation failures.
///
/// Per-record data problems never surface here; they are routed to the
/// invalid partition with reason codes attached.
#[derive(Debug, Error)]
pub enum ReconError {
    #[error("dataset '{dataset}' is missing required column '{column}'")]
    MissingColumn {
        dataset: DatasetName,
        column: FieldName,
    },
    #[error("key field '{field}' is not part of dataset '{dataset}'")]
    MissingKeyField {
        dataset: DatasetName,
        field: FieldName,
    },
    #[error("layout has no present source column for key column '{column}'")]
    MissingKeyColumn { column: FieldName },
    #[error(
        "duplicate key '{key}' appears {count} times in dataset '{dataset}' which requires unique keys"
    )]
    DuplicateKey {
        dataset: DatasetName,
        key: Key,
        count: usize,
    },
    #[error("reconciliation produced an empty '{artifact}' result")]
    EmptyResult { artifact: String },
    #[error("configuration error: {0}")]
    Configuration(String),
}
