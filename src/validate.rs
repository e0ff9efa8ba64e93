use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::constants::columns;
use crate::constants::validate::REASON_DELIMITER;
use crate::data::{Dataset, Record, Value};
use crate::errors::ReconError;
use crate::normalize::{is_empty_cell, normalize_date, normalize_document};
use crate::types::{FieldName, Key};

/// Reason a record was routed to the invalid partition.
///
/// The wire codes (`CHAVE_VAZIA`, ...) are the values the operations team
/// reads in the exported invalid report, so they stay in the report's
/// language.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReasonCode {
    /// The derived key is empty after trim.
    EmptyKey,
    /// The non-empty key does not match the configured pattern.
    KeyFormat,
    /// The document field has no digits.
    EmptyDocument,
    /// The due-date field is empty or unparsable.
    DueDate,
    /// A generic required field is blank.
    RequiredField(FieldName),
}

impl ReasonCode {
    /// Report code as exported in the invalid artifact.
    pub fn code(&self) -> String {
        match self {
            Self::EmptyKey => "CHAVE_VAZIA".to_string(),
            Self::KeyFormat => "CHAVE_FORMATO_INVALIDO".to_string(),
            Self::EmptyDocument => "CPF_VAZIO".to_string(),
            Self::DueDate => "VENCIMENTO_INVALIDO".to_string(),
            Self::RequiredField(field) => {
                format!("CAMPO_VAZIO_{}", field.to_uppercase().replace(' ', "_"))
            }
        }
    }
}

impl std::fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.code())
    }
}

/// What to do when the same key appears more than once in a dataset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DuplicatePolicy {
    /// Abort the run: the dataset's keys are authoritative and must be
    /// unique (source-of-truth ledger).
    Fatal,
    /// Let duplicates through; the deduplicator resolves them later
    /// (agency ledger).
    #[default]
    Allow,
}

/// Validation rule set for one dataset role.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ValidationSpec {
    /// Column holding the derived reconciliation key.
    #[serde(default = "default_key_field")]
    pub key_field: FieldName,
    /// Regex the non-empty key must fully satisfy, when set.
    #[serde(default)]
    pub key_pattern: Option<String>,
    /// Document column whose digits must be non-empty, when set.
    #[serde(default)]
    pub document_field: Option<FieldName>,
    /// Due-date column that must parse as a date, when set.
    #[serde(default)]
    pub due_date_field: Option<FieldName>,
    /// Additional columns that must be non-blank.
    #[serde(default)]
    pub required: Vec<FieldName>,
    /// Repeated-key policy for this dataset.
    #[serde(default)]
    pub duplicates: DuplicatePolicy,
}

fn default_key_field() -> FieldName {
    columns::DERIVED_KEY.to_string()
}

impl Default for ValidationSpec {
    fn default() -> Self {
        Self {
            key_field: default_key_field(),
            key_pattern: None,
            document_field: None,
            due_date_field: None,
            required: Vec::new(),
            duplicates: DuplicatePolicy::default(),
        }
    }
}

/// A record routed to the invalid partition, with every reason attached.
#[derive(Clone, Debug, PartialEq)]
pub struct InvalidRecord {
    /// The original record, all columns retained.
    pub record: Record,
    /// Reasons, in rule-evaluation order; never empty.
    pub reasons: Vec<ReasonCode>,
}

/// The invalid half of a validation outcome.
#[derive(Clone, Debug)]
pub struct InvalidPartition {
    name: String,
    schema: Vec<FieldName>,
    /// Invalid records in their original relative order.
    pub records: Vec<InvalidRecord>,
}

impl InvalidPartition {
    /// Number of invalid records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` when every record validated cleanly.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Count of records per reason code, in first-seen order.
    pub fn reason_counts(&self) -> IndexMap<ReasonCode, usize> {
        let mut counts: IndexMap<ReasonCode, usize> = IndexMap::new();
        for invalid in &self.records {
            for reason in &invalid.reasons {
                *counts.entry(reason.clone()).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Materialize the exportable invalid artifact: all original columns
    /// plus a reason column holding the `;`-joined codes.
    pub fn to_dataset(&self) -> Dataset {
        let mut schema = self.schema.clone();
        if !schema.iter().any(|column| column == columns::REASONS) {
            schema.push(columns::REASONS.to_string());
        }
        let records = self
            .records
            .iter()
            .map(|invalid| {
                let joined = invalid
                    .reasons
                    .iter()
                    .map(ReasonCode::code)
                    .collect::<Vec<_>>()
                    .join(REASON_DELIMITER);
                let mut record = invalid.record.clone();
                record.set(columns::REASONS, Value::Text(joined));
                record
            })
            .collect();
        Dataset::with_records(format!("{}_invalidos", self.name), schema, records)
    }
}

/// Result of validating one dataset: every record lands in exactly one of
/// the two partitions.
#[derive(Clone, Debug)]
pub struct ValidationOutcome {
    /// Records passing every configured rule, original order preserved.
    pub valid: Dataset,
    /// Records with one or more reasons attached.
    pub invalid: InvalidPartition,
}

/// Partition `dataset` into valid/invalid against `spec`.
///
/// Rules are evaluated independently and their reasons unioned per record.
/// Columns referenced by the spec must exist in the schema; a missing one
/// is a fatal [`ReconError::MissingColumn`]. With
/// [`DuplicatePolicy::Fatal`], a key repeated among the records that passed
/// the per-record rules aborts the run with [`ReconError::DuplicateKey`].
pub fn validate(dataset: &Dataset, spec: &ValidationSpec) -> Result<ValidationOutcome, ReconError> {
    dataset.require_column(&spec.key_field)?;
    for field in spec
        .document_field
        .iter()
        .chain(spec.due_date_field.iter())
        .chain(spec.required.iter())
    {
        dataset.require_column(field)?;
    }
    let pattern = spec
        .key_pattern
        .as_deref()
        .map(|raw| {
            Regex::new(raw).map_err(|err| {
                ReconError::Configuration(format!("invalid key pattern '{raw}': {err}"))
            })
        })
        .transpose()?;

    let mut valid = Dataset::new(dataset.name(), dataset.schema().to_vec());
    let mut invalid = InvalidPartition {
        name: dataset.name().to_string(),
        schema: dataset.schema().to_vec(),
        records: Vec::new(),
    };

    for record in dataset.iter() {
        let reasons = record_reasons(record, spec, pattern.as_ref());
        if reasons.is_empty() {
            valid.push(record.clone());
        } else {
            invalid.records.push(InvalidRecord {
                record: record.clone(),
                reasons,
            });
        }
    }

    if spec.duplicates == DuplicatePolicy::Fatal {
        check_unique_keys(&valid, &spec.key_field)?;
    }

    debug!(
        dataset = dataset.name(),
        valid = valid.len(),
        invalid = invalid.len(),
        "validated dataset"
    );
    if !invalid.is_empty() {
        for (reason, count) in invalid.reason_counts() {
            warn!(
                dataset = dataset.name(),
                reason = %reason,
                count,
                "records routed to invalid partition"
            );
        }
    }

    Ok(ValidationOutcome { valid, invalid })
}

fn record_reasons(record: &Record, spec: &ValidationSpec, pattern: Option<&Regex>) -> Vec<ReasonCode> {
    let mut reasons = Vec::new();

    let key = record.rendered(&spec.key_field);
    let key = key.trim();
    if key.is_empty() {
        reasons.push(ReasonCode::EmptyKey);
    } else if let Some(pattern) = pattern {
        // Empty keys already carry their own reason; don't double-penalize.
        if !pattern.is_match(key) {
            reasons.push(ReasonCode::KeyFormat);
        }
    }

    if let Some(field) = &spec.document_field {
        let digits = record
            .get(field)
            .map(normalize_document)
            .unwrap_or_default();
        if digits.is_empty() {
            reasons.push(ReasonCode::EmptyDocument);
        }
    }

    if let Some(field) = &spec.due_date_field {
        let parsed = record.get(field).and_then(normalize_date);
        if parsed.is_none() {
            reasons.push(ReasonCode::DueDate);
        }
    }

    for field in &spec.required {
        let blank = record.get(field).map_or(true, is_empty_cell);
        if blank {
            reasons.push(ReasonCode::RequiredField(field.clone()));
        }
    }

    reasons
}

fn check_unique_keys(valid: &Dataset, key_field: &str) -> Result<(), ReconError> {
    let mut counts: IndexMap<Key, usize> = IndexMap::new();
    for record in valid.iter() {
        let key = record.rendered(key_field).trim().to_string();
        *counts.entry(key).or_insert(0) += 1;
    }
    for (key, count) in counts {
        if count > 1 {
            return Err(ReconError::DuplicateKey {
                dataset: valid.name().to_string(),
                key,
                count,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger(records: Vec<Record>) -> Dataset {
        Dataset::with_records(
            "emccamp",
            vec![
                "chave".to_string(),
                "CPF_CNPJ".to_string(),
                "VENCIMENTO".to_string(),
            ],
            records,
        )
    }

    fn row(key: &str, document: &str, due: &str) -> Record {
        Record::new()
            .with_field("chave", key)
            .with_field("CPF_CNPJ", document)
            .with_field("VENCIMENTO", due)
    }

    fn spec() -> ValidationSpec {
        ValidationSpec {
            key_pattern: Some(r"^[0-9A-Za-z]+(-[0-9A-Za-z]+)+$".to_string()),
            document_field: Some("CPF_CNPJ".to_string()),
            due_date_field: Some("VENCIMENTO".to_string()),
            duplicates: DuplicatePolicy::Fatal,
            ..ValidationSpec::default()
        }
    }

    #[test]
    fn every_record_lands_in_exactly_one_partition() {
        let dataset = ledger(vec![
            row("123-001", "048.520.960-00", "01/02/2025"),
            row("", "048.520.960-00", "01/02/2025"),
            row("456-002", "", "01/02/2025"),
        ]);
        let outcome = validate(&dataset, &spec()).unwrap();
        assert_eq!(outcome.valid.len() + outcome.invalid.len(), dataset.len());
        assert_eq!(outcome.valid.len(), 1);
        assert_eq!(outcome.invalid.len(), 2);
    }

    #[test]
    fn reasons_accumulate_per_record() {
        let dataset = ledger(vec![row("", "", "hoje")]);
        let outcome = validate(&dataset, &spec()).unwrap();
        let reasons = &outcome.invalid.records[0].reasons;
        assert_eq!(
            reasons,
            &[
                ReasonCode::EmptyKey,
                ReasonCode::EmptyDocument,
                ReasonCode::DueDate
            ]
        );
    }

    #[test]
    fn empty_key_is_not_also_a_format_failure() {
        let dataset = ledger(vec![row("   ", "048.520.960-00", "01/02/2025")]);
        let outcome = validate(&dataset, &spec()).unwrap();
        let reasons = &outcome.invalid.records[0].reasons;
        assert!(reasons.contains(&ReasonCode::EmptyKey));
        assert!(!reasons.contains(&ReasonCode::KeyFormat));
    }

    #[test]
    fn malformed_key_fails_the_pattern_rule() {
        let dataset = ledger(vec![row("123456", "048.520.960-00", "01/02/2025")]);
        let outcome = validate(&dataset, &spec()).unwrap();
        assert_eq!(
            outcome.invalid.records[0].reasons,
            vec![ReasonCode::KeyFormat]
        );
    }

    #[test]
    fn duplicate_key_is_fatal_when_policy_says_so() {
        let dataset = ledger(vec![
            row("123-001", "048.520.960-00", "01/02/2025"),
            row("123-001", "048.520.960-00", "02/02/2025"),
        ]);
        let err = validate(&dataset, &spec()).unwrap_err();
        assert!(matches!(
            err,
            ReconError::DuplicateKey { key, count: 2, .. } if key == "123-001"
        ));
    }

    #[test]
    fn duplicate_keys_pass_untouched_when_tolerated() {
        let dataset = ledger(vec![
            row("123-001", "048.520.960-00", "01/02/2025"),
            row("123-001", "048.520.960-00", "02/02/2025"),
        ]);
        let tolerant = ValidationSpec {
            duplicates: DuplicatePolicy::Allow,
            ..spec()
        };
        let outcome = validate(&dataset, &tolerant).unwrap();
        assert_eq!(outcome.valid.len(), 2);
    }

    #[test]
    fn exported_invalid_artifact_joins_reason_codes() {
        let dataset = ledger(vec![row("", "", "01/02/2025")]);
        let outcome = validate(&dataset, &spec()).unwrap();
        let artifact = outcome.invalid.to_dataset();
        assert_eq!(
            artifact.records()[0].rendered("motivos"),
            "CHAVE_VAZIA;CPF_VAZIO"
        );
        assert_eq!(artifact.name(), "emccamp_invalidos");
    }

    #[test]
    fn missing_configured_column_is_fatal() {
        let dataset = Dataset::new("emccamp", vec!["chave".to_string()]);
        let err = validate(&dataset, &spec()).unwrap_err();
        assert!(matches!(err, ReconError::MissingColumn { column, .. } if column == "CPF_CNPJ"));
    }
}
