use serde::{Deserialize, Serialize};

use crate::constants::{columns, key as key_defaults};
use crate::engine::FilterSpec;
use crate::key::KeySpec;
use crate::layout::LayoutSpec;
use crate::types::FieldName;
use crate::validate::{DuplicatePolicy, ValidationSpec};

/// Full configuration for one portfolio reconciliation run.
///
/// One value of this type captures everything that varies between business
/// variants (EMCCAMP, VIC, Tabelionato): key composition, validation rules,
/// devolução filters and output layouts. The excluded configuration loader
/// deserializes it; the engine itself never reads files.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReconConfig {
    /// Key composition for the source-of-truth ledger.
    pub source_key: KeySpec,
    /// Key composition for the agency ledger.
    pub agency_key: KeySpec,
    /// Validation rules for the source ledger. Its duplicate policy should
    /// stay [`DuplicatePolicy::Fatal`]: source keys are authoritative.
    pub source_rules: ValidationSpec,
    /// Validation rules for the agency ledger (duplicates tolerated and
    /// collapsed by the deduplicator).
    pub agency_rules: ValidationSpec,
    /// Settlement/event date used to pick the surviving agency record per
    /// duplicated key; `None` keeps the first occurrence.
    #[serde(default)]
    pub agency_tiebreak_field: Option<FieldName>,
    /// Status/campaign filters applied before the devolução anti-join.
    #[serde(default)]
    pub filters: FilterSpec,
    /// Document column segmenting devolução into judicial/extrajudicial.
    pub document_field: FieldName,
    /// Output layout for the devolução artifacts.
    pub devolucao_layout: LayoutSpec,
    /// Output layout for the batimento artifact; `None` exports the source
    /// columns as-is.
    #[serde(default)]
    pub batimento_layout: Option<LayoutSpec>,
    /// Abort the run when batimento or devolução come out empty, instead of
    /// letting an empty file travel down the export chain.
    #[serde(default)]
    pub require_non_empty: bool,
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self {
            source_key: KeySpec {
                fields: Vec::new(),
                separator: key_defaults::DEFAULT_SEPARATOR.to_string(),
            },
            agency_key: KeySpec {
                fields: Vec::new(),
                separator: key_defaults::DEFAULT_SEPARATOR.to_string(),
            },
            source_rules: ValidationSpec {
                duplicates: DuplicatePolicy::Fatal,
                ..ValidationSpec::default()
            },
            agency_rules: ValidationSpec::default(),
            agency_tiebreak_field: None,
            filters: FilterSpec::default(),
            document_field: String::new(),
            devolucao_layout: LayoutSpec::default(),
            batimento_layout: None,
            require_non_empty: false,
        }
    }
}

impl ReconConfig {
    /// Column both ledgers receive their derived key under.
    pub fn derived_key_column(&self) -> &str {
        columns::DERIVED_KEY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_source_rules_are_strict_about_duplicates() {
        let config = ReconConfig::default();
        assert_eq!(config.source_rules.duplicates, DuplicatePolicy::Fatal);
        assert_eq!(config.agency_rules.duplicates, DuplicatePolicy::Allow);
    }

    #[test]
    fn config_round_trips_through_serde() {
        let config = ReconConfig {
            source_key: KeySpec::new(vec!["CONTRATO".to_string(), "PARCELA".to_string()]),
            agency_key: KeySpec::new(vec!["NUM_CONTRATO".to_string(), "NUM_PARCELA".to_string()]),
            document_field: "CPF_CNPJ".to_string(),
            require_non_empty: true,
            ..ReconConfig::default()
        };
        let encoded = serde_json::to_string(&config).unwrap();
        let decoded: ReconConfig = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded.source_key.fields, config.source_key.fields);
        assert_eq!(decoded.document_field, "CPF_CNPJ");
        assert!(decoded.require_non_empty);
    }

    #[test]
    fn minimal_json_relies_on_field_defaults() {
        let raw = r#"{
            "source_key": {"fields": ["CONTRATO", "PARCELA"]},
            "agency_key": {"fields": ["CHAVE_MAX"]},
            "source_rules": {"duplicates": "Fatal"},
            "agency_rules": {},
            "document_field": "CPF_CNPJ",
            "devolucao_layout": {"columns": [], "key_column": ""}
        }"#;
        let config: ReconConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(config.source_key.separator, "-");
        assert_eq!(config.agency_rules.key_field, "chave");
        assert!(!config.require_non_empty);
    }
}
