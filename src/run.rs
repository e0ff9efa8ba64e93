use std::collections::HashSet;

use tracing::info;

use crate::config::ReconConfig;
use crate::constants::checkpoints;
use crate::data::Dataset;
use crate::dedup::deduplicate;
use crate::engine::{batimento, devolucao};
use crate::errors::ReconError;
use crate::key::append_keys;
use crate::layout::format_layout;
use crate::metrics::RunMetrics;
use crate::segment::segment;
use crate::types::{DocumentDigits, Key};
use crate::validate::validate;

/// Identity sets supplied alongside the two ledgers.
#[derive(Clone, Debug, Default)]
pub struct AuxiliarySets {
    /// Digits-only CPF/CNPJ values under judicial handling.
    pub judicial_ids: HashSet<DocumentDigits>,
    /// Keys already written off; matching devolução rows are removed.
    pub written_off_keys: HashSet<Key>,
}

/// Every artifact produced by one reconciliation run.
#[derive(Clone, Debug)]
pub struct ReconReport {
    /// Source records the agency is not tracking, layout-formatted when a
    /// batimento layout is configured.
    pub batimento: Dataset,
    /// Devolução rows under judicial handling, layout-formatted.
    pub devolucao_judicial: Dataset,
    /// Remaining devolução rows, layout-formatted.
    pub devolucao_extrajudicial: Dataset,
    /// Source records that failed validation, reason column attached.
    pub invalid_source: Dataset,
    /// Agency records that failed validation, reason column attached.
    pub invalid_agency: Dataset,
    /// Checkpoint counters recorded across the run.
    pub metrics: RunMetrics,
}

/// Run the full reconciliation pipeline for one portfolio.
///
/// Stages, in order: key derivation for both ledgers, validation
/// (valid/invalid split; duplicate source keys abort), agency
/// deduplication, batimento and devolução anti-joins (the latter behind
/// the configured filter chain and write-off removal), judicial
/// segmentation, layout formatting. Each stage consumes its input
/// immutably and the metrics map records every checkpoint.
pub fn run_reconciliation(
    source: &Dataset,
    agency: &Dataset,
    aux: &AuxiliarySets,
    config: &ReconConfig,
) -> Result<ReconReport, ReconError> {
    let mut metrics = RunMetrics::new();
    let key_column = config.derived_key_column();
    info!(
        source = source.name(),
        agency = agency.name(),
        source_rows = source.len(),
        agency_rows = agency.len(),
        "starting reconciliation run"
    );

    let source_keyed = append_keys(source, &config.source_key, key_column)?;
    let agency_keyed = append_keys(agency, &config.agency_key, key_column)?;

    let source_outcome = validate(&source_keyed, &config.source_rules)?;
    metrics.record(checkpoints::SOURCE_VALID, source_outcome.valid.len() as u64);
    metrics.record(
        checkpoints::SOURCE_INVALID,
        source_outcome.invalid.len() as u64,
    );
    let agency_outcome = validate(&agency_keyed, &config.agency_rules)?;
    metrics.record(checkpoints::AGENCY_VALID, agency_outcome.valid.len() as u64);
    metrics.record(
        checkpoints::AGENCY_INVALID,
        agency_outcome.invalid.len() as u64,
    );

    let agency_deduped = deduplicate(
        &agency_outcome.valid,
        key_column,
        config.agency_tiebreak_field.as_deref(),
    )?;
    metrics.record(
        checkpoints::REMOVED_BY_DUPLICATE_KEY,
        (agency_outcome.valid.len() - agency_deduped.len()) as u64,
    );

    let batimento_result = batimento(
        &source_outcome.valid,
        &agency_deduped,
        key_column,
        key_column,
        &mut metrics,
    )?;
    if config.require_non_empty && batimento_result.is_empty() {
        return Err(ReconError::EmptyResult {
            artifact: "batimento".to_string(),
        });
    }

    let devolucao_result = devolucao(
        &agency_deduped,
        &source_outcome.valid,
        key_column,
        key_column,
        &config.filters,
        &aux.written_off_keys,
        &mut metrics,
    )?;
    if config.require_non_empty && devolucao_result.is_empty() {
        return Err(ReconError::EmptyResult {
            artifact: "devolucao".to_string(),
        });
    }

    let split = segment(&devolucao_result, &config.document_field, &aux.judicial_ids)?;
    metrics.record(checkpoints::JUDICIAL_COUNT, split.judicial.len() as u64);
    metrics.record(
        checkpoints::EXTRAJUDICIAL_COUNT,
        split.extrajudicial.len() as u64,
    );

    let batimento_artifact = match &config.batimento_layout {
        Some(layout) => format_layout(&batimento_result, layout)?,
        None => batimento_result,
    };
    let devolucao_judicial = format_layout(&split.judicial, &config.devolucao_layout)?;
    let devolucao_extrajudicial = format_layout(&split.extrajudicial, &config.devolucao_layout)?;

    info!(
        batimento = batimento_artifact.len(),
        judicial = devolucao_judicial.len(),
        extrajudicial = devolucao_extrajudicial.len(),
        "reconciliation run finished"
    );
    Ok(ReconReport {
        batimento: batimento_artifact,
        devolucao_judicial,
        devolucao_extrajudicial,
        invalid_source: source_outcome.invalid.to_dataset(),
        invalid_agency: agency_outcome.invalid.to_dataset(),
        metrics,
    })
}
