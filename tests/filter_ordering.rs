use std::collections::HashSet;

use batimento::constants::checkpoints;
use batimento::engine::{devolucao, FilterSpec};
use batimento::{Dataset, Record, RunMetrics};

fn agency_row(key: &str, status: &str, campaign: &str) -> Record {
    Record::new()
        .with_field("chave", key)
        .with_field("STATUS", status)
        .with_field("CAMPANHA", campaign)
}

fn agency_fixture() -> Dataset {
    Dataset::with_records(
        "max",
        vec![
            "chave".to_string(),
            "STATUS".to_string(),
            "CAMPANHA".to_string(),
        ],
        vec![
            agency_row("A-1", "ATIVO", "ACORDO_2024"),
            agency_row("B-1", "ATIVO", "ACORDO_2024"),
            agency_row("C-1", "ATIVO", "ACORDO_2024"),
            agency_row("D-1", "ATIVO", "AVULSO"),
            agency_row("E-1", "JUDICIAL", "ACORDO_2024"),
        ],
    )
}

fn source_fixture() -> Dataset {
    Dataset::with_records(
        "emccamp",
        vec!["chave".to_string()],
        vec![
            Record::new().with_field("chave", "B-1"),
            Record::new().with_field("chave", "C-1"),
        ],
    )
}

fn filters() -> FilterSpec {
    FilterSpec {
        status_field: Some("STATUS".to_string()),
        status_accept: Some("ATIVO".to_string()),
        campaign_field: Some("CAMPANHA".to_string()),
        campaign_contains: Some("ACORDO".to_string()),
        excluded_status: vec!["JUDICIAL".to_string()],
    }
}

#[test]
fn filter_chain_counts_match_the_literal_fixture() {
    let mut metrics = RunMetrics::new();
    let result = devolucao(
        &agency_fixture(),
        &source_fixture(),
        "chave",
        "chave",
        &filters(),
        &HashSet::new(),
        &mut metrics,
    )
    .unwrap();

    assert_eq!(metrics.get(checkpoints::INPUT_COUNT), Some(5));
    assert_eq!(metrics.get(checkpoints::AFTER_STATUS_FILTER), Some(4));
    assert_eq!(metrics.get(checkpoints::AFTER_CAMPAIGN_FILTER), Some(3));
    // The excluded-status record already fell at the status filter.
    assert_eq!(metrics.get(checkpoints::AFTER_EXCLUSION_FILTER), Some(3));
    assert_eq!(metrics.get(checkpoints::RESULT_COUNT), Some(1));
    assert_eq!(metrics.get(checkpoints::FINAL_COUNT), Some(1));

    assert_eq!(result.len(), 1);
    assert_eq!(result.records()[0].rendered("chave"), "A-1");
}

#[test]
fn exclusion_filter_drops_records_the_status_filter_let_through() {
    let mut metrics = RunMetrics::new();
    let filters = FilterSpec {
        status_field: Some("STATUS".to_string()),
        status_accept: None,
        campaign_field: None,
        campaign_contains: None,
        excluded_status: vec!["JUDICIAL".to_string()],
    };
    let result = devolucao(
        &agency_fixture(),
        &source_fixture(),
        "chave",
        "chave",
        &filters,
        &HashSet::new(),
        &mut metrics,
    )
    .unwrap();

    // No status-accept value, so all 5 pass the first two stages and the
    // judicial row falls at the exclusion stage instead.
    assert_eq!(metrics.get(checkpoints::AFTER_STATUS_FILTER), Some(5));
    assert_eq!(metrics.get(checkpoints::AFTER_CAMPAIGN_FILTER), Some(5));
    assert_eq!(metrics.get(checkpoints::AFTER_EXCLUSION_FILTER), Some(4));
    assert_eq!(result.len(), 2);
}

#[test]
fn status_and_campaign_matching_ignore_case_and_padding() {
    let mut metrics = RunMetrics::new();
    let agency = Dataset::with_records(
        "max",
        vec![
            "chave".to_string(),
            "STATUS".to_string(),
            "CAMPANHA".to_string(),
        ],
        vec![agency_row("A-1", "  ativo ", "acordo_2024")],
    );
    let result = devolucao(
        &agency,
        &source_fixture(),
        "chave",
        "chave",
        &filters(),
        &HashSet::new(),
        &mut metrics,
    )
    .unwrap();
    assert_eq!(result.len(), 1);
}

#[test]
fn write_off_removal_runs_after_the_anti_join() {
    let mut metrics = RunMetrics::new();
    let written_off: HashSet<String> = ["A-1".to_string()].into_iter().collect();
    let result = devolucao(
        &agency_fixture(),
        &source_fixture(),
        "chave",
        "chave",
        &filters(),
        &written_off,
        &mut metrics,
    )
    .unwrap();

    assert_eq!(metrics.get(checkpoints::RESULT_COUNT), Some(1));
    assert_eq!(metrics.get(checkpoints::REMOVED_BY_WRITE_OFF), Some(1));
    assert_eq!(metrics.get(checkpoints::FINAL_COUNT), Some(0));
    assert!(result.is_empty());
}
