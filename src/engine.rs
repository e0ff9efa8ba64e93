use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::constants::checkpoints;
use crate::data::Dataset;
use crate::errors::ReconError;
use crate::metrics::RunMetrics;
use crate::types::{FieldName, Key, StatusValue};

/// Records of `left` whose key has no match in `right`.
///
/// Keys are compared after trim only; case is preserved. Membership is
/// tested against a hash set of `right`'s keys, so the pass is
/// O(|left| + |right|) — never a nested scan.
pub fn anti_join(
    left: &Dataset,
    right: &Dataset,
    key_left: &str,
    key_right: &str,
) -> Result<Dataset, ReconError> {
    left.require_column(key_left)?;
    right.require_column(key_right)?;

    let right_keys: HashSet<String> = right
        .iter()
        .map(|record| record.rendered(key_right).trim().to_string())
        .collect();
    let result = left.filter(|record| {
        let key = record.rendered(key_left);
        !right_keys.contains(key.trim())
    });
    debug!(
        left = left.name(),
        right = right.name(),
        kept = result.len(),
        dropped = left.len() - result.len(),
        "anti-join"
    );
    Ok(result)
}

/// Inclusion/exclusion filters applied to the agency ledger before the
/// devolução anti-join.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FilterSpec {
    /// Column carrying the collection status.
    #[serde(default)]
    pub status_field: Option<FieldName>,
    /// Status value a record must equal (trimmed, case-insensitive) to stay.
    #[serde(default)]
    pub status_accept: Option<StatusValue>,
    /// Column carrying the campaign tag.
    #[serde(default)]
    pub campaign_field: Option<FieldName>,
    /// Substring the campaign tag must contain (case-insensitive) to stay.
    #[serde(default)]
    pub campaign_contains: Option<String>,
    /// Status values that always drop a record, evaluated after the
    /// inclusion filters.
    #[serde(default)]
    pub excluded_status: Vec<StatusValue>,
}

/// Batimento direction: source records the agency is not tracking.
pub fn batimento(
    source: &Dataset,
    agency: &Dataset,
    source_key: &str,
    agency_key: &str,
    metrics: &mut RunMetrics,
) -> Result<Dataset, ReconError> {
    let result = anti_join(source, agency, source_key, agency_key)?;
    metrics.record(checkpoints::BATIMENTO_COUNT, result.len() as u64);
    info!(
        source = source.name(),
        agency = agency.name(),
        missing = result.len(),
        "batimento computed"
    );
    Ok(result)
}

/// Devolução direction: agency records the creditor no longer lists.
///
/// The filter chain runs on the anti-join *input*, in a fixed order —
/// status equality, campaign substring, excluded statuses — then the
/// anti-join against the source ledger, then removal of keys already
/// written off. A checkpoint count is recorded after every stage; callers
/// treat those counts as part of the contract.
pub fn devolucao(
    agency: &Dataset,
    source: &Dataset,
    agency_key: &str,
    source_key: &str,
    filters: &FilterSpec,
    written_off: &HashSet<Key>,
    metrics: &mut RunMetrics,
) -> Result<Dataset, ReconError> {
    metrics.record(checkpoints::INPUT_COUNT, agency.len() as u64);

    let after_status = match (&filters.status_field, &filters.status_accept) {
        (Some(field), Some(accepted)) => {
            agency.require_column(field)?;
            agency.filter(|record| {
                record
                    .rendered(field)
                    .trim()
                    .eq_ignore_ascii_case(accepted.trim())
            })
        }
        _ => agency.clone(),
    };
    metrics.record(checkpoints::AFTER_STATUS_FILTER, after_status.len() as u64);

    let after_campaign = match (&filters.campaign_field, &filters.campaign_contains) {
        (Some(field), Some(fragment)) => {
            after_status.require_column(field)?;
            let fragment = fragment.to_lowercase();
            after_status.filter(|record| {
                record
                    .rendered(field)
                    .to_lowercase()
                    .contains(&fragment)
            })
        }
        _ => after_status,
    };
    metrics.record(
        checkpoints::AFTER_CAMPAIGN_FILTER,
        after_campaign.len() as u64,
    );

    let after_exclusion = match &filters.status_field {
        Some(field) if !filters.excluded_status.is_empty() => {
            after_campaign.require_column(field)?;
            after_campaign.filter(|record| {
                let status = record.rendered(field);
                let status = status.trim();
                !filters
                    .excluded_status
                    .iter()
                    .any(|excluded| status.eq_ignore_ascii_case(excluded.trim()))
            })
        }
        _ => after_campaign,
    };
    metrics.record(
        checkpoints::AFTER_EXCLUSION_FILTER,
        after_exclusion.len() as u64,
    );

    let joined = anti_join(&after_exclusion, source, agency_key, source_key)?;
    let joined_count = joined.len();
    metrics.record(checkpoints::RESULT_COUNT, joined_count as u64);

    let result = if written_off.is_empty() {
        joined
    } else {
        joined.filter(|record| {
            let key = record.rendered(agency_key);
            !written_off.contains(key.trim())
        })
    };
    metrics.record(
        checkpoints::REMOVED_BY_WRITE_OFF,
        (joined_count - result.len()) as u64,
    );
    metrics.record(checkpoints::FINAL_COUNT, result.len() as u64);
    info!(
        agency = agency.name(),
        source = source.name(),
        returned = result.len(),
        "devolução computed"
    );
    Ok(result)
}
