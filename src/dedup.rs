use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::data::Dataset;
use crate::errors::ReconError;
use crate::normalize::normalize_date;
use crate::types::Key;

/// Collapse a dataset to one record per key.
///
/// With no duplicate keys the input comes back unchanged by value. With a
/// tiebreak field (a settlement/event date), records sharing a key are
/// ranked by that date descending, unparsable or missing dates last; the
/// sort is stable, so original relative order breaks remaining ties.
/// Without a tiebreak field the first-encountered record per key wins.
///
/// Either way the surviving records are emitted in their original input
/// order — downstream stages rely on arrival order being preserved.
pub fn deduplicate(
    dataset: &Dataset,
    key_field: &str,
    tiebreak_field: Option<&str>,
) -> Result<Dataset, ReconError> {
    dataset.require_column(key_field)?;
    if let Some(field) = tiebreak_field {
        dataset.require_column(field)?;
    }

    let keys: Vec<Key> = dataset
        .iter()
        .map(|record| record.rendered(key_field).trim().to_string())
        .collect();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for key in &keys {
        *counts.entry(key.as_str()).or_insert(0) += 1;
    }
    if counts.values().all(|&count| count == 1) {
        return Ok(dataset.clone());
    }

    let winners: HashSet<usize> = match tiebreak_field {
        None => first_per_key(&keys),
        Some(field) => latest_per_key(dataset, &keys, field),
    };

    let records = dataset
        .iter()
        .enumerate()
        .filter(|(idx, _)| winners.contains(idx))
        .map(|(_, record)| record.clone())
        .collect();
    let deduped = Dataset::with_records(dataset.name(), dataset.schema().to_vec(), records);
    debug!(
        dataset = dataset.name(),
        removed = dataset.len() - deduped.len(),
        "collapsed duplicate keys"
    );
    Ok(deduped)
}

fn first_per_key(keys: &[Key]) -> HashSet<usize> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut winners = HashSet::new();
    for (idx, key) in keys.iter().enumerate() {
        if seen.insert(key.as_str()) {
            winners.insert(idx);
        }
    }
    winners
}

fn latest_per_key(dataset: &Dataset, keys: &[Key], tiebreak_field: &str) -> HashSet<usize> {
    let mut order: Vec<usize> = (0..keys.len()).collect();
    let dates: Vec<_> = dataset
        .iter()
        .map(|record| record.get(tiebreak_field).and_then(normalize_date))
        .collect();
    // Descending by date, None last; stable, so input order is the
    // secondary tiebreak.
    order.sort_by(|&a, &b| match (&dates[a], &dates[b]) {
        (Some(left), Some(right)) => right.cmp(left),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });

    let mut seen: HashSet<&str> = HashSet::new();
    let mut winners = HashSet::new();
    for idx in order {
        if seen.insert(keys[idx].as_str()) {
            winners.insert(idx);
        }
    }
    winners
}
