use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::types::CheckpointName;

/// Named counters recorded at fixed checkpoints during one reconciliation
/// run.
///
/// One instance lives per run and is discarded after that run's report is
/// built; nothing aggregates across runs. Checkpoints keep their recording
/// order, so exported metrics read in pipeline order.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RunMetrics {
    counters: IndexMap<CheckpointName, u64>,
}

impl RunMetrics {
    /// Fresh, empty metrics for one run.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the count observed at a checkpoint.
    pub fn record(&mut self, checkpoint: &str, value: u64) {
        self.counters.insert(checkpoint.to_string(), value);
    }

    /// Count recorded at `checkpoint`, if the stage ran.
    pub fn get(&self, checkpoint: &str) -> Option<u64> {
        self.counters.get(checkpoint).copied()
    }

    /// Iterate checkpoints in recording order.
    pub fn iter(&self) -> impl Iterator<Item = (&CheckpointName, u64)> {
        self.counters.iter().map(|(name, value)| (name, *value))
    }

    /// Number of recorded checkpoints.
    pub fn len(&self) -> usize {
        self.counters.len()
    }

    /// Returns `true` before any checkpoint is recorded.
    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }
}
