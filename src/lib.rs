#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Aggregate per-portfolio run configuration.
pub mod config;
/// Centralized column names, checkpoint names and normalizer constants.
pub mod constants;
/// Value, record and dataset types shared by every stage.
pub mod data;
/// Keyed deduplication with date tie-breaking.
pub mod dedup;
/// Anti-join core plus the batimento/devolução directions.
pub mod engine;
/// Reconciliation key composition.
pub mod key;
/// Fixed-order output projection and column remapping.
pub mod layout;
/// Per-run checkpoint counters.
pub mod metrics;
/// Pure cell normalization helpers.
pub mod normalize;
/// Full pipeline orchestration.
pub mod run;
/// Judicial/extrajudicial segmentation.
pub mod segment;
/// Shared type aliases.
pub mod types;
/// Rule-based record validation and partitioning.
pub mod validate;

mod errors;

pub use config::ReconConfig;
pub use data::{Dataset, Record, Value};
pub use dedup::deduplicate;
pub use engine::{anti_join, batimento, devolucao, FilterSpec};
pub use errors::ReconError;
pub use key::{append_keys, KeySpec};
pub use layout::{format_layout, InjectedColumn, LayoutColumn, LayoutSpec};
pub use metrics::RunMetrics;
pub use run::{run_reconciliation, AuxiliarySets, ReconReport};
pub use segment::{segment, Segmentation};
pub use types::{DatasetName, DocumentDigits, FieldName, Key};
pub use validate::{
    validate, DuplicatePolicy, InvalidRecord, ReasonCode, ValidationOutcome, ValidationSpec,
};
