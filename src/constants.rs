/// Constants for derived and annotation columns added by the pipeline.
pub mod columns {
    /// Column receiving the derived reconciliation key.
    pub const DERIVED_KEY: &str = "chave";
    /// Column receiving joined reason codes on exported invalid partitions.
    pub const REASONS: &str = "motivos";
}

/// Checkpoint names recorded in [`crate::RunMetrics`] during one run.
pub mod checkpoints {
    /// Agency rows entering the devolução filter chain.
    pub const INPUT_COUNT: &str = "input_count";
    /// Rows surviving the status equality filter.
    pub const AFTER_STATUS_FILTER: &str = "after_status_filter";
    /// Rows surviving the campaign substring filter.
    pub const AFTER_CAMPAIGN_FILTER: &str = "after_campaign_filter";
    /// Rows surviving the excluded-status filter.
    pub const AFTER_EXCLUSION_FILTER: &str = "after_exclusion_filter";
    /// Rows left after the devolução anti-join.
    pub const RESULT_COUNT: &str = "result_count";
    /// Rows dropped because their key was already written off.
    pub const REMOVED_BY_WRITE_OFF: &str = "removed_by_write_off";
    /// Final devolução rows after write-off removal.
    pub const FINAL_COUNT: &str = "final_count";
    /// Agency rows collapsed by the deduplicator.
    pub const REMOVED_BY_DUPLICATE_KEY: &str = "removed_by_duplicate_key";
    /// Source rows missing from the agency ledger.
    pub const BATIMENTO_COUNT: &str = "batimento_count";
    /// Source rows that passed validation.
    pub const SOURCE_VALID: &str = "source_valid_count";
    /// Source rows routed to the invalid partition.
    pub const SOURCE_INVALID: &str = "source_invalid_count";
    /// Agency rows that passed validation.
    pub const AGENCY_VALID: &str = "agency_valid_count";
    /// Agency rows routed to the invalid partition.
    pub const AGENCY_INVALID: &str = "agency_invalid_count";
    /// Devolução rows whose document is in the judicial identity set.
    pub const JUDICIAL_COUNT: &str = "judicial_count";
    /// Devolução rows outside the judicial identity set.
    pub const EXTRAJUDICIAL_COUNT: &str = "extrajudicial_count";
}

/// Constants used by cell normalization.
pub mod normalize {
    /// Textual sentinels treated as empty cells (compared lowercase).
    pub const EMPTY_SENTINELS: [&str; 4] = ["nan", "none", "nat", "null"];

    /// Date-only formats tried in order; day-first formats come first so
    /// ambiguous values resolve day-first.
    pub const DATE_FORMATS: [&str; 6] = [
        "%d/%m/%Y",
        "%d-%m-%Y",
        "%d.%m.%Y",
        "%Y-%m-%d",
        "%Y/%m/%d",
        "%m/%d/%Y",
    ];

    /// Timestamp formats tried after the date-only formats.
    pub const DATETIME_FORMATS: [&str; 4] = [
        "%d/%m/%Y %H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];
}

/// Constants used by key derivation.
pub mod key {
    /// Separator joining key parts when a spec does not set one.
    pub const DEFAULT_SEPARATOR: &str = "-";
}

/// Constants used when exporting validation results.
pub mod validate {
    /// Delimiter joining reason codes in the exported invalid artifact.
    pub const REASON_DELIMITER: &str = ";";
}
