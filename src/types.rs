/// Name of a column/field in a tabular dataset.
/// Examples: `CONTRATO`, `PARCELA`, `CPF_CNPJ`, `STATUS`
pub type FieldName = String;
/// Label identifying a dataset inside errors, logs and metrics.
/// Examples: `emccamp`, `max`, `vic_extrato`
pub type DatasetName = String;
/// Composite reconciliation key derived from one or more record fields.
/// Example: `123456-003`
pub type Key = String;
/// Name of a metrics checkpoint recorded during one run.
/// Examples: `after_status_filter`, `result_count`
pub type CheckpointName = String;
/// Digits-only document identifier (CPF/CNPJ), leading zeros preserved.
/// Examples: `04852096000`, `12345678000190`
pub type DocumentDigits = String;
/// Business status value carried by agency records.
/// Examples: `ATIVO`, `QUITADO`, `JUDICIAL`
pub type StatusValue = String;
