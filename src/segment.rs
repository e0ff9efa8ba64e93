use std::collections::HashSet;

use tracing::debug;

use crate::data::Dataset;
use crate::errors::ReconError;
use crate::normalize::normalize_document;
use crate::types::DocumentDigits;

/// A reconciliation result split into judicial and extrajudicial buckets.
#[derive(Clone, Debug)]
pub struct Segmentation {
    /// Records whose document is in the judicial identity set.
    pub judicial: Dataset,
    /// Everything else, including records with empty documents.
    pub extrajudicial: Dataset,
}

/// Split `result` by membership of the digits-normalized document field in
/// `judicial_ids`.
///
/// No record is dropped: a document absent from the identity set — or
/// empty — always falls to extrajudicial, so
/// `judicial.len() + extrajudicial.len() == result.len()` holds for every
/// input.
pub fn segment(
    result: &Dataset,
    document_field: &str,
    judicial_ids: &HashSet<DocumentDigits>,
) -> Result<Segmentation, ReconError> {
    result.require_column(document_field)?;

    let mut judicial = Dataset::new(
        format!("{}_judicial", result.name()),
        result.schema().to_vec(),
    );
    let mut extrajudicial = Dataset::new(
        format!("{}_extrajudicial", result.name()),
        result.schema().to_vec(),
    );
    for record in result.iter() {
        let digits = record
            .get(document_field)
            .map(normalize_document)
            .unwrap_or_default();
        if !digits.is_empty() && judicial_ids.contains(&digits) {
            judicial.push(record.clone());
        } else {
            extrajudicial.push(record.clone());
        }
    }
    debug!(
        result = result.name(),
        judicial = judicial.len(),
        extrajudicial = extrajudicial.len(),
        "segmented result"
    );
    Ok(Segmentation {
        judicial,
        extrajudicial,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Record;

    fn result_with_documents(documents: &[&str]) -> Dataset {
        Dataset::with_records(
            "devolucao",
            vec!["CPF_CNPJ".to_string()],
            documents
                .iter()
                .map(|document| Record::new().with_field("CPF_CNPJ", *document))
                .collect(),
        )
    }

    #[test]
    fn membership_is_tested_on_normalized_digits() {
        let result = result_with_documents(&["048.520.960-00", "111.222.333-44"]);
        let judicial_ids: HashSet<String> = ["04852096000".to_string()].into_iter().collect();
        let split = segment(&result, "CPF_CNPJ", &judicial_ids).unwrap();
        assert_eq!(split.judicial.len(), 1);
        assert_eq!(split.extrajudicial.len(), 1);
        assert_eq!(
            split.judicial.records()[0].rendered("CPF_CNPJ"),
            "048.520.960-00"
        );
    }

    #[test]
    fn no_record_is_dropped_and_empty_documents_fall_extrajudicial() {
        let result = result_with_documents(&["048.520.960-00", "", "  ", "999.888.777-66"]);
        let judicial_ids: HashSet<String> = ["04852096000".to_string()].into_iter().collect();
        let split = segment(&result, "CPF_CNPJ", &judicial_ids).unwrap();
        assert_eq!(
            split.judicial.len() + split.extrajudicial.len(),
            result.len()
        );
        assert_eq!(split.extrajudicial.len(), 3);
    }

    #[test]
    fn empty_identity_set_sends_everything_extrajudicial() {
        let result = result_with_documents(&["048.520.960-00"]);
        let split = segment(&result, "CPF_CNPJ", &HashSet::new()).unwrap();
        assert!(split.judicial.is_empty());
        assert_eq!(split.extrajudicial.len(), 1);
    }

    #[test]
    fn missing_document_column_is_fatal() {
        let result = Dataset::new("devolucao", vec!["chave".to_string()]);
        let err = segment(&result, "CPF_CNPJ", &HashSet::new()).unwrap_err();
        assert!(matches!(err, ReconError::MissingColumn { .. }));
    }
}
