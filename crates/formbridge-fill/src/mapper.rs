// SPDX-License-Identifier: Apache-2.0

use crate::error::FillError;
use formbridge_model::{FormDocument, RecordSet};
use formbridge_store::{atomic_write, path_lock, read_records};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;
use tracing::info;

/// Summary of one fill run, returned to the caller and logged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FillReport {
    pub fields_total: usize,
    pub fields_filled: usize,
    pub records_applied: usize,
    pub artifact_sha256: String,
}

/// Projects the record set onto the template's named fields by exact name
/// match, in stored record order. A record with no matching field is
/// dropped silently; fields a PDF-style template declares but the store
/// never mentions (calculated fields, say) are a normal condition, not an
/// error. Duplicate keys in the set resolve last-write-wins. The input
/// template is never mutated.
#[must_use]
pub fn apply_records(records: &RecordSet, template: &FormDocument) -> FormDocument {
    let mut filled = template.clone();
    for record in &records.records {
        let Some(value) = record.fill_value() else {
            continue;
        };
        if let Some(field) = filled.fields.iter_mut().find(|f| f.name == record.field()) {
            field.value = value.to_string();
        }
    }
    filled
}

/// Full fill operation: read the record store, read the template, project,
/// write the filled artifact to `output_path`. The output path is guarded
/// by its own exclusive lock so two fills of the same artifact cannot
/// interleave.
pub fn fill_document(
    records_path: &Path,
    template_path: &Path,
    output_path: &Path,
) -> Result<FillReport, FillError> {
    let records = read_records(records_path)?;

    let template_bytes = fs::read(template_path)
        .map_err(|e| FillError::not_found(format!("{}: {e}", template_path.display())))?;
    let template = FormDocument::from_json_bytes(&template_bytes)
        .map_err(|e| FillError::format(format!("{}: {e}", template_path.display())))?;

    let filled = apply_records(&records, &template);
    let fields_filled = filled
        .fields
        .iter()
        .zip(&template.fields)
        .filter(|(after, before)| after.value != before.value)
        .count();

    let bytes = filled
        .to_json_bytes()
        .map_err(|e| FillError::io(e.to_string()))?;

    let lock = path_lock(output_path);
    let guard = lock
        .write()
        .map_err(|_| FillError::io("output lock poisoned"))?;
    atomic_write(output_path, &bytes)?;
    drop(guard);

    let report = FillReport {
        fields_total: filled.fields.len(),
        fields_filled,
        records_applied: records.len(),
        artifact_sha256: sha256_hex(&bytes),
    };
    info!(
        output = %output_path.display(),
        fields_total = report.fields_total,
        fields_filled = report.fields_filled,
        "filled document written"
    );
    Ok(report)
}

#[must_use]
pub(crate) fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use formbridge_model::{NamedField, Record, RecordShape};

    fn template() -> FormDocument {
        FormDocument::new(vec![
            NamedField::new("name", ""),
            NamedField::new("age", "unset"),
            NamedField::new("total", "=SUM"),
        ])
    }

    fn record_set(records: Vec<Record>) -> RecordSet {
        RecordSet {
            shape: RecordShape::KeyValue,
            records,
        }
    }

    #[test]
    fn matching_records_set_field_values_in_stored_order() {
        let records = record_set(vec![
            Record::key_value("name", "Alice"),
            Record::key_value("age", "30"),
        ]);
        let filled = apply_records(&records, &template());
        assert_eq!(filled.value_of("name"), Some("Alice"));
        assert_eq!(filled.value_of("age"), Some("30"));
        assert_eq!(filled.value_of("total"), Some("=SUM"));
    }

    #[test]
    fn unmatched_record_is_dropped_without_touching_the_document() {
        let records = record_set(vec![Record::key_value("phantom", "x")]);
        let before = template();
        let filled = apply_records(&records, &before);
        assert_eq!(filled, before);
    }

    #[test]
    fn duplicate_keys_resolve_last_write_wins() {
        let records = record_set(vec![
            Record::key_value("age", "30"),
            Record::key_value("age", "31"),
        ]);
        let filled = apply_records(&records, &template());
        assert_eq!(filled.value_of("age"), Some("31"));
    }

    #[test]
    fn metadata_records_carry_nothing_to_project() {
        let rec: Record = serde_json::from_str(r#"{"Field":"name","Notes":"note"}"#)
            .expect("decode metadata record");
        let records = RecordSet {
            shape: RecordShape::Metadata,
            records: vec![rec],
        };
        let before = template();
        assert_eq!(apply_records(&records, &before), before);
    }
}
