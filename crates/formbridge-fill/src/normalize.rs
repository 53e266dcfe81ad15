// SPDX-License-Identifier: Apache-2.0

use crate::error::FillError;
use formbridge_model::FormDocument;
use formbridge_store::{atomic_write, path_lock};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use tracing::info;

/// Prefix for synthetic names assigned to unnamed fields.
pub const UNNAMED_PREFIX: &str = "UnnamedField";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct NormalizeReport {
    pub fields_total: usize,
    pub fields_renamed: usize,
}

/// Assigns synthetic names to every unnamed field, in template order.
///
/// Names are `UnnamedField{N}` with N starting past the largest synthetic
/// suffix already present, so re-running after a partial pass never reuses
/// a consumed value. A candidate that collides with any existing name,
/// original or synthetic, is skipped in favor of the next counter value.
/// Already-named fields are untouched; running on a fully named document is
/// a no-op.
#[must_use]
pub fn normalize_fields(document: &FormDocument) -> (FormDocument, usize) {
    let mut used: BTreeSet<String> = document
        .fields
        .iter()
        .map(|f| f.name.clone())
        .filter(|name| !name.is_empty())
        .collect();

    let mut counter = used
        .iter()
        .filter_map(|name| synthetic_suffix(name))
        .max()
        .unwrap_or(0);

    let mut normalized = document.clone();
    let mut renamed = 0;
    for field in &mut normalized.fields {
        if !field.name.is_empty() {
            continue;
        }
        let name = loop {
            counter += 1;
            let candidate = format!("{UNNAMED_PREFIX}{counter}");
            if !used.contains(&candidate) {
                break candidate;
            }
        };
        used.insert(name.clone());
        field.name = name;
        renamed += 1;
    }
    (normalized, renamed)
}

/// Reads the document at `input_path`, normalizes unnamed fields, and
/// writes the renamed copy to `output_path`. The original is never
/// overwritten; the output path is guarded by its own exclusive lock.
pub fn normalize_document(
    input_path: &Path,
    output_path: &Path,
) -> Result<NormalizeReport, FillError> {
    let bytes = fs::read(input_path)
        .map_err(|e| FillError::not_found(format!("{}: {e}", input_path.display())))?;
    let document = FormDocument::from_json_bytes(&bytes)
        .map_err(|e| FillError::format(format!("{}: {e}", input_path.display())))?;

    let (normalized, renamed) = normalize_fields(&document);
    let out_bytes = normalized
        .to_json_bytes()
        .map_err(|e| FillError::io(e.to_string()))?;

    let lock = path_lock(output_path);
    let guard = lock
        .write()
        .map_err(|_| FillError::io("output lock poisoned"))?;
    atomic_write(output_path, &out_bytes)?;
    drop(guard);

    info!(
        output = %output_path.display(),
        renamed,
        "normalized document written"
    );
    Ok(NormalizeReport {
        fields_total: normalized.fields.len(),
        fields_renamed: renamed,
    })
}

fn synthetic_suffix(name: &str) -> Option<u64> {
    name.strip_prefix(UNNAMED_PREFIX)?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use formbridge_model::NamedField;

    fn doc(names: &[&str]) -> FormDocument {
        FormDocument::new(names.iter().map(|n| NamedField::new(*n, "")).collect())
    }

    #[test]
    fn unnamed_fields_get_distinct_synthetic_names_in_order() {
        let (out, renamed) = normalize_fields(&doc(&["A", "", "B", ""]));
        assert_eq!(renamed, 2);
        assert_eq!(
            out.field_names(),
            vec!["A", "UnnamedField1", "B", "UnnamedField2"]
        );
    }

    #[test]
    fn renormalizing_a_named_document_is_a_no_op() {
        let (first, _) = normalize_fields(&doc(&["A", "", "B"]));
        let (second, renamed) = normalize_fields(&first);
        assert_eq!(renamed, 0);
        assert_eq!(second, first);
    }

    #[test]
    fn counter_seeds_past_existing_synthetic_suffixes() {
        let (out, _) = normalize_fields(&doc(&["UnnamedField3", "", "A"]));
        assert_eq!(out.field_names(), vec!["UnnamedField3", "UnnamedField4", "A"]);
    }

    #[test]
    fn collision_with_an_original_name_skips_to_the_next_free_value() {
        // "UnnamedField1" exists as a real template name; the synthetic
        // counter must step over it, never shadow it.
        let (out, _) = normalize_fields(&doc(&["UnnamedField1", ""]));
        assert_eq!(out.field_names(), vec!["UnnamedField1", "UnnamedField2"]);
    }

    #[test]
    fn named_fields_keep_their_values() {
        let document = FormDocument::new(vec![
            NamedField::new("A", "kept"),
            NamedField::new("", "also kept"),
        ]);
        let (out, _) = normalize_fields(&document);
        assert_eq!(out.fields[0].value, "kept");
        assert_eq!(out.fields[1].value, "also kept");
        assert_eq!(out.fields[1].name, "UnnamedField1");
    }
}
