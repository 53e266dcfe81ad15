// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

/// Server-side paths and limits. The record, template, and artifact paths
/// are fixed per deployment; the binary overrides the defaults from
/// `FORMBRIDGE_*` environment variables.
#[derive(Debug, Clone)]
pub struct FormConfig {
    pub records_path: PathBuf,
    pub template_path: PathBuf,
    pub filled_output_path: PathBuf,
    pub normalized_output_path: PathBuf,
    pub max_body_bytes: usize,
    /// When set, `?path=` on the record endpoints is restricted to the
    /// configured records path; ad-hoc paths get a 400.
    pub restrict_record_paths: bool,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            records_path: PathBuf::from("data/values.csv"),
            template_path: PathBuf::from("data/template.json"),
            filled_output_path: PathBuf::from("artifacts/filled.json"),
            normalized_output_path: PathBuf::from("artifacts/filled_renamed.json"),
            max_body_bytes: 256 * 1024,
            restrict_record_paths: false,
        }
    }
}
