// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use std::fmt;

/// One addressable input slot of a form document. The name may be empty;
/// such fields exist in real templates and are repaired by normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NamedField {
    pub name: String,
    #[serde(default)]
    pub value: String,
}

impl NamedField {
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A form document: an ordered collection of named fields. Serves both as
/// the read-only template input and as the filled artifact written after a
/// projection pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct FormDocument {
    pub fields: Vec<NamedField>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentError(pub String);

impl fmt::Display for DocumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for DocumentError {}

impl FormDocument {
    #[must_use]
    pub fn new(fields: Vec<NamedField>) -> Self {
        Self { fields }
    }

    /// Field names in template order. Empty names are included; callers
    /// that need every field addressable must normalize first.
    #[must_use]
    pub fn field_names(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name.clone()).collect()
    }

    #[must_use]
    pub fn value_of(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }

    pub fn from_json_bytes(bytes: &[u8]) -> Result<Self, DocumentError> {
        serde_json::from_slice(bytes).map_err(|e| DocumentError(e.to_string()))
    }

    pub fn to_json_bytes(&self) -> Result<Vec<u8>, DocumentError> {
        serde_json::to_vec_pretty(self).map_err(|e| DocumentError(e.to_string()))
    }
}
