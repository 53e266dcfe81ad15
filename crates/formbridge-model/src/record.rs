// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

/// Column that keys every record regardless of shape.
pub const KEY_COLUMN: &str = "Field";

/// Header layout of the plain key/value shape, in file order.
pub const KEY_VALUE_COLUMNS: [&str; 2] = ["Field", "Value"];

/// Header layout of the metadata shape, in file order.
pub const METADATA_COLUMNS: [&str; 5] = ["Field", "Section", "Notes", "PdfPage", "DataType"];

/// The two record layouts a store file can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordShape {
    KeyValue,
    Metadata,
}

impl RecordShape {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::KeyValue => "key_value",
            Self::Metadata => "metadata",
        }
    }

    /// Header row for this shape, in the order it is written to disk.
    #[must_use]
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            Self::KeyValue => &KEY_VALUE_COLUMNS,
            Self::Metadata => &METADATA_COLUMNS,
        }
    }
}

/// Picks the record shape from a header row. Pure and evaluated once per
/// load: a `Value` column selects the plain key/value shape, anything else
/// (including headers with no recognizable columns) falls back to the
/// metadata shape. Header validity beyond shape choice is the reader's
/// problem, not this function's.
#[must_use]
pub fn resolve_shape<S: AsRef<str>>(headers: &[S]) -> RecordShape {
    if headers.iter().any(|h| h.as_ref() == "Value") {
        RecordShape::KeyValue
    } else {
        RecordShape::Metadata
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct KeyValueRecord {
    pub field: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct MetadataRecord {
    pub field: String,
    #[serde(default)]
    pub section: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub pdf_page: String,
    #[serde(default)]
    pub data_type: String,
}

/// One entry in the flat store. The variant matches the shape the backing
/// file was decoded with; wire payloads use the CSV column names as JSON
/// keys, so `{"Field": ..., "Value": ...}` decodes to the key/value variant
/// and anything else keyed by `Field` decodes to the metadata variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Record {
    KeyValue(KeyValueRecord),
    Metadata(MetadataRecord),
}

impl Record {
    #[must_use]
    pub fn key_value(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::KeyValue(KeyValueRecord {
            field: field.into(),
            value: value.into(),
        })
    }

    #[must_use]
    pub fn field(&self) -> &str {
        match self {
            Self::KeyValue(r) => &r.field,
            Self::Metadata(r) => &r.field,
        }
    }

    #[must_use]
    pub const fn shape(&self) -> RecordShape {
        match self {
            Self::KeyValue(_) => RecordShape::KeyValue,
            Self::Metadata(_) => RecordShape::Metadata,
        }
    }

    /// The value this record contributes to a form fill. Metadata records
    /// describe a field but carry nothing to project onto it.
    #[must_use]
    pub fn fill_value(&self) -> Option<&str> {
        match self {
            Self::KeyValue(r) => Some(&r.value),
            Self::Metadata(_) => None,
        }
    }

    /// Re-shapes the record to the layout of the store it is written into.
    /// Columns the target shape lacks are dropped; columns the source shape
    /// lacks come out empty, mirroring lenient CSV binding.
    #[must_use]
    pub fn conform_to(self, shape: RecordShape) -> Self {
        match (self, shape) {
            (rec @ Self::KeyValue(_), RecordShape::KeyValue) => rec,
            (rec @ Self::Metadata(_), RecordShape::Metadata) => rec,
            (Self::KeyValue(r), RecordShape::Metadata) => Self::Metadata(MetadataRecord {
                field: r.field,
                section: String::new(),
                notes: String::new(),
                pdf_page: String::new(),
                data_type: String::new(),
            }),
            (Self::Metadata(r), RecordShape::KeyValue) => Self::KeyValue(KeyValueRecord {
                field: r.field,
                value: String::new(),
            }),
        }
    }
}

/// The ordered record collection backing exactly one store file. Loaded
/// fresh per operation; there is no persistent index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSet {
    pub shape: RecordShape,
    pub records: Vec<Record>,
}

impl RecordSet {
    #[must_use]
    pub fn new(shape: RecordShape) -> Self {
        Self {
            shape,
            records: Vec::new(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Index of the record keyed by `field`, if present. First match wins;
    /// duplicate keys can exist after a destructive batch replace.
    #[must_use]
    pub fn position_of(&self, field: &str) -> Option<usize> {
        self.records.iter().position(|r| r.field() == field)
    }
}
