#![forbid(unsafe_code)]
//! Formbridge model SSOT: record shapes, record sets, and the form document
//! structure every other crate builds on.

mod document;
mod record;

pub use document::{DocumentError, FormDocument, NamedField};
pub use record::{
    resolve_shape, KeyValueRecord, MetadataRecord, Record, RecordSet, RecordShape,
    KEY_COLUMN, KEY_VALUE_COLUMNS, METADATA_COLUMNS,
};

pub const CRATE_NAME: &str = "formbridge-model";
