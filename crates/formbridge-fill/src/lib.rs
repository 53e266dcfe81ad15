#![forbid(unsafe_code)]
//! Form-fill pipeline: projects store records onto a template's named
//! fields, repairs unnamed fields with synthetic names, and exposes the
//! diagnostic exporters the service boundary needs.

mod error;
mod export;
mod mapper;
mod normalize;

pub use error::{FillError, FillErrorCode};
pub use export::{encode_for_transport, list_field_names, load_document_base64};
pub use mapper::{apply_records, fill_document, FillReport};
pub use normalize::{normalize_document, normalize_fields, NormalizeReport, UNNAMED_PREFIX};

pub const CRATE_NAME: &str = "formbridge-fill";
