// SPDX-License-Identifier: Apache-2.0

//! Diagnostic exporters. Read-only, no business logic: they move artifacts
//! and field inventories across the service boundary, nothing more.

use crate::error::FillError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use formbridge_model::FormDocument;
use std::fs;
use std::path::Path;

/// Ordered field names of the template at `path`. Empty names are included;
/// this is the diagnostic view a caller uses to decide whether
/// normalization is needed.
pub fn list_field_names(path: &Path) -> Result<Vec<String>, FillError> {
    let bytes =
        fs::read(path).map_err(|e| FillError::not_found(format!("{}: {e}", path.display())))?;
    let document = FormDocument::from_json_bytes(&bytes)
        .map_err(|e| FillError::format(format!("{}: {e}", path.display())))?;
    Ok(document.field_names())
}

/// Standard base64, the text-safe encoding used to hand the filled artifact
/// to the transport layer.
#[must_use]
pub fn encode_for_transport(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Base64 of the artifact at `path`, or `NotFound` if no fill has produced
/// it yet.
pub fn load_document_base64(path: &Path) -> Result<String, FillError> {
    let bytes =
        fs::read(path).map_err(|e| FillError::not_found(format!("{}: {e}", path.display())))?;
    Ok(encode_for_transport(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_encoding_is_standard_base64() {
        assert_eq!(encode_for_transport(b"formbridge"), "Zm9ybWJyaWRnZQ==");
    }

    #[test]
    fn missing_artifact_is_not_found() {
        let err = load_document_base64(Path::new("/nonexistent/filled.json"))
            .expect_err("must fail");
        assert_eq!(err.code, crate::FillErrorCode::NotFound);
    }
}
