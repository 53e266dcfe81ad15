// SPDX-License-Identifier: Apache-2.0

use formbridge_store::{StoreError, StoreErrorCode};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillErrorCode {
    /// Template, store, or artifact file missing or unreadable.
    NotFound,
    /// A document that does not parse as a form document, or a store file
    /// with a broken header.
    Format,
    Io,
    Internal,
}

impl FillErrorCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Format => "format_error",
            Self::Io => "io_error",
            Self::Internal => "internal_error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FillError {
    pub code: FillErrorCode,
    pub message: String,
}

impl FillError {
    #[must_use]
    pub fn new(code: FillErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(FillErrorCode::NotFound, message)
    }

    #[must_use]
    pub fn format(message: impl Into<String>) -> Self {
        Self::new(FillErrorCode::Format, message)
    }

    #[must_use]
    pub fn io(message: impl Into<String>) -> Self {
        Self::new(FillErrorCode::Io, message)
    }
}

impl From<StoreError> for FillError {
    fn from(err: StoreError) -> Self {
        let code = match err.code {
            StoreErrorCode::NotFound => FillErrorCode::NotFound,
            StoreErrorCode::Format | StoreErrorCode::EmptyPayload => FillErrorCode::Format,
            StoreErrorCode::Io => FillErrorCode::Io,
            StoreErrorCode::Internal => FillErrorCode::Internal,
        };
        Self::new(code, err.message)
    }
}

impl fmt::Display for FillError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for FillError {}
