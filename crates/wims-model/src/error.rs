//! Lifecycle and dispatch error types for wims-model.

use thiserror::Error;
use wims_api::{ApiError, Missing};
use wims_core::CoreError;

/// Errors from operations on classes and their items.
///
/// Local preconditions (`NotBound`, `InvalidItemType`, `Validation`,
/// `Unidentified`) are always reported before any request is sent.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The object is not (or no longer) bound to a remote record.
    #[error("Not bound to a remote record: {0}")]
    NotBound(String),

    /// The item type is not registered, or no type was given.
    #[error("Invalid item type: {0}")]
    InvalidItemType(String),

    /// A descriptive field is outside its legal set.
    #[error(transparent)]
    Validation(#[from] CoreError),

    /// The server refused the request or could not be reached.
    #[error(transparent)]
    Remote(#[from] ApiError),

    /// The item has no identifier yet.
    #[error("{kind} has no identifier yet")]
    Unidentified { kind: String },

    /// A remote record could not be mapped onto a local type.
    #[error("Cannot decode remote record: {0}")]
    Decode(String),
}

impl ModelError {
    /// Whether the server reported the addressed record as absent.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Remote(e) if e.is_not_found())
    }

    /// What the server reported as absent, if it did.
    #[must_use]
    pub const fn missing(&self) -> Option<Missing> {
        match self {
            Self::Remote(e) => e.missing(),
            _ => None,
        }
    }
}
