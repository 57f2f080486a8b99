//! Cross-cutting error types for the WIMS client.
//!
//! Transport errors (`ApiError`) and lifecycle errors (`ModelError`) live in
//! their own crates; `ModelError` wraps this one.

use thiserror::Error;

/// Errors raised while building local values, before any remote call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A field value is outside its legal set or format.
    #[error("Invalid value {value:?} for '{field}': {reason}")]
    Validation {
        field: &'static str,
        value: String,
        reason: String,
    },
}

impl CoreError {
    #[must_use]
    pub fn validation(
        field: &'static str,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Validation {
            field,
            value: value.into(),
            reason: reason.into(),
        }
    }
}
