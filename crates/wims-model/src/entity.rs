//! Lifecycle of a local object mirroring a remote record.
//!
//! ```text
//! Unbound --create/get--> Bound --delete--> Deleted
//! ```
//!
//! Every operation that needs the remote identity goes through
//! [`EntityState::bound`], which is the single place where the
//! "not bound" error is raised.

use wims_core::Identity;

use crate::error::ModelError;

/// Lifecycle stage, as reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifecycle {
    /// Built locally, never saved nor fetched.
    Unbound,
    /// Mirrors an existing remote record.
    Bound,
    /// The remote record was deleted through this object. Terminal.
    Deleted,
}

impl Lifecycle {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unbound => "unbound",
            Self::Bound => "bound",
            Self::Deleted => "deleted",
        }
    }
}

/// What a bound class knows about its remote record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub identity: Identity,
    pub qclass: u32,
}

/// Lifecycle state carrying the binding once there is one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityState<B> {
    Unbound,
    Bound(B),
    Deleted,
}

impl<B> EntityState<B> {
    #[must_use]
    pub const fn lifecycle(&self) -> Lifecycle {
        match self {
            Self::Unbound => Lifecycle::Unbound,
            Self::Bound(_) => Lifecycle::Bound,
            Self::Deleted => Lifecycle::Deleted,
        }
    }

    /// The binding, or `NotBound` naming `operation`.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::NotBound` unless the state is `Bound`.
    pub fn bound(&self, operation: &str) -> Result<&B, ModelError> {
        match self {
            Self::Bound(binding) => Ok(binding),
            Self::Unbound => Err(ModelError::NotBound(format!(
                "{operation} is not available until the object has been saved or fetched"
            ))),
            Self::Deleted => Err(ModelError::NotBound(format!(
                "{operation} is not available on a deleted object"
            ))),
        }
    }

    pub fn bind(&mut self, binding: B) {
        *self = Self::Bound(binding);
    }

    pub fn release(&mut self) {
        *self = Self::Deleted;
    }
}
