//! # wims-api
//!
//! The remote side of the WIMS client.
//!
//! [`RemoteApi`] is the contract the entity layer talks to: one method per
//! adm/raw operation, each taking the identity triple of the caller and
//! answering with a [`Record`] or an [`ApiError`] that tells "does not exist"
//! apart from any other refusal.
//!
//! Two implementations ship with the crate:
//! - [`WimsClient`], a blocking HTTP client for a real WIMS server
//! - [`MemoryApi`], an in-process server used by tests and offline work

mod client;
mod error;
mod http;
mod memory;
pub mod protocol;

pub use client::WimsClient;
pub use error::{ApiError, Missing};
pub use memory::MemoryApi;

use wims_core::Identity;

/// A flat remote record, as exchanged with the server.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Addresses one class on the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassKey<'a> {
    /// Numeric class identifier.
    pub qclass: u32,
    /// Route the class was created under.
    pub rclass: &'a str,
}

impl<'a> ClassKey<'a> {
    #[must_use]
    pub const fn new(qclass: u32, rclass: &'a str) -> Self {
        Self { qclass, rclass }
    }
}

/// Operations exposed by a WIMS server's adm/raw module.
///
/// Calls are synchronous: each method performs one logical request and blocks
/// until the server answers. Absent records are reported as
/// [`ApiError::NotFound`] tagged with what is [`Missing`]; callers decide
/// whether that is an error.
pub trait RemoteApi {
    /// Create a class and its supervisor account. Returns the class identifier
    /// assigned by the server (`qclass` when one was requested).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Remote`] if the class already exists or the
    /// server refuses the payload.
    fn create_class(
        &self,
        identity: &Identity,
        rclass: &str,
        qclass: Option<u32>,
        class: &Record,
        supervisor: &Record,
    ) -> Result<u32, ApiError>;

    /// Replace the descriptive fields of an existing class.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if the class does not exist.
    fn update_class(
        &self,
        identity: &Identity,
        class: ClassKey<'_>,
        fields: &Record,
    ) -> Result<(), ApiError>;

    /// Fetch the record of a class.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if the class does not exist.
    fn get_class(&self, identity: &Identity, class: ClassKey<'_>) -> Result<Record, ApiError>;

    /// Fetch every class created under `rclass`. Each record carries its `qclass`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] when the server knows no class for the route.
    fn list_classes(&self, identity: &Identity, rclass: &str) -> Result<Vec<Record>, ApiError>;

    /// Delete a class and everything it contains.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if the class does not exist.
    fn delete_class(&self, identity: &Identity, class: ClassKey<'_>) -> Result<(), ApiError>;

    /// Add an item of `kind` to a class. Kinds whose identifier is assigned
    /// remotely pass `None` and find it in the returned record.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Remote`] if an item with the same identifier exists.
    fn add_item(
        &self,
        identity: &Identity,
        class: ClassKey<'_>,
        kind: &str,
        identifier: Option<&str>,
        payload: &Record,
    ) -> Result<Record, ApiError>;

    /// Replace the fields of an existing item.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if the item does not exist.
    fn update_item(
        &self,
        identity: &Identity,
        class: ClassKey<'_>,
        kind: &str,
        identifier: &str,
        payload: &Record,
    ) -> Result<(), ApiError>;

    /// Fetch the record of an item. The identifier field (`q<kind>`) is included.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if the item does not exist.
    fn get_item(
        &self,
        identity: &Identity,
        class: ClassKey<'_>,
        kind: &str,
        identifier: &str,
    ) -> Result<Record, ApiError>;

    /// Whether an item exists in the class.
    ///
    /// # Errors
    ///
    /// Returns an error when the server fails for a reason other than the
    /// item being absent, including [`ApiError::NotFound`] for a missing class.
    fn check_item(
        &self,
        identity: &Identity,
        class: ClassKey<'_>,
        kind: &str,
        identifier: &str,
    ) -> Result<bool, ApiError>;

    /// Delete an item from the class.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if the item does not exist.
    fn delete_item(
        &self,
        identity: &Identity,
        class: ClassKey<'_>,
        kind: &str,
        identifier: &str,
    ) -> Result<(), ApiError>;

    /// Fetch every item of `kind` in the class, in server order.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if the class does not exist.
    fn list_items(
        &self,
        identity: &Identity,
        class: ClassKey<'_>,
        kind: &str,
    ) -> Result<Vec<Record>, ApiError>;
}
