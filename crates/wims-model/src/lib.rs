//! # wims-model
//!
//! Local objects mirroring records of a WIMS server.
//!
//! A [`Class`] goes through the lifecycle described in [`entity`]: built
//! locally, bound by `save` or `get`, and finally deleted. Once bound it
//! manages its members (users, sheets, or any registered [`ItemType`])
//! through [`RemoteApi`](wims_api::RemoteApi) calls, dispatching records to
//! local types with an [`ItemTypeRegistry`].
//!
//! Every precondition (binding, item type, field validity) is checked before
//! a request is sent; remote refusals are returned unchanged as
//! [`ModelError::Remote`].

mod class;
pub mod entity;
pub mod error;
pub mod item;
pub mod record;
pub mod registry;
mod sheet;
mod user;

pub use class::{Class, ClassBuilder};
pub use entity::Lifecycle;
pub use error::ModelError;
pub use item::{ClassItem, ItemRef, ItemType, Membership, TypeKey};
pub use registry::{ItemKind, ItemTypeRegistry};
pub use sheet::Sheet;
pub use user::User;
pub use wims_core::one_year_later;
