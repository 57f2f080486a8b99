//! Member records of a class.
//!
//! [`ClassItem`] is the object-safe face of an item, used when a class handles
//! members generically. [`ItemType`] adds what only a concrete type can do:
//! build itself from a remote record.

use std::any::{Any, TypeId};
use std::fmt;
use wims_api::Record;

use crate::error::ModelError;

/// Non-owning link from an item to the class it was added to or fetched from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Membership {
    pub endpoint: String,
    pub qclass: u32,
    pub rclass: String,
}

/// A record that can be a member of a class.
pub trait ClassItem: fmt::Debug + Any {
    /// Kind tag used by the server (`user`, `sheet`, ...).
    fn kind(&self) -> &'static str;

    /// Current identifier, `None` while the server has not assigned one.
    fn identifier(&self) -> Option<String>;

    /// Fields sent when the item is added or modified.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::Decode` if the fields cannot be rendered as a record.
    fn to_payload(&self) -> Result<Record, ModelError>;

    /// Called with the server's answer once the item has been added.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::Decode` if the answer lacks what the item expects.
    fn on_added(&mut self, _answer: &Record) -> Result<(), ModelError> {
        Ok(())
    }

    fn membership(&self) -> Option<&Membership>;

    fn set_membership(&mut self, membership: Option<Membership>);

    fn is_member(&self) -> bool {
        self.membership().is_some()
    }

    fn as_any(&self) -> &dyn Any;

    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// A concrete item type.
pub trait ItemType: ClassItem + Sized {
    const KIND: &'static str;

    /// Build an item from its identifier and remote record.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::Decode` if the record does not describe this type.
    fn from_record(identifier: &str, record: Record) -> Result<Self, ModelError>;
}

/// Identifies a Rust type for registry lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    #[must_use]
    pub fn of<T: Any>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    #[must_use]
    pub fn of_item(item: &dyn ClassItem) -> Self {
        Self {
            id: item.as_any().type_id(),
            name: item.type_name(),
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

/// How an item is designated in `checkitem`/`delitem`.
#[derive(Debug, Clone, Copy)]
pub enum ItemRef<'a> {
    /// A bare identifier, optionally with the type it belongs to.
    Id {
        identifier: &'a str,
        item_type: Option<TypeKey>,
    },
    /// An item instance; its type and current identifier are used.
    Item(&'a dyn ClassItem),
}

impl<'a> ItemRef<'a> {
    /// An identifier of an item of type `T`.
    #[must_use]
    pub fn typed<T: Any>(identifier: &'a str) -> Self {
        Self::Id {
            identifier,
            item_type: Some(TypeKey::of::<T>()),
        }
    }
}

impl<'a> From<&'a str> for ItemRef<'a> {
    fn from(identifier: &'a str) -> Self {
        Self::Id {
            identifier,
            item_type: None,
        }
    }
}

impl<'a> From<&'a dyn ClassItem> for ItemRef<'a> {
    fn from(item: &'a dyn ClassItem) -> Self {
        Self::Item(item)
    }
}

impl<'a, T: ClassItem> From<&'a T> for ItemRef<'a> {
    fn from(item: &'a T) -> Self {
        Self::Item(item)
    }
}
