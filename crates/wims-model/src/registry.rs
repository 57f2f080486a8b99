//! Registry of the item types a class can hold.
//!
//! Each registered type is known by its Rust type and its kind tag. Lookups
//! fail with [`ModelError::InvalidItemType`], never silently.

use std::sync::{Arc, OnceLock};
use wims_api::Record;

use crate::error::ModelError;
use crate::item::{ClassItem, ItemType, TypeKey};
use crate::sheet::Sheet;
use crate::user::User;

type BuildFn = fn(&str, Record) -> Result<Box<dyn ClassItem>, ModelError>;

fn build_boxed<T: ItemType>(
    identifier: &str,
    record: Record,
) -> Result<Box<dyn ClassItem>, ModelError> {
    Ok(Box::new(T::from_record(identifier, record)?))
}

/// A registered item type.
#[derive(Debug, Clone, Copy)]
pub struct ItemKind {
    tag: &'static str,
    type_key: TypeKey,
    build: BuildFn,
}

impl ItemKind {
    fn of<T: ItemType>() -> Self {
        Self {
            tag: T::KIND,
            type_key: TypeKey::of::<T>(),
            build: build_boxed::<T>,
        }
    }

    #[must_use]
    pub const fn tag(&self) -> &'static str {
        self.tag
    }

    #[must_use]
    pub const fn type_key(&self) -> TypeKey {
        self.type_key
    }

    /// Build an item of this kind from a remote record.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::Decode` if the record does not fit the type.
    pub fn build(
        &self,
        identifier: &str,
        record: Record,
    ) -> Result<Box<dyn ClassItem>, ModelError> {
        (self.build)(identifier, record)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ItemTypeRegistry {
    kinds: Vec<ItemKind>,
}

impl ItemTypeRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding [`User`] and [`Sheet`].
    #[must_use]
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register::<User>();
        registry.register::<Sheet>();
        registry
    }

    /// Process-wide instance of [`ItemTypeRegistry::standard`].
    #[must_use]
    pub fn shared() -> Arc<Self> {
        static SHARED: OnceLock<Arc<ItemTypeRegistry>> = OnceLock::new();
        Arc::clone(SHARED.get_or_init(|| Arc::new(Self::standard())))
    }

    /// Register `T`. A previous entry for the same type or tag is replaced
    /// and returned.
    pub fn register<T: ItemType>(&mut self) -> Option<ItemKind> {
        let kind = ItemKind::of::<T>();
        let existing = self
            .kinds
            .iter()
            .position(|k| k.type_key == kind.type_key || k.tag == kind.tag);
        let previous = existing.map(|index| self.kinds.remove(index));
        self.kinds.push(kind);
        previous
    }

    /// Builder form of [`ItemTypeRegistry::register`].
    #[must_use]
    pub fn with<T: ItemType>(mut self) -> Self {
        self.register::<T>();
        self
    }

    /// Look a type up.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::InvalidItemType` if the type is not registered.
    pub fn resolve_type(&self, key: TypeKey) -> Result<&ItemKind, ModelError> {
        self.kinds
            .iter()
            .find(|k| k.type_key == key)
            .ok_or_else(|| {
                ModelError::InvalidItemType(format!("{} is not a registered item type", key.name()))
            })
    }

    /// Look up the type of an item instance.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::InvalidItemType` if the instance's type is not registered.
    pub fn resolve_item(&self, item: &dyn ClassItem) -> Result<&ItemKind, ModelError> {
        self.resolve_type(TypeKey::of_item(item))
    }

    /// Look a kind tag up.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::InvalidItemType` if no registered type uses `tag`.
    pub fn resolve_tag(&self, tag: &str) -> Result<&ItemKind, ModelError> {
        self.kinds
            .iter()
            .find(|k| k.tag == tag)
            .ok_or_else(|| {
                ModelError::InvalidItemType(format!("no item type registered for kind {tag:?}"))
            })
    }

    pub fn tags(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.kinds.iter().map(|k| k.tag)
    }
}
