//! WIMS classes and the operations on their members.
//!
//! A [`Class`] is built locally with [`Class::builder`], then bound to a
//! remote record by [`Class::save`], or fetched already bound with
//! [`Class::get`] / [`Class::list`]. Every operation receives the
//! [`RemoteApi`] to talk to; the class only keeps the identity it was bound
//! with.

use serde::{Deserialize, Serialize};
use std::any::Any;
use std::sync::Arc;
use wims_api::protocol::{identifier_field, value_to_u32};
use wims_api::{ClassKey, Missing, Record, RemoteApi};
use wims_config::ClassDefaults;
use wims_core::{Clock, Expiration, Identity, Lang, Level, SystemClock};

use crate::entity::{Binding, EntityState, Lifecycle};
use crate::error::ModelError;
use crate::item::{ClassItem, ItemRef, ItemType, Membership, TypeKey};
use crate::record;
use crate::registry::ItemTypeRegistry;
use crate::user::User;

fn default_expiration() -> Expiration {
    Expiration::default_from(&SystemClock)
}

fn default_limit() -> u32 {
    ClassDefaults::default().limit
}

fn default_secure() -> String {
    ClassDefaults::default().secure
}

/// Descriptive fields, named as the server names them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ClassRecord {
    #[serde(rename = "description")]
    name: String,
    #[serde(default)]
    institution: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
    #[serde(default)]
    lang: Lang,
    #[serde(default = "default_expiration")]
    expiration: Expiration,
    #[serde(
        default = "default_limit",
        deserialize_with = "record::number_from_text"
    )]
    limit: u32,
    #[serde(default)]
    level: Level,
    #[serde(default = "default_secure")]
    secure: String,
    #[serde(default)]
    bgcolor: String,
    #[serde(default)]
    refcolor: String,
    #[serde(default)]
    css: String,
}

/// A class on a WIMS server.
///
/// Descriptive fields are public and can be edited freely; edits reach the
/// server on the next [`Class::save`]. The route (`rclass`) and, once bound,
/// the identity and `qclass` never change.
#[derive(Debug, Clone)]
pub struct Class {
    rclass: String,
    /// Class name, sent as `description`.
    pub name: String,
    pub institution: String,
    /// Contact address of the supervisor.
    pub email: String,
    /// Password participants need to register.
    pub password: String,
    /// Supervisor account sent when the class is created. Classes fetched
    /// from the server have none.
    pub supervisor: Option<User>,
    pub lang: Lang,
    pub expiration: Expiration,
    /// Maximum number of participants.
    pub limit: u32,
    pub level: Level,
    /// Hosts allowed to reach the supervisor pages.
    pub secure: String,
    pub bgcolor: String,
    pub refcolor: String,
    pub css: String,
    requested_qclass: Option<u32>,
    state: EntityState<Binding>,
    registry: Arc<ItemTypeRegistry>,
}

impl Class {
    /// Start building a class with its required fields.
    pub fn builder(
        rclass: impl Into<String>,
        name: impl Into<String>,
        institution: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
        supervisor: User,
    ) -> ClassBuilder {
        ClassBuilder {
            rclass: rclass.into(),
            name: name.into(),
            institution: institution.into(),
            email: email.into(),
            password: password.into(),
            supervisor,
            qclass: None,
            lang: None,
            level: None,
            expiration: None,
            limit: None,
            secure: None,
            bgcolor: String::new(),
            refcolor: String::new(),
            css: String::new(),
            defaults: ClassDefaults::default(),
            registry: None,
        }
    }

    fn assemble(
        rclass: String,
        fields: ClassRecord,
        supervisor: Option<User>,
        requested_qclass: Option<u32>,
        state: EntityState<Binding>,
        registry: Arc<ItemTypeRegistry>,
    ) -> Self {
        Self {
            rclass,
            name: fields.name,
            institution: fields.institution,
            email: fields.email,
            password: fields.password,
            supervisor,
            lang: fields.lang,
            expiration: fields.expiration,
            limit: fields.limit,
            level: fields.level,
            secure: fields.secure,
            bgcolor: fields.bgcolor,
            refcolor: fields.refcolor,
            css: fields.css,
            requested_qclass,
            state,
            registry,
        }
    }

    fn from_remote(
        identity: Identity,
        qclass: u32,
        rclass: &str,
        remote: Record,
    ) -> Result<Self, ModelError> {
        let fields = record::decode("class", remote)?;
        Ok(Self::assemble(
            rclass.to_string(),
            fields,
            None,
            Some(qclass),
            EntityState::Bound(Binding { identity, qclass }),
            ItemTypeRegistry::shared(),
        ))
    }

    fn fields(&self) -> ClassRecord {
        ClassRecord {
            name: self.name.clone(),
            institution: self.institution.clone(),
            email: self.email.clone(),
            password: self.password.clone(),
            lang: self.lang,
            expiration: self.expiration,
            limit: self.limit,
            level: self.level,
            secure: self.secure.clone(),
            bgcolor: self.bgcolor.clone(),
            refcolor: self.refcolor.clone(),
            css: self.css.clone(),
        }
    }

    fn apply(&mut self, fields: ClassRecord) {
        self.name = fields.name;
        self.institution = fields.institution;
        self.email = fields.email;
        self.password = fields.password;
        self.lang = fields.lang;
        self.expiration = fields.expiration;
        self.limit = fields.limit;
        self.level = fields.level;
        self.secure = fields.secure;
        self.bgcolor = fields.bgcolor;
        self.refcolor = fields.refcolor;
        self.css = fields.css;
    }

    fn payload(&self) -> Result<Record, ModelError> {
        record::encode("class", &self.fields())
    }

    // -- lifecycle ----------------------------------------------------------

    /// Fetch an existing class.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::Remote` if the class does not exist or the server
    /// refuses, `ModelError::Decode` if its record cannot be read.
    pub fn get(
        api: &dyn RemoteApi,
        identity: Identity,
        qclass: u32,
        rclass: &str,
    ) -> Result<Self, ModelError> {
        let remote = api.get_class(&identity, ClassKey::new(qclass, rclass))?;
        Self::from_remote(identity, qclass, rclass, remote)
    }

    /// Every class created under `rclass`, in server order. A route with no
    /// class gives an empty list.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::Remote` if the server refuses for another reason
    /// than the route being unknown.
    pub fn list(
        api: &dyn RemoteApi,
        identity: &Identity,
        rclass: &str,
    ) -> Result<Vec<Self>, ModelError> {
        let records = match api.list_classes(identity, rclass) {
            Ok(records) => records,
            Err(e) if e.missing() == Some(Missing::Route) => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        records
            .into_iter()
            .map(|remote| {
                let qclass = remote
                    .get("qclass")
                    .and_then(value_to_u32)
                    .ok_or_else(|| ModelError::Decode("listed class without qclass".into()))?;
                Self::from_remote(identity.clone(), qclass, rclass, remote)
            })
            .collect()
    }

    /// Push the class to the server.
    ///
    /// A bound class is updated with its stored identity and `identity` is
    /// ignored. A class that was never saved is created with `identity`, which
    /// is then mandatory, and becomes bound.
    ///
    /// # Errors
    ///
    /// - `ModelError::NotBound` if the class was never saved and no identity
    ///   is given, or if it was deleted
    /// - `ModelError::Remote` if the server refuses (the class is left as it was)
    pub fn save(
        &mut self,
        api: &dyn RemoteApi,
        identity: impl Into<Option<Identity>>,
    ) -> Result<(), ModelError> {
        if matches!(self.state, EntityState::Unbound) {
            return self.create(api, identity.into());
        }

        let binding = self.state.bound("save")?;
        let payload = self.payload()?;
        api.update_class(
            &binding.identity,
            ClassKey::new(binding.qclass, &self.rclass),
            &payload,
        )?;
        tracing::info!(qclass = binding.qclass, rclass = %self.rclass, "class updated");
        Ok(())
    }

    fn create(&mut self, api: &dyn RemoteApi, identity: Option<Identity>) -> Result<(), ModelError> {
        let identity = identity.ok_or_else(|| {
            ModelError::NotBound(
                "save needs an identity for a class that has never been saved".into(),
            )
        })?;
        let payload = self.payload()?;
        let supervisor = match &self.supervisor {
            Some(user) => user.to_payload()?,
            None => Record::new(),
        };

        let qclass = api.create_class(
            &identity,
            &self.rclass,
            self.requested_qclass,
            &payload,
            &supervisor,
        )?;
        tracing::info!(qclass, rclass = %self.rclass, endpoint = identity.url(), "class created");
        self.state.bind(Binding { identity, qclass });
        Ok(())
    }

    /// Overwrite the descriptive fields with the server's, local edits included.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::NotBound` if the class is not bound,
    /// `ModelError::Remote` if the server refuses.
    pub fn refresh(&mut self, api: &dyn RemoteApi) -> Result<(), ModelError> {
        let binding = self.state.bound("refresh")?;
        let remote = api.get_class(
            &binding.identity,
            ClassKey::new(binding.qclass, &self.rclass),
        )?;
        // Fields the server does not send back keep their local value.
        let mut merged = self.payload()?;
        merged.extend(remote);
        let fields = record::decode("class", merged)?;
        self.apply(fields);
        Ok(())
    }

    /// Delete the class on the server. The object cannot be used afterwards.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::NotBound` if the class is not bound,
    /// `ModelError::Remote` if the server refuses.
    pub fn delete(&mut self, api: &dyn RemoteApi) -> Result<(), ModelError> {
        let binding = self.state.bound("delete")?;
        api.delete_class(
            &binding.identity,
            ClassKey::new(binding.qclass, &self.rclass),
        )?;
        tracing::info!(qclass = binding.qclass, rclass = %self.rclass, "class deleted");
        self.state.release();
        Ok(())
    }

    // -- accessors ----------------------------------------------------------

    #[must_use]
    pub fn rclass(&self) -> &str {
        &self.rclass
    }

    #[must_use]
    pub const fn lifecycle(&self) -> Lifecycle {
        self.state.lifecycle()
    }

    /// # Errors
    ///
    /// Returns `ModelError::NotBound` if the class is not bound.
    pub fn identity(&self) -> Result<&Identity, ModelError> {
        Ok(&self.state.bound("identity")?.identity)
    }

    /// # Errors
    ///
    /// Returns `ModelError::NotBound` if the class is not bound.
    pub fn url(&self) -> Result<&str, ModelError> {
        Ok(self.state.bound("url")?.identity.url())
    }

    /// # Errors
    ///
    /// Returns `ModelError::NotBound` if the class is not bound.
    pub fn ident(&self) -> Result<&str, ModelError> {
        Ok(self.state.bound("ident")?.identity.ident())
    }

    /// # Errors
    ///
    /// Returns `ModelError::NotBound` if the class is not bound.
    pub fn passwd(&self) -> Result<&str, ModelError> {
        Ok(self.state.bound("passwd")?.identity.passwd())
    }

    /// # Errors
    ///
    /// Returns `ModelError::NotBound` if the class is not bound.
    pub fn qclass(&self) -> Result<u32, ModelError> {
        Ok(self.state.bound("qclass")?.qclass)
    }

    /// Everything the server holds about the class.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::NotBound` if the class is not bound,
    /// `ModelError::Remote` if the server refuses.
    pub fn infos(&self, api: &dyn RemoteApi) -> Result<Record, ModelError> {
        let binding = self.state.bound("infos")?;
        Ok(api.get_class(
            &binding.identity,
            ClassKey::new(binding.qclass, &self.rclass),
        )?)
    }

    #[must_use]
    pub fn registry(&self) -> &ItemTypeRegistry {
        &self.registry
    }

    /// Replace the item types this class accepts.
    pub fn set_registry(&mut self, registry: Arc<ItemTypeRegistry>) {
        self.registry = registry;
    }

    /// Compare with any value.
    ///
    /// Two classes are equal when they address the same remote record and
    /// hold the same descriptive fields. Anything that is not a `Class` is
    /// simply not equal, whatever the state of `self`.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::NotBound` if either class is not bound.
    pub fn try_eq(&self, other: &dyn Any) -> Result<bool, ModelError> {
        let Some(other) = other.downcast_ref::<Self>() else {
            return Ok(false);
        };
        let binding = self.state.bound("comparison")?;
        let other_binding = other.state.bound("comparison")?;
        Ok(binding.identity.url() == other_binding.identity.url()
            && binding.qclass == other_binding.qclass
            && self.rclass == other.rclass
            && self.fields() == other.fields())
    }

    // -- items --------------------------------------------------------------

    fn scope(&self, operation: &str) -> Result<(&Identity, ClassKey<'_>), ModelError> {
        let binding = self.state.bound(operation)?;
        Ok((
            &binding.identity,
            ClassKey::new(binding.qclass, &self.rclass),
        ))
    }

    fn membership(identity: &Identity, class: ClassKey<'_>) -> Membership {
        Membership {
            endpoint: identity.url().to_string(),
            qclass: class.qclass,
            rclass: class.rclass.to_string(),
        }
    }

    fn resolve(&self, item: ItemRef<'_>) -> Result<(&'static str, Option<String>), ModelError> {
        match item {
            ItemRef::Id {
                identifier,
                item_type: Some(key),
            } => Ok((
                self.registry.resolve_type(key)?.tag(),
                Some(identifier.to_string()),
            )),
            ItemRef::Id {
                identifier,
                item_type: None,
            } => Err(ModelError::InvalidItemType(format!(
                "no item type given for identifier {identifier:?}"
            ))),
            ItemRef::Item(item) => Ok((self.registry.resolve_item(item)?.tag(), item.identifier())),
        }
    }

    fn exists(
        api: &dyn RemoteApi,
        identity: &Identity,
        class: ClassKey<'_>,
        kind: &str,
        identifier: &str,
    ) -> Result<bool, ModelError> {
        match api.check_item(identity, class, kind, identifier) {
            Ok(found) => Ok(found),
            Err(e) if e.missing() == Some(Missing::Item) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Add `item` to the class. On success the item records its membership
    /// and any identifier the server assigned.
    ///
    /// # Errors
    ///
    /// - `ModelError::InvalidItemType` if the item's type is not registered
    /// - `ModelError::NotBound` if the class is not bound
    /// - `ModelError::Remote` if the server refuses (e.g. duplicate identifier)
    /// - `ModelError::Decode` if the server accepted the item but its answer
    ///   cannot be read back (e.g. no assigned identifier). The item then
    ///   exists remotely while the local object records no membership.
    pub fn additem(&self, api: &dyn RemoteApi, item: &mut dyn ClassItem) -> Result<(), ModelError> {
        let kind = self.registry.resolve_item(&*item)?.tag();
        let (identity, class) = self.scope("additem")?;
        let payload = item.to_payload()?;
        let identifier = item.identifier();

        let answer = api.add_item(identity, class, kind, identifier.as_deref(), &payload)?;
        item.on_added(&answer)?;
        item.set_membership(Some(Self::membership(identity, class)));
        tracing::info!(
            kind,
            qclass = class.qclass,
            identifier = %item.identifier().unwrap_or_default(),
            "item added"
        );
        Ok(())
    }

    /// Fetch the item `identifier` of type `T`.
    ///
    /// # Errors
    ///
    /// - `ModelError::InvalidItemType` if `T` is not registered
    /// - `ModelError::NotBound` if the class is not bound
    /// - `ModelError::Remote` if the item does not exist
    pub fn getitem<T: ItemType>(
        &self,
        api: &dyn RemoteApi,
        identifier: &str,
    ) -> Result<T, ModelError> {
        let kind = self.registry.resolve_type(TypeKey::of::<T>())?.tag();
        let (identity, class) = self.scope("getitem")?;
        let remote = api.get_item(identity, class, kind, identifier)?;
        let mut item = T::from_record(identifier, remote)?;
        item.set_membership(Some(Self::membership(identity, class)));
        Ok(item)
    }

    /// Like [`Class::getitem`], with the type chosen at runtime by kind tag.
    ///
    /// # Errors
    ///
    /// Same as [`Class::getitem`].
    pub fn getitem_kind(
        &self,
        api: &dyn RemoteApi,
        identifier: &str,
        kind: &str,
    ) -> Result<Box<dyn ClassItem>, ModelError> {
        let item_kind = *self.registry.resolve_tag(kind)?;
        let (identity, class) = self.scope("getitem")?;
        let remote = api.get_item(identity, class, item_kind.tag(), identifier)?;
        let mut item = item_kind.build(identifier, remote)?;
        item.set_membership(Some(Self::membership(identity, class)));
        Ok(item)
    }

    /// Whether an item exists in the class.
    ///
    /// `item` is either an instance (its type and current identifier are used)
    /// or an identifier with its type, see [`ItemRef::typed`]. An instance
    /// that has no identifier yet is not in the class.
    ///
    /// # Errors
    ///
    /// - `ModelError::InvalidItemType` if no registered type is designated
    /// - `ModelError::NotBound` if the class is not bound
    /// - `ModelError::Remote` if the server fails for another reason than the
    ///   item being absent, the class itself missing included
    pub fn checkitem<'a>(
        &self,
        api: &dyn RemoteApi,
        item: impl Into<ItemRef<'a>>,
    ) -> Result<bool, ModelError> {
        let (kind, identifier) = self.resolve(item.into())?;
        let (identity, class) = self.scope("checkitem")?;
        let Some(identifier) = identifier else {
            return Ok(false);
        };
        Self::exists(api, identity, class, kind, &identifier)
    }

    /// Whether `item` is in the class.
    ///
    /// # Errors
    ///
    /// Same as [`Class::checkitem`].
    pub fn contains(&self, api: &dyn RemoteApi, item: &dyn ClassItem) -> Result<bool, ModelError> {
        self.checkitem(api, ItemRef::Item(item))
    }

    /// Delete an item, designated as for [`Class::checkitem`].
    ///
    /// # Errors
    ///
    /// - `ModelError::InvalidItemType` if no registered type is designated
    /// - `ModelError::NotBound` if the class is not bound
    /// - `ModelError::Unidentified` if the instance has no identifier yet
    /// - `ModelError::Remote` if the item does not exist
    pub fn delitem<'a>(
        &self,
        api: &dyn RemoteApi,
        item: impl Into<ItemRef<'a>>,
    ) -> Result<(), ModelError> {
        let (kind, identifier) = self.resolve(item.into())?;
        let (identity, class) = self.scope("delitem")?;
        let identifier = identifier.ok_or_else(|| ModelError::Unidentified {
            kind: kind.to_string(),
        })?;
        api.delete_item(identity, class, kind, &identifier)?;
        tracing::info!(kind, qclass = class.qclass, identifier = %identifier, "item removed");
        Ok(())
    }

    /// Delete `item` from the class and clear its membership.
    ///
    /// # Errors
    ///
    /// Same as [`Class::delitem`].
    pub fn removeitem(&self, api: &dyn RemoteApi, item: &mut dyn ClassItem) -> Result<(), ModelError> {
        self.delitem(api, ItemRef::Item(&*item))?;
        item.set_membership(None);
        Ok(())
    }

    /// Every item of type `T` in the class, in server order.
    ///
    /// # Errors
    ///
    /// - `ModelError::InvalidItemType` if `T` is not registered
    /// - `ModelError::NotBound` if the class is not bound
    /// - `ModelError::Remote` if the server refuses, or the class no longer exists
    pub fn listitem<T: ItemType>(&self, api: &dyn RemoteApi) -> Result<Vec<T>, ModelError> {
        let kind = self.registry.resolve_type(TypeKey::of::<T>())?.tag();
        let (identity, class) = self.scope("listitem")?;
        let records = match api.list_items(identity, class, kind) {
            Ok(records) => records,
            Err(e) if e.missing() == Some(Missing::Item) => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let id_field = identifier_field(kind);
        records
            .into_iter()
            .map(|remote| {
                let identifier = record::text(&remote, &id_field).ok_or_else(|| {
                    ModelError::Decode(format!("listed {kind} without {id_field}"))
                })?;
                let mut item = T::from_record(&identifier, remote)?;
                item.set_membership(Some(Self::membership(identity, class)));
                Ok(item)
            })
            .collect()
    }

    /// Add `item`, or modify it if it already exists in the class.
    ///
    /// # Errors
    ///
    /// Same as [`Class::additem`].
    pub fn saveitem(&self, api: &dyn RemoteApi, item: &mut dyn ClassItem) -> Result<(), ModelError> {
        let kind = self.registry.resolve_item(&*item)?.tag();
        let (identity, class) = self.scope("saveitem")?;

        if let Some(identifier) = item.identifier() {
            if Self::exists(api, identity, class, kind, &identifier)? {
                let payload = item.to_payload()?;
                api.update_item(identity, class, kind, &identifier, &payload)?;
                item.set_membership(Some(Self::membership(identity, class)));
                tracing::info!(kind, qclass = class.qclass, identifier = %identifier, "item modified");
                return Ok(());
            }
        }
        self.additem(api, item)
    }

    /// Re-read a member of this class from the server.
    ///
    /// # Errors
    ///
    /// - `ModelError::InvalidItemType` if `T` is not registered
    /// - `ModelError::NotBound` if the class is not bound or `item` is not
    ///   one of its members
    /// - `ModelError::Remote` if the item no longer exists
    pub fn refreshitem<T: ItemType>(
        &self,
        api: &dyn RemoteApi,
        item: &mut T,
    ) -> Result<(), ModelError> {
        let kind = self.registry.resolve_type(TypeKey::of::<T>())?.tag();
        let (identity, class) = self.scope("refreshitem")?;
        if item.membership() != Some(&Self::membership(identity, class)) {
            return Err(ModelError::NotBound(format!(
                "refreshitem: {kind} is not a member of class {}",
                class.qclass
            )));
        }
        let identifier = item.identifier().ok_or_else(|| ModelError::Unidentified {
            kind: kind.to_string(),
        })?;
        *item = self.getitem(api, &identifier)?;
        Ok(())
    }
}

/// Builder for a [`Class`] that has not been saved yet.
///
/// Constrained fields are validated by [`ClassBuilder::build`], so an invalid
/// language, level or expiration never produces a class.
#[derive(Debug, Clone)]
pub struct ClassBuilder {
    rclass: String,
    name: String,
    institution: String,
    email: String,
    password: String,
    supervisor: User,
    qclass: Option<u32>,
    lang: Option<String>,
    level: Option<String>,
    expiration: Option<String>,
    limit: Option<u32>,
    secure: Option<String>,
    bgcolor: String,
    refcolor: String,
    css: String,
    defaults: ClassDefaults,
    registry: Option<Arc<ItemTypeRegistry>>,
}

impl ClassBuilder {
    /// Ask the server for this class identifier instead of letting it choose.
    #[must_use]
    pub fn qclass(mut self, qclass: u32) -> Self {
        self.qclass = Some(qclass);
        self
    }

    #[must_use]
    pub fn lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = Some(lang.into());
        self
    }

    #[must_use]
    pub fn level(mut self, level: impl Into<String>) -> Self {
        self.level = Some(level.into());
        self
    }

    /// Expiration date as `YYYYMMDD`. Defaults to one year from today.
    #[must_use]
    pub fn expiration(mut self, expiration: impl Into<String>) -> Self {
        self.expiration = Some(expiration.into());
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn secure(mut self, secure: impl Into<String>) -> Self {
        self.secure = Some(secure.into());
        self
    }

    #[must_use]
    pub fn bgcolor(mut self, bgcolor: impl Into<String>) -> Self {
        self.bgcolor = bgcolor.into();
        self
    }

    #[must_use]
    pub fn refcolor(mut self, refcolor: impl Into<String>) -> Self {
        self.refcolor = refcolor.into();
        self
    }

    #[must_use]
    pub fn css(mut self, css: impl Into<String>) -> Self {
        self.css = css.into();
        self
    }

    /// Take language, level, limit and secure from configuration when they
    /// are not set explicitly.
    #[must_use]
    pub fn defaults(mut self, defaults: &ClassDefaults) -> Self {
        self.defaults = defaults.clone();
        self
    }

    #[must_use]
    pub fn registry(mut self, registry: Arc<ItemTypeRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Validate the fields and build the class.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::Validation` if the language, level or expiration
    /// is not legal.
    pub fn build(self) -> Result<Class, ModelError> {
        self.build_with(&SystemClock)
    }

    /// Like [`ClassBuilder::build`], with the default expiration taken from `clock`.
    ///
    /// # Errors
    ///
    /// Same as [`ClassBuilder::build`].
    pub fn build_with(self, clock: &impl Clock) -> Result<Class, ModelError> {
        let lang: Lang = self.lang.as_deref().unwrap_or(&self.defaults.lang).parse()?;
        let level: Level = self
            .level
            .as_deref()
            .unwrap_or(&self.defaults.level)
            .parse()?;
        let expiration = match self.expiration.as_deref() {
            Some(text) => text.parse::<Expiration>()?,
            None => Expiration::default_from(clock),
        };

        let fields = ClassRecord {
            name: self.name,
            institution: self.institution,
            email: self.email,
            password: self.password,
            lang,
            expiration,
            limit: self.limit.unwrap_or(self.defaults.limit),
            level,
            secure: self.secure.unwrap_or(self.defaults.secure),
            bgcolor: self.bgcolor,
            refcolor: self.refcolor,
            css: self.css,
        };
        Ok(Class::assemble(
            self.rclass,
            fields,
            Some(self.supervisor),
            self.qclass,
            EntityState::Unbound,
            self.registry.unwrap_or_else(ItemTypeRegistry::shared),
        ))
    }
}
