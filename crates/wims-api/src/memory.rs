//! In-process WIMS server.
//!
//! Keeps classes and their items in memory and answers [`RemoteApi`] calls the
//! way a real server does: absent records are [`ApiError::NotFound`], duplicate
//! creations are refused with [`ApiError::Remote`]. Handles are cheap to clone
//! and share the same state, so several local objects can observe one record.

use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockWriteGuard};
use wims_core::Identity;

use crate::error::{ApiError, Missing};
use crate::protocol::{created_id_field, identifier_field, item_job, list_source};
use crate::{ClassKey, Record, RemoteApi};

/// First identifier handed out when a class is created without one.
const FIRST_QCLASS: u32 = 9001;

#[derive(Debug, Clone, Default)]
pub struct MemoryApi {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    state: RwLock<ServerState>,
    requests: AtomicUsize,
}

#[derive(Debug, Default)]
struct ServerState {
    /// Accepted `(ident, passwd)` pairs. Empty accepts everyone.
    accounts: Vec<(String, String)>,
    /// Keyed by endpoint then `qclass`.
    classes: BTreeMap<(String, u32), StoredClass>,
}

#[derive(Debug)]
struct StoredClass {
    rclass: String,
    fields: Record,
    /// Items per kind, in insertion order.
    items: BTreeMap<String, Vec<(String, Record)>>,
    next_item_id: BTreeMap<String, u32>,
}

impl StoredClass {
    fn items(&self, kind: &str) -> &[(String, Record)] {
        self.items.get(kind).map_or(&[], Vec::as_slice)
    }

    fn position(&self, kind: &str, identifier: &str) -> Option<usize> {
        self.items(kind).iter().position(|(id, _)| id == identifier)
    }
}

impl MemoryApi {
    /// A server accepting any credentials.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict access to the given credentials (may be called repeatedly).
    #[must_use]
    pub fn with_account(self, ident: &str, passwd: &str) -> Self {
        self.state()
            .accounts
            .push((ident.to_string(), passwd.to_string()));
        self
    }

    /// Number of remote operations answered so far, refused ones included.
    #[must_use]
    pub fn requests(&self) -> usize {
        self.inner.requests.load(Ordering::SeqCst)
    }

    fn state(&self) -> RwLockWriteGuard<'_, ServerState> {
        self.inner
            .state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Count the request and check credentials.
    fn open(
        &self,
        identity: &Identity,
        job: &str,
    ) -> Result<RwLockWriteGuard<'_, ServerState>, ApiError> {
        self.inner.requests.fetch_add(1, Ordering::SeqCst);
        let state = self.state();
        let accepted = state.accounts.is_empty()
            || state
                .accounts
                .iter()
                .any(|(ident, passwd)| ident == identity.ident() && passwd == identity.passwd());
        if !accepted {
            return Err(ApiError::remote(
                job,
                format!("bad identification for {}", identity.ident()),
            ));
        }
        Ok(state)
    }
}

fn class_mut<'s>(
    state: &'s mut ServerState,
    identity: &Identity,
    class: ClassKey<'_>,
    job: &str,
) -> Result<&'s mut StoredClass, ApiError> {
    state
        .classes
        .get_mut(&(identity.url().to_string(), class.qclass))
        .filter(|stored| stored.rclass == class.rclass)
        .ok_or_else(|| {
            ApiError::not_found(
                job,
                Missing::Class,
                format!("class {} not existing", class.qclass),
            )
        })
}

fn item_not_found(job: &str, kind: &str, identifier: &str, qclass: u32) -> ApiError {
    ApiError::not_found(
        job,
        Missing::Item,
        format!("{kind} {identifier} not in this class ({qclass})"),
    )
}

fn with_identifier(kind: &str, identifier: &str, payload: &Record) -> Record {
    let mut record = payload.clone();
    record.insert(
        identifier_field(kind),
        Value::String(identifier.to_string()),
    );
    record
}

impl RemoteApi for MemoryApi {
    fn create_class(
        &self,
        identity: &Identity,
        rclass: &str,
        qclass: Option<u32>,
        class: &Record,
        supervisor: &Record,
    ) -> Result<u32, ApiError> {
        let job = "addclass";
        let mut state = self.open(identity, job)?;
        let endpoint = identity.url().to_string();

        let qclass = match qclass {
            Some(qclass) if state.classes.contains_key(&(endpoint.clone(), qclass)) => {
                return Err(ApiError::remote(job, format!("class {qclass} already exists")));
            }
            Some(qclass) => qclass,
            None => (FIRST_QCLASS..=u32::MAX)
                .find(|candidate| !state.classes.contains_key(&(endpoint.clone(), *candidate)))
                .ok_or_else(|| ApiError::remote(job, "no class identifier left"))?,
        };

        let mut items = BTreeMap::new();
        items.insert(
            "user".to_string(),
            vec![(
                "supervisor".to_string(),
                with_identifier("user", "supervisor", supervisor),
            )],
        );
        state.classes.insert(
            (endpoint, qclass),
            StoredClass {
                rclass: rclass.to_string(),
                fields: class.clone(),
                items,
                next_item_id: BTreeMap::new(),
            },
        );
        Ok(qclass)
    }

    fn update_class(
        &self,
        identity: &Identity,
        class: ClassKey<'_>,
        fields: &Record,
    ) -> Result<(), ApiError> {
        let job = "modclass";
        let mut state = self.open(identity, job)?;
        let stored = class_mut(&mut state, identity, class, job)?;
        stored.fields = fields.clone();
        Ok(())
    }

    fn get_class(&self, identity: &Identity, class: ClassKey<'_>) -> Result<Record, ApiError> {
        let job = "getclass";
        let mut state = self.open(identity, job)?;
        let stored = class_mut(&mut state, identity, class, job)?;
        let mut record = stored.fields.clone();
        record.insert("qclass".into(), Value::from(class.qclass));
        record.insert("rclass".into(), Value::String(stored.rclass.clone()));
        Ok(record)
    }

    fn list_classes(&self, identity: &Identity, rclass: &str) -> Result<Vec<Record>, ApiError> {
        let job = "listclasses";
        let state = self.open(identity, job)?;
        let records: Vec<Record> = state
            .classes
            .iter()
            .filter(|((endpoint, _), stored)| endpoint == identity.url() && stored.rclass == rclass)
            .map(|((_, qclass), stored)| {
                let mut record = stored.fields.clone();
                record.insert("qclass".into(), Value::from(*qclass));
                record.insert("rclass".into(), Value::String(stored.rclass.clone()));
                record
            })
            .collect();
        if records.is_empty() {
            return Err(ApiError::not_found(
                job,
                Missing::Route,
                format!("no such rclass {rclass}"),
            ));
        }
        Ok(records)
    }

    fn delete_class(&self, identity: &Identity, class: ClassKey<'_>) -> Result<(), ApiError> {
        let job = "delclass";
        let mut state = self.open(identity, job)?;
        class_mut(&mut state, identity, class, job)?;
        state
            .classes
            .remove(&(identity.url().to_string(), class.qclass));
        Ok(())
    }

    fn add_item(
        &self,
        identity: &Identity,
        class: ClassKey<'_>,
        kind: &str,
        identifier: Option<&str>,
        payload: &Record,
    ) -> Result<Record, ApiError> {
        let job = item_job("add", kind);
        let mut state = self.open(identity, &job)?;
        let stored = class_mut(&mut state, identity, class, &job)?;

        let mut answer = Record::new();
        let identifier = if let Some(identifier) = identifier {
            if stored.position(kind, identifier).is_some() {
                return Err(ApiError::remote(
                    job,
                    format!("{kind} {identifier} already exists"),
                ));
            }
            identifier.to_string()
        } else {
            let next = stored.next_item_id.entry(kind.to_string()).or_insert(1);
            let assigned = *next;
            *next += 1;
            answer.insert(created_id_field(kind), Value::from(assigned));
            assigned.to_string()
        };

        let record = with_identifier(kind, &identifier, payload);
        stored
            .items
            .entry(kind.to_string())
            .or_default()
            .push((identifier, record));
        Ok(answer)
    }

    fn update_item(
        &self,
        identity: &Identity,
        class: ClassKey<'_>,
        kind: &str,
        identifier: &str,
        payload: &Record,
    ) -> Result<(), ApiError> {
        let job = item_job("mod", kind);
        let mut state = self.open(identity, &job)?;
        let stored = class_mut(&mut state, identity, class, &job)?;
        let index = stored
            .position(kind, identifier)
            .ok_or_else(|| item_not_found(&job, kind, identifier, class.qclass))?;
        if let Some(items) = stored.items.get_mut(kind) {
            items[index].1 = with_identifier(kind, identifier, payload);
        }
        Ok(())
    }

    fn get_item(
        &self,
        identity: &Identity,
        class: ClassKey<'_>,
        kind: &str,
        identifier: &str,
    ) -> Result<Record, ApiError> {
        let job = item_job("get", kind);
        let mut state = self.open(identity, &job)?;
        let stored = class_mut(&mut state, identity, class, &job)?;
        stored
            .items(kind)
            .iter()
            .find(|(id, _)| id == identifier)
            .map(|(_, record)| record.clone())
            .ok_or_else(|| item_not_found(&job, kind, identifier, class.qclass))
    }

    fn check_item(
        &self,
        identity: &Identity,
        class: ClassKey<'_>,
        kind: &str,
        identifier: &str,
    ) -> Result<bool, ApiError> {
        let job = item_job("check", kind);
        let mut state = self.open(identity, &job)?;
        let stored = class_mut(&mut state, identity, class, &job)?;
        Ok(stored.position(kind, identifier).is_some())
    }

    fn delete_item(
        &self,
        identity: &Identity,
        class: ClassKey<'_>,
        kind: &str,
        identifier: &str,
    ) -> Result<(), ApiError> {
        let job = item_job("del", kind);
        let mut state = self.open(identity, &job)?;
        let stored = class_mut(&mut state, identity, class, &job)?;
        let index = stored
            .position(kind, identifier)
            .ok_or_else(|| item_not_found(&job, kind, identifier, class.qclass))?;
        if let Some(items) = stored.items.get_mut(kind) {
            items.remove(index);
        }
        Ok(())
    }

    fn list_items(
        &self,
        identity: &Identity,
        class: ClassKey<'_>,
        kind: &str,
    ) -> Result<Vec<Record>, ApiError> {
        let job = list_source(kind).job;
        let mut state = self.open(identity, &job)?;
        let stored = class_mut(&mut state, identity, class, &job)?;
        Ok(stored
            .items(kind)
            .iter()
            .map(|(_, record)| record.clone())
            .collect())
    }
}
