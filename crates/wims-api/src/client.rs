//! Blocking HTTP client for a WIMS server's adm/raw module.

use serde_json::Value;
use wims_config::ServerConfig;
use wims_core::Identity;

use crate::error::{ApiError, Missing};
use crate::http::check_response;
use crate::protocol::{
    self, created_id_field, encode_data, identifier_field, item_job, list_source, value_to_u32,
};
use crate::{ClassKey, Record, RemoteApi};

/// HTTP client speaking the adm/raw protocol.
///
/// The client holds no credentials: every call receives the identity triple,
/// so one client can serve classes bound to different endpoints.
#[derive(Debug, Clone)]
pub struct WimsClient {
    http: reqwest::blocking::Client,
}

impl WimsClient {
    /// Create a client with the default timeout and user agent.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Http` if the underlying HTTP client cannot be built.
    pub fn new() -> Result<Self, ApiError> {
        Self::from_config(&ServerConfig::default())
    }

    /// Create a client using the timeout and user agent of `config`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Http` if the underlying HTTP client cannot be built.
    pub fn from_config(config: &ServerConfig) -> Result<Self, ApiError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout())
            .build()?;
        Ok(Self { http })
    }

    fn call(
        &self,
        identity: &Identity,
        job: &str,
        params: &[(&str, String)],
    ) -> Result<Record, ApiError> {
        let code = protocol::request_code()?;
        let url = protocol::request_url(identity, job, &code, params);
        tracing::debug!(job, endpoint = identity.url(), "adm/raw request");

        let resp = check_response(self.http.get(&url).send()?)?;
        let body: Value = resp.json()?;
        protocol::interpret(job, &code, body).inspect_err(|e| {
            tracing::warn!(job, endpoint = identity.url(), %e, "adm/raw request refused");
        })
    }

    fn class_params<'p>(class: ClassKey<'_>) -> Vec<(&'p str, String)> {
        vec![
            ("qclass", class.qclass.to_string()),
            ("rclass", class.rclass.to_string()),
        ]
    }

    /// Identifiers of every item of `kind`, as listed by the server.
    fn list_identifiers(
        &self,
        identity: &Identity,
        class: ClassKey<'_>,
        kind: &str,
    ) -> Result<Vec<String>, ApiError> {
        let source = list_source(kind);
        let mut params = Self::class_params(class);
        if let Some(option) = source.option {
            params.push(("option", option.to_string()));
        }
        let answer = self.call(identity, &source.job, &params)?;
        let id_field = identifier_field(kind);

        let entries = match answer.get(&source.field) {
            Some(Value::Array(entries)) => entries.clone(),
            // Some jobs return a whitespace or comma separated string.
            Some(Value::String(joined)) => joined
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|s| !s.is_empty())
                .map(|s| Value::String(s.to_string()))
                .collect(),
            Some(Value::Null) | None => Vec::new(),
            Some(other) => {
                return Err(ApiError::Parse(format!(
                    "{}: unexpected {} value {other}",
                    source.job, source.field
                )));
            }
        };

        entries
            .iter()
            .map(|entry| match entry {
                Value::Object(fields) => fields
                    .get("id")
                    .or_else(|| fields.get(&id_field))
                    .map(protocol::value_to_text)
                    .ok_or_else(|| {
                        ApiError::Parse(format!("{}: list entry without identifier", source.job))
                    }),
                other => Ok(protocol::value_to_text(other)),
            })
            .collect()
    }
}

impl RemoteApi for WimsClient {
    fn create_class(
        &self,
        identity: &Identity,
        rclass: &str,
        qclass: Option<u32>,
        class: &Record,
        supervisor: &Record,
    ) -> Result<u32, ApiError> {
        let mut params = vec![
            ("rclass", rclass.to_string()),
            ("data1", encode_data(class)),
            ("data2", encode_data(supervisor)),
        ];
        if let Some(qclass) = qclass {
            params.push(("qclass", qclass.to_string()));
        }
        let answer = self.call(identity, "addclass", &params)?;
        answer
            .get("class_id")
            .and_then(value_to_u32)
            .or(qclass)
            .ok_or_else(|| ApiError::Parse("addclass: answer has no class_id".into()))
    }

    fn update_class(
        &self,
        identity: &Identity,
        class: ClassKey<'_>,
        fields: &Record,
    ) -> Result<(), ApiError> {
        let mut params = Self::class_params(class);
        params.push(("data1", encode_data(fields)));
        self.call(identity, "modclass", &params).map(drop)
    }

    fn get_class(&self, identity: &Identity, class: ClassKey<'_>) -> Result<Record, ApiError> {
        let mut record = self.call(identity, "getclass", &Self::class_params(class))?;
        record
            .entry("qclass")
            .or_insert_with(|| Value::from(class.qclass));
        Ok(record)
    }

    fn list_classes(&self, identity: &Identity, rclass: &str) -> Result<Vec<Record>, ApiError> {
        let answer = self.call(identity, "listclasses", &[("rclass", rclass.to_string())])?;
        let Some(Value::Array(entries)) = answer.get("classes_list") else {
            return Ok(Vec::new());
        };

        entries
            .iter()
            .map(|entry| {
                let qclass = match entry {
                    Value::Object(fields) => fields.get("qclass").and_then(value_to_u32),
                    other => value_to_u32(other),
                }
                .ok_or_else(|| ApiError::Parse(format!("listclasses: bad entry {entry}")))?;
                self.get_class(identity, ClassKey::new(qclass, rclass))
            })
            .collect()
    }

    fn delete_class(&self, identity: &Identity, class: ClassKey<'_>) -> Result<(), ApiError> {
        self.call(identity, "delclass", &Self::class_params(class))
            .map(drop)
    }

    fn add_item(
        &self,
        identity: &Identity,
        class: ClassKey<'_>,
        kind: &str,
        identifier: Option<&str>,
        payload: &Record,
    ) -> Result<Record, ApiError> {
        let id_field = identifier_field(kind);
        let mut params = Self::class_params(class);
        if let Some(identifier) = identifier {
            params.push((id_field.as_str(), identifier.to_string()));
        }
        params.push(("data1", encode_data(payload)));
        let answer = self.call(identity, &item_job("add", kind), &params)?;
        if identifier.is_none() && !answer.contains_key(&created_id_field(kind)) {
            return Err(ApiError::Parse(format!(
                "add{kind}: answer has no {}",
                created_id_field(kind)
            )));
        }
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
        let id_field = identifier_field(kind);
        let mut params = Self::class_params(class);
        params.push((id_field.as_str(), identifier.to_string()));
        params.push(("data1", encode_data(payload)));
        self.call(identity, &item_job("mod", kind), &params)
            .map(drop)
    }

    fn get_item(
        &self,
        identity: &Identity,
        class: ClassKey<'_>,
        kind: &str,
        identifier: &str,
    ) -> Result<Record, ApiError> {
        let id_field = identifier_field(kind);
        let mut params = Self::class_params(class);
        params.push((id_field.as_str(), identifier.to_string()));
        let mut record = self.call(identity, &item_job("get", kind), &params)?;
        record.insert(id_field, Value::String(identifier.to_string()));
        Ok(record)
    }

    fn check_item(
        &self,
        identity: &Identity,
        class: ClassKey<'_>,
        kind: &str,
        identifier: &str,
    ) -> Result<bool, ApiError> {
        // Only users have a dedicated existence check.
        let verb = if kind == "user" { "check" } else { "get" };
        let id_field = identifier_field(kind);
        let mut params = Self::class_params(class);
        params.push((id_field.as_str(), identifier.to_string()));
        match self.call(identity, &item_job(verb, kind), &params) {
            Ok(_) => Ok(true),
            Err(e) if e.missing() == Some(Missing::Item) => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn delete_item(
        &self,
        identity: &Identity,
        class: ClassKey<'_>,
        kind: &str,
        identifier: &str,
    ) -> Result<(), ApiError> {
        let id_field = identifier_field(kind);
        let mut params = Self::class_params(class);
        params.push((id_field.as_str(), identifier.to_string()));
        self.call(identity, &item_job("del", kind), &params)
            .map(drop)
    }

    fn list_items(
        &self,
        identity: &Identity,
        class: ClassKey<'_>,
        kind: &str,
    ) -> Result<Vec<Record>, ApiError> {
        self.list_identifiers(identity, class, kind)?
            .iter()
            .map(|identifier| self.get_item(identity, class, kind, identifier))
            .collect()
    }
}
