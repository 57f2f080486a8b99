//! WIMS users.

use serde::{Deserialize, Serialize};
use std::any::Any;
use wims_api::Record;

use crate::error::ModelError;
use crate::item::{ClassItem, ItemType, Membership};
use crate::record;

/// A user of a class. `quser` is the identifier inside the class; every other
/// field is sent as the user's record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    #[serde(skip)]
    pub quser: String,
    pub lastname: String,
    pub firstname: String,
    /// Clear-text password.
    pub password: String,
    pub email: String,
    pub comments: String,
    /// Registration number.
    pub regnum: String,
    pub photourl: String,
    /// Classes the user participates in.
    pub participate: String,
    pub courses: String,
    pub classes: String,
    /// Classes the user supervises.
    pub supervise: String,
    /// `yes` or `no`: whether the user may supervise a class.
    pub supervisable: String,
    /// Login used for external authentication.
    pub external_auth: String,
    /// `yes` skips the terms-of-use prompt on first login.
    pub agreecgu: String,
    pub regprop1: String,
    pub regprop2: String,
    pub regprop3: String,
    pub regprop4: String,
    pub regprop5: String,
    #[serde(skip)]
    membership: Option<Membership>,
}

impl Default for User {
    fn default() -> Self {
        Self {
            quser: String::new(),
            lastname: String::new(),
            firstname: String::new(),
            password: String::new(),
            email: String::new(),
            comments: String::new(),
            regnum: String::new(),
            photourl: String::new(),
            participate: String::new(),
            courses: String::new(),
            classes: String::new(),
            supervise: String::new(),
            supervisable: "no".to_string(),
            external_auth: String::new(),
            agreecgu: "yes".to_string(),
            regprop1: String::new(),
            regprop2: String::new(),
            regprop3: String::new(),
            regprop4: String::new(),
            regprop5: String::new(),
            membership: None,
        }
    }
}

impl User {
    pub fn new(
        quser: impl Into<String>,
        lastname: impl Into<String>,
        firstname: impl Into<String>,
        password: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            quser: quser.into(),
            lastname: lastname.into(),
            firstname: firstname.into(),
            password: password.into(),
            email: email.into(),
            ..Self::default()
        }
    }

    /// First and last name, each word capitalized.
    #[must_use]
    pub fn fullname(&self) -> String {
        format!("{} {}", self.firstname, self.lastname)
            .split(' ')
            .map(capitalize)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
    })
}

impl ClassItem for User {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn identifier(&self) -> Option<String> {
        (!self.quser.is_empty()).then(|| self.quser.clone())
    }

    fn to_payload(&self) -> Result<Record, ModelError> {
        record::encode("user", self)
    }

    fn membership(&self) -> Option<&Membership> {
        self.membership.as_ref()
    }

    fn set_membership(&mut self, membership: Option<Membership>) {
        self.membership = membership;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl ItemType for User {
    const KIND: &'static str = "user";

    fn from_record(identifier: &str, record: Record) -> Result<Self, ModelError> {
        let mut user: Self = record::decode("user", record)?;
        user.quser = identifier.to_string();
        Ok(user)
    }
}
