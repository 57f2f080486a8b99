//! WIMS exercise sheets.

use serde::{Deserialize, Serialize};
use std::any::Any;
use wims_api::Record;
use wims_api::protocol::{created_id_field, value_to_u32};
use wims_core::{Clock, Expiration, SystemClock};

use crate::error::ModelError;
use crate::item::{ClassItem, ItemType, Membership};
use crate::record;

/// A sheet of exercises. The server numbers sheets when they are added, so
/// `qsheet` stays `None` until then.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sheet {
    #[serde(skip)]
    pub qsheet: Option<u32>,
    pub title: String,
    pub description: String,
    pub expiration: Expiration,
    /// `0` pending, `1` active, `2` expired, `3` hidden.
    pub sheetmode: String,
    pub weight: String,
    pub formula: String,
    pub indicator: String,
    pub contents: String,
    #[serde(skip)]
    membership: Option<Membership>,
}

impl Default for Sheet {
    fn default() -> Self {
        Self::new_with(String::new(), String::new(), &SystemClock)
    }
}

impl Sheet {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new_with(title, description, &SystemClock)
    }

    /// Like [`Sheet::new`], with the default expiration taken from `clock`.
    pub fn new_with(
        title: impl Into<String>,
        description: impl Into<String>,
        clock: &impl Clock,
    ) -> Self {
        Self {
            qsheet: None,
            title: title.into(),
            description: description.into(),
            expiration: Expiration::default_from(clock),
            sheetmode: "0".to_string(),
            weight: "1".to_string(),
            formula: "2".to_string(),
            indicator: "1".to_string(),
            contents: String::new(),
            membership: None,
        }
    }
}

impl ClassItem for Sheet {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn identifier(&self) -> Option<String> {
        self.qsheet.map(|qsheet| qsheet.to_string())
    }

    fn to_payload(&self) -> Result<Record, ModelError> {
        record::encode("sheet", self)
    }

    fn on_added(&mut self, answer: &Record) -> Result<(), ModelError> {
        let field = created_id_field(Self::KIND);
        match answer.get(&field).and_then(value_to_u32) {
            Some(qsheet) => {
                self.qsheet = Some(qsheet);
                Ok(())
            }
            None if self.qsheet.is_some() => Ok(()),
            None => Err(ModelError::Decode(format!(
                "addsheet answer has no usable {field}"
            ))),
        }
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

impl ItemType for Sheet {
    const KIND: &'static str = "sheet";

    fn from_record(identifier: &str, record: Record) -> Result<Self, ModelError> {
        let qsheet = identifier
            .trim()
            .parse::<u32>()
            .map_err(|e| ModelError::Decode(format!("sheet identifier {identifier:?}: {e}")))?;
        let mut sheet: Self = record::decode("sheet", record)?;
        sheet.qsheet = Some(qsheet);
        Ok(sheet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};
    use wims_core::FixedClock;

    fn clock() -> FixedClock {
        FixedClock(NaiveDate::from_ymd_opt(1966, 11, 16).unwrap())
    }

    #[test]
    fn new_sheet_has_no_identifier() {
        let sheet = Sheet::new_with("First", "First one", &clock());
        assert_eq!(sheet.identifier(), None);
        assert_eq!(sheet.expiration.to_string(), "19671116");
    }

    #[test]
    fn added_sheet_takes_the_assigned_number() {
        let mut sheet = Sheet::new_with("First", "First one", &clock());
        let Value::Object(answer) = json!({"sheet_id": "4"}) else {
            unreachable!()
        };
        sheet.on_added(&answer).unwrap();
        assert_eq!(sheet.qsheet, Some(4));
        assert_eq!(sheet.identifier().as_deref(), Some("4"));
    }

    #[test]
    fn answer_without_number_is_a_decode_error() {
        let mut sheet = Sheet::new_with("First", "First one", &clock());
        assert!(matches!(
            sheet.on_added(&Record::new()),
            Err(ModelError::Decode(_))
        ));
    }

    #[test]
    fn from_record_reads_numeric_fields_as_text() {
        let Value::Object(record) = json!({
            "qsheet": "2",
            "title": "Second",
            "description": "Second one",
            "expiration": 20_300_101,
            "sheetmode": 1,
            "weight": 1
        }) else {
            unreachable!()
        };
        let sheet = Sheet::from_record("2", record).unwrap();
        assert_eq!(sheet.qsheet, Some(2));
        assert_eq!(sheet.sheetmode, "1");
        assert_eq!(sheet.expiration.to_string(), "20300101");
    }

    #[test]
    fn non_numeric_identifier_is_rejected() {
        assert!(matches!(
            Sheet::from_record("first", Record::new()),
            Err(ModelError::Decode(_))
        ));
    }
}
