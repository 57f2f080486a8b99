//! The WIMS adm/raw wire protocol.
//!
//! Requests are plain GETs on the endpoint with `module=adm/raw`, the caller's
//! `ident`/`passwd`, a random `code` echoed back by the server, the `job` name
//! and job parameters. Payloads travel as `key=value` lines in `data1`/`data2`.
//! Answers are JSON objects whose `status` is `OK` or `ERROR`.

use serde_json::Value;
use wims_core::Identity;

use crate::Record;
use crate::error::{ApiError, Missing};

pub const MODULE: &str = "adm/raw";

/// Keys every answer carries that are not part of the record itself.
const ENVELOPE_KEYS: [&str; 3] = ["status", "code", "job"];

/// Messages the server uses when the addressed record is absent.
const ABSENCE_MARKERS: [&str; 5] = [
    "not existing",
    "does not exist",
    "not in this class",
    "not found",
    "no such",
];

/// Job name for `verb` applied to an item kind, e.g. `adduser`, `delsheet`.
#[must_use]
pub fn item_job(verb: &str, kind: &str) -> String {
    format!("{verb}{kind}")
}

/// Parameter carrying an item identifier, e.g. `quser`, `qsheet`.
#[must_use]
pub fn identifier_field(kind: &str) -> String {
    format!("q{kind}")
}

/// Answer field carrying a remotely assigned identifier, e.g. `sheet_id`.
#[must_use]
pub fn created_id_field(kind: &str) -> String {
    format!("{kind}_id")
}

/// Where the identifiers of every item of a kind are listed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListSource {
    pub job: String,
    pub option: Option<&'static str>,
    pub field: String,
}

/// Users are listed by `getclass`; other kinds have a `list<kind>s` job.
#[must_use]
pub fn list_source(kind: &str) -> ListSource {
    match kind {
        "user" => ListSource {
            job: "getclass".into(),
            option: Some("userlist"),
            field: "userlist".into(),
        },
        "sheet" | "exam" => ListSource {
            job: format!("list{kind}s"),
            option: None,
            field: format!("{kind}titlelist"),
        },
        _ => ListSource {
            job: format!("list{kind}s"),
            option: None,
            field: format!("{kind}_list"),
        },
    }
}

/// Render a record as the `key=value` lines expected in `data1`/`data2`.
#[must_use]
pub fn encode_data(record: &Record) -> String {
    record
        .iter()
        .map(|(key, value)| format!("{key}={}", value_to_text(value)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Text form of a JSON value as the server reads it.
#[must_use]
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Read a numeric identifier that the server may send as a number or a string.
#[must_use]
pub fn value_to_u32(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Random request code. The server echoes it back in its answer.
///
/// # Errors
///
/// Returns `ApiError::Parse` if the OS random source is unavailable.
pub fn request_code() -> Result<String, ApiError> {
    let mut bytes = [0u8; 8];
    getrandom::fill(&mut bytes)
        .map_err(|e| ApiError::Parse(format!("failed to generate request code: {e}")))?;
    Ok(bytes.iter().map(|b| format!("{b:02x}")).collect())
}

/// Full request URL for `job` with its parameters.
#[must_use]
pub fn request_url(identity: &Identity, job: &str, code: &str, params: &[(&str, String)]) -> String {
    let mut url = format!(
        "{endpoint}?module={module}&ident={ident}&passwd={passwd}&code={code}&job={job}",
        endpoint = identity.url(),
        module = urlencoding::encode(MODULE),
        ident = urlencoding::encode(identity.ident()),
        passwd = urlencoding::encode(identity.passwd()),
        code = urlencoding::encode(code),
        job = urlencoding::encode(job),
    );
    for (key, value) in params {
        url.push_str(&format!("&{key}={}", urlencoding::encode(value)));
    }
    url
}

/// Turn an answer body into a record or the error it reports.
///
/// # Errors
///
/// - `ApiError::NotFound` when the server refuses because the record is absent
/// - `ApiError::Remote` for any other refusal
/// - `ApiError::Parse` when the body is not an adm/raw answer for `code`
pub fn interpret(job: &str, code: &str, body: Value) -> Result<Record, ApiError> {
    let Value::Object(mut record) = body else {
        return Err(ApiError::Parse(format!("{job}: answer is not a JSON object")));
    };

    if let Some(echoed) = record.get("code").and_then(Value::as_str) {
        if echoed != code {
            return Err(ApiError::Parse(format!(
                "{job}: answer code {echoed:?} does not match request code {code:?}"
            )));
        }
    }

    let status = record
        .get("status")
        .and_then(Value::as_str)
        .map(str::to_ascii_uppercase)
        .ok_or_else(|| ApiError::Parse(format!("{job}: answer has no status")))?;

    match status.as_str() {
        "OK" => {
            for key in ENVELOPE_KEYS {
                record.remove(key);
            }
            Ok(record)
        }
        "ERROR" => {
            let message = record
                .get("message")
                .map(value_to_text)
                .unwrap_or_default();
            if is_absence(&message) {
                Err(ApiError::not_found(job, absent_record(job, &message), message))
            } else {
                Err(ApiError::remote(job, message))
            }
        }
        other => Err(ApiError::Parse(format!("{job}: unexpected status {other:?}"))),
    }
}

fn is_absence(message: &str) -> bool {
    let lowered = message.to_lowercase();
    ABSENCE_MARKERS.iter().any(|marker| lowered.contains(marker))
}

/// Which record an absence message is about. Messages naming the class are
/// about the class unless they say the item is not in it.
fn absent_record(job: &str, message: &str) -> Missing {
    let lowered = message.to_lowercase();
    if lowered.contains("not in this class") {
        Missing::Item
    } else if job == "listclasses" || lowered.contains("rclass") {
        Missing::Route
    } else if lowered.contains("class") || job.ends_with("class") {
        Missing::Class
    } else {
        Missing::Item
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    const OK_FIXTURE: &str = r#"{
        "status": "OK",
        "code": "c0ffee",
        "job": "getclass",
        "description": "A class",
        "institution": "an institution",
        "limit": 30
    }"#;

    #[test]
    fn ok_answer_drops_envelope() {
        let body: Value = serde_json::from_str(OK_FIXTURE).unwrap();
        let record = interpret("getclass", "c0ffee", body).unwrap();
        assert_eq!(record.get("description"), Some(&json!("A class")));
        assert_eq!(record.get("limit"), Some(&json!(30)));
        assert!(!record.contains_key("status"));
        assert!(!record.contains_key("code"));
        assert!(!record.contains_key("job"));
    }

    #[rstest]
    #[case("getclass", "class 999999 not existing", Missing::Class)]
    #[case("getuser", "class 999999 not existing", Missing::Class)]
    #[case("delclass", "does not exist", Missing::Class)]
    #[case("checkuser", "user quser not in this class (999999)", Missing::Item)]
    #[case("getsheet", "sheet 4 does not exist", Missing::Item)]
    #[case("listclasses", "no such rclass myclass", Missing::Route)]
    fn absence_messages_name_what_is_missing(
        #[case] job: &str,
        #[case] message: &str,
        #[case] missing: Missing,
    ) {
        let body = json!({"status": "ERROR", "code": "ab", "message": message});
        let err = interpret(job, "ab", body).unwrap_err();
        assert!(err.is_not_found(), "{message} should map to NotFound");
        assert_eq!(err.missing(), Some(missing));
    }

    #[test]
    fn other_refusals_are_remote() {
        let body = json!({"status": "ERROR", "code": "ab", "message": "class 999999 already exists"});
        let err = interpret("addclass", "ab", body).unwrap_err();
        assert!(matches!(err, ApiError::Remote { ref job, .. } if job == "addclass"));
    }

    #[test]
    fn mismatched_code_is_a_parse_error() {
        let body = json!({"status": "OK", "code": "other"});
        let err = interpret("getclass", "mine", body).unwrap_err();
        assert!(matches!(err, ApiError::Parse(_)));
    }

    #[test]
    fn non_object_body_is_a_parse_error() {
        let err = interpret("getclass", "ab", json!(["OK"])).unwrap_err();
        assert!(matches!(err, ApiError::Parse(_)));
    }

    #[test]
    fn encodes_lines_in_record_order() {
        let Value::Object(record) = json!({"description": "A class", "limit": 30, "css": null})
        else {
            unreachable!()
        };
        let encoded = encode_data(&record);
        let mut lines: Vec<_> = encoded.lines().collect();
        lines.sort_unstable();
        assert_eq!(lines, vec!["css=", "description=A class", "limit=30"]);
    }

    #[test]
    fn request_url_escapes_parameters() {
        let identity = Identity::new("http://localhost:7777/wims/wims.cgi", "my self", "p&ss");
        let url = request_url(
            &identity,
            "getuser",
            "00ff",
            &[("qclass", "999999".into()), ("quser", "a b".into())],
        );
        assert_eq!(
            url,
            "http://localhost:7777/wims/wims.cgi/?module=adm%2Fraw&ident=my%20self&passwd=p%26ss\
             &code=00ff&job=getuser&qclass=999999&quser=a%20b"
        );
    }

    #[test]
    fn request_code_is_hex() {
        let code = request_code().unwrap();
        assert_eq!(code.len(), 16);
        assert!(code.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn identifiers_read_from_numbers_and_strings() {
        assert_eq!(value_to_u32(&json!(42)), Some(42));
        assert_eq!(value_to_u32(&json!("42")), Some(42));
        assert_eq!(value_to_u32(&json!("x")), None);
        assert_eq!(value_to_u32(&json!(-1)), None);
    }

    #[test]
    fn list_sources_per_kind() {
        assert_eq!(list_source("user").field, "userlist");
        assert_eq!(list_source("sheet").job, "listsheets");
        assert_eq!(list_source("sheet").field, "sheettitlelist");
        assert_eq!(list_source("doc").field, "doc_list");
    }
}
