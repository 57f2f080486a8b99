//! Construction-time validation of the constrained class fields.

use rstest::rstest;
use wims_core::{CoreError, Expiration, Lang, Level};

#[rstest]
#[case("Wrong")]
#[case("EN")]
#[case("")]
#[case("english")]
fn rejects_unknown_lang(#[case] value: &str) {
    let err = value.parse::<Lang>().unwrap_err();
    assert!(matches!(err, CoreError::Validation { field: "lang", .. }));
}

#[rstest]
#[case("Wrong")]
#[case("h4")]
#[case("H7")]
#[case("U6")]
#[case("")]
fn rejects_unknown_level(#[case] value: &str) {
    let err = value.parse::<Level>().unwrap_err();
    assert!(matches!(err, CoreError::Validation { field: "level", .. }));
}

#[rstest]
#[case("Wrong")]
#[case("2030011")]
#[case("203001011")]
#[case("2030-1-01")]
#[case("20301301")]
#[case("20300230")]
#[case("+2030101")]
fn rejects_malformed_expiration(#[case] value: &str) {
    let err = value.parse::<Expiration>().unwrap_err();
    assert!(matches!(
        err,
        CoreError::Validation {
            field: "expiration",
            ..
        }
    ));
}

#[rstest]
#[case("19671116")]
#[case("20240229")]
#[case("29991231")]
fn accepts_valid_expiration(#[case] value: &str) {
    let exp: Expiration = value.parse().unwrap();
    assert_eq!(exp.to_string(), value);
}
