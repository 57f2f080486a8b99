//! Class lifecycle against an in-process server.
//!
//! - Construction: validation, default expiration
//! - Binding: save/get/list/refresh/delete and the not-bound guard
//! - Equality of bound handles
//! - Endpoint normalization

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use rstest::rstest;

use wims_api::MemoryApi;
use wims_core::{FixedClock, Identity, Lang, one_year_later};
use wims_model::{Class, ClassBuilder, Lifecycle, ModelError, User};

const URL: &str = "http://localhost:7777/wims/wims.cgi/";

fn identity() -> Identity {
    Identity::new(URL, "myself", "toto")
}

fn supervisor() -> User {
    User::new("supervisor", "last", "first", "pass", "mail@mail.com")
}

fn class_builder(rclass: &str) -> ClassBuilder {
    Class::builder(
        rclass,
        "A class",
        "an institution",
        "mail@mail.com",
        "password",
        supervisor(),
    )
}

fn unsaved() -> Class {
    class_builder("myclass").qclass(999_999).build().unwrap()
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

#[test]
fn one_year_later_uses_the_given_clock() {
    let clock = FixedClock(NaiveDate::from_ymd_opt(1966, 11, 16).unwrap());
    assert_eq!(one_year_later(&clock), "19671116");
}

#[rstest]
#[case::lang(class_builder("myclass").lang("Wrong"))]
#[case::level(class_builder("myclass").level("Wrong"))]
#[case::expiration(class_builder("myclass").expiration("Wrong"))]
#[case::short_expiration(class_builder("myclass").expiration("2030011"))]
fn invalid_fields_fail_construction(#[case] builder: ClassBuilder) {
    assert!(matches!(builder.build(), Err(ModelError::Validation(_))));
}

#[test]
fn unsaved_class_refuses_everything_bound() {
    let api = MemoryApi::new();
    let mut class = unsaved();

    assert!(matches!(class.url(), Err(ModelError::NotBound(_))));
    assert!(matches!(class.ident(), Err(ModelError::NotBound(_))));
    assert!(matches!(class.passwd(), Err(ModelError::NotBound(_))));
    assert!(matches!(class.infos(&api), Err(ModelError::NotBound(_))));
    assert!(matches!(class.save(&api, None), Err(ModelError::NotBound(_))));
    assert!(matches!(class.refresh(&api), Err(ModelError::NotBound(_))));
    assert!(matches!(class.delete(&api), Err(ModelError::NotBound(_))));
    assert_eq!(api.requests(), 0);
}

// ---------------------------------------------------------------------------
// Binding
// ---------------------------------------------------------------------------

#[test]
fn get_exposes_identity_and_infos() {
    let api = MemoryApi::new();
    unsaved().save(&api, identity()).unwrap();

    let class = Class::get(&api, identity(), 999_999, "myclass").unwrap();
    assert_eq!(class.url().unwrap(), URL);
    assert_eq!(class.ident().unwrap(), "myself");
    assert_eq!(class.passwd().unwrap(), "toto");
    assert_eq!(class.qclass().unwrap(), 999_999);
    assert!(class.infos(&api).unwrap().contains_key("description"));
    assert!(class.supervisor.is_none());
}

#[rstest]
#[case("http://localhost:7777/wims/wims.cgi")]
#[case("http://localhost:7777/wims/wims.cgi/")]
#[case("http://localhost:7777/wims/wims.cgi//")]
fn endpoint_ends_with_one_separator(#[case] url: &str) {
    let api = MemoryApi::new();
    let mut class = unsaved();
    class
        .save(&api, Identity::new(url, "myself", "toto"))
        .unwrap();
    assert_eq!(class.url().unwrap(), URL);

    let fetched = Class::get(&api, Identity::new(url, "myself", "toto"), 999_999, "myclass")
        .unwrap();
    assert_eq!(fetched.url().unwrap(), URL);
}

#[test]
fn save_then_get_round_trips_fields() {
    let api = MemoryApi::new();
    let mut class = class_builder("myclass")
        .qclass(999_999)
        .lang("fr")
        .level("U2")
        .expiration("20300101")
        .limit(120)
        .bgcolor("#ffffff")
        .build()
        .unwrap();
    class.save(&api, identity()).unwrap();
    assert_eq!(class.lifecycle(), Lifecycle::Bound);

    let fetched = Class::get(&api, identity(), 999_999, "myclass").unwrap();
    assert_eq!(fetched.name, "A class");
    assert_eq!(fetched.institution, "an institution");
    assert_eq!(fetched.lang, Lang::Fr);
    assert_eq!(fetched.level.as_str(), "U2");
    assert_eq!(fetched.expiration.to_string(), "20300101");
    assert_eq!(fetched.limit, 120);
    assert_eq!(fetched.bgcolor, "#ffffff");
    assert!(class.try_eq(&fetched).unwrap());
}

#[test]
fn handles_diverge_until_refresh() {
    let api = MemoryApi::new();
    unsaved().save(&api, identity()).unwrap();

    let mut c1 = Class::get(&api, identity(), 999_999, "myclass").unwrap();
    let mut c2 = Class::get(&api, identity(), 999_999, "myclass").unwrap();
    assert_eq!(c1.institution, "an institution");
    assert_eq!(c2.institution, "an institution");

    c1.institution = "modified".into();
    c1.save(&api, None).unwrap();
    assert_eq!(c1.institution, "modified");
    assert_eq!(c2.institution, "an institution");

    c2.refresh(&api).unwrap();
    assert_eq!(c2.institution, "modified");
}

#[test]
fn refresh_discards_local_edits() {
    let api = MemoryApi::new();
    let mut class = unsaved();
    class.save(&api, identity()).unwrap();

    class.institution = "not saved".into();
    class.refresh(&api).unwrap();
    assert_eq!(class.institution, "an institution");
}

#[test]
fn bound_save_ignores_passed_identity() {
    let api = MemoryApi::new();
    let mut class = unsaved();
    class.save(&api, identity()).unwrap();

    class.institution = "modified".into();
    class
        .save(&api, Identity::new("http://elsewhere/wims.cgi", "other", "secret"))
        .unwrap();
    assert_eq!(class.url().unwrap(), URL);

    let fetched = Class::get(&api, identity(), 999_999, "myclass").unwrap();
    assert_eq!(fetched.institution, "modified");
}

#[test]
fn save_without_qclass_gets_one_assigned() {
    let api = MemoryApi::new();
    let mut class = class_builder("myclass").build().unwrap();
    class.save(&api, identity()).unwrap();
    assert!(class.qclass().is_ok());
    class.delete(&api).unwrap();
}

#[test]
fn failed_creation_leaves_class_unbound() {
    let api = MemoryApi::new();
    unsaved().save(&api, identity()).unwrap();

    let mut duplicate = unsaved();
    let err = duplicate.save(&api, identity()).unwrap_err();
    assert!(matches!(err, ModelError::Remote(_)));
    assert!(!err.is_not_found());
    assert_eq!(duplicate.lifecycle(), Lifecycle::Unbound);
}

#[test]
fn delete_unbinds_and_removes_remote_record() {
    let api = MemoryApi::new();
    let mut class = unsaved();
    class.save(&api, identity()).unwrap();

    assert!(Class::get(&api, identity(), 999_999, "myclass").is_ok());
    class.delete(&api).unwrap();
    assert_eq!(class.lifecycle(), Lifecycle::Deleted);
    assert!(matches!(class.qclass(), Err(ModelError::NotBound(_))));
    assert!(matches!(class.save(&api, identity()), Err(ModelError::NotBound(_))));

    let err = Class::get(&api, identity(), 999_999, "myclass").unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn failed_delete_keeps_the_binding() {
    let api = MemoryApi::new();
    let mut class = unsaved();
    class.save(&api, identity()).unwrap();
    Class::get(&api, identity(), 999_999, "myclass")
        .unwrap()
        .delete(&api)
        .unwrap();

    let err = class.delete(&api).unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(class.lifecycle(), Lifecycle::Bound);
    assert_eq!(class.qclass().unwrap(), 999_999);
    assert_eq!(class.url().unwrap(), URL);
}

#[test]
fn failed_update_keeps_local_fields_and_binding() {
    let api = MemoryApi::new();
    let mut class = unsaved();
    class.save(&api, identity()).unwrap();
    Class::get(&api, identity(), 999_999, "myclass")
        .unwrap()
        .delete(&api)
        .unwrap();

    class.institution = "modified".into();
    class.limit = 12;
    let err = class.save(&api, None).unwrap_err();
    assert!(matches!(err, ModelError::Remote(_)));
    assert_eq!(class.institution, "modified");
    assert_eq!(class.limit, 12);
    assert_eq!(class.lifecycle(), Lifecycle::Bound);
    assert_eq!(class.qclass().unwrap(), 999_999);
}

#[test]
fn list_returns_classes_of_a_route() {
    let api = MemoryApi::new();
    let mut saved = Vec::new();
    for _ in 0..3 {
        let mut class = class_builder("rclass").build().unwrap();
        class.save(&api, identity()).unwrap();
        saved.push(class);
    }

    let mut listed = Class::list(&api, &identity(), "rclass").unwrap();
    listed.sort_by_key(|c| c.qclass().unwrap_or_default());
    saved.sort_by_key(|c| c.qclass().unwrap_or_default());
    assert_eq!(listed.len(), 3);
    for (local, remote) in saved.iter().zip(&listed) {
        assert!(local.try_eq(remote).unwrap());
    }

    assert!(Class::list(&api, &identity(), "unknown_rclass").unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Equality
// ---------------------------------------------------------------------------

#[test]
fn equality_of_bound_handles() {
    let api = MemoryApi::new();
    let mut c1 = class_builder("rclass").build().unwrap();
    let mut c2 = class_builder("rclass").build().unwrap();
    let c3 = class_builder("rclass").build().unwrap();
    assert!(matches!(c1.try_eq(&c3), Err(ModelError::NotBound(_))));
    assert!(!c3.try_eq(&1).unwrap());

    c1.save(&api, identity()).unwrap();
    c2.save(&api, identity()).unwrap();
    assert!(matches!(c1.try_eq(&c3), Err(ModelError::NotBound(_))));

    let again = Class::get(&api, identity(), c1.qclass().unwrap(), c1.rclass()).unwrap();
    assert!(c1.try_eq(&again).unwrap());
    assert!(!c2.try_eq(&again).unwrap());
    assert!(!c2.try_eq(&1).unwrap());

    c1.institution = "changed locally".into();
    assert!(!c1.try_eq(&again).unwrap());
}

#[test]
fn remote_refusals_are_surfaced_unchanged() {
    let api = MemoryApi::new().with_account("myself", "toto");
    let mut class = unsaved();
    let err = class
        .save(&api, Identity::new(URL, "myself", "wrong"))
        .unwrap_err();
    assert!(matches!(err, ModelError::Remote(_)));
    assert_eq!(api.requests(), 1);
    assert_eq!(class.lifecycle(), Lifecycle::Unbound);
}
