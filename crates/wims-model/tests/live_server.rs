//! # Live tests against a WIMS server
//!
//! Skipped (not failed) when no server is configured.
//!
//! ## Required environment variables
//!
//! ```bash
//! WIMS_SERVER__URL=http://localhost:7777/wims/wims.cgi
//! WIMS_SERVER__IDENT=myself
//! WIMS_SERVER__PASSWD=toto
//! ```
//!
//! A `.env` at the workspace root is read as well. The server must allow
//! adm/raw access for that identifier.
//!
//! ## Run
//!
//! ```bash
//! cargo test -p wims-model --test live_server -- --nocapture
//! ```

use wims_api::WimsClient;
use wims_core::Identity;
use wims_model::{Class, ItemRef, ModelError, Sheet, User};

const QCLASS: u32 = 999_990;

fn live() -> Option<(WimsClient, Identity)> {
    let config = wims_config::WimsConfig::load_with_dotenv().ok()?;
    if !config.server.is_configured() {
        eprintln!("SKIP: WIMS_SERVER__URL / IDENT / PASSWD not set");
        return None;
    }
    let client = WimsClient::from_config(&config.server).ok()?;
    let identity = config.server.identity().ok()?;
    Some((client, identity))
}

fn supervisor() -> User {
    User::new("supervisor", "last", "first", "pass", "mail@mail.com")
}

fn cleanup(client: &WimsClient, identity: &Identity) {
    if let Ok(mut class) = Class::get(client, identity.clone(), QCLASS, "myclass") {
        let _ = class.delete(client);
    }
}

#[test]
fn live_class_lifecycle() {
    let Some((client, identity)) = live() else {
        return;
    };
    cleanup(&client, &identity);

    let mut class = Class::builder(
        "myclass",
        "A class",
        "an institution",
        "mail@mail.com",
        "password",
        supervisor(),
    )
    .qclass(QCLASS)
    .build()
    .unwrap();
    class.save(&client, identity.clone()).unwrap();

    let mut other = Class::get(&client, identity.clone(), QCLASS, "myclass").unwrap();
    assert_eq!(other.institution, "an institution");

    class.institution = "modified".into();
    class.save(&client, None).unwrap();
    other.refresh(&client).unwrap();
    assert_eq!(other.institution, "modified");

    assert!(class.checkitem(&client, ItemRef::typed::<User>("supervisor")).unwrap());
    let mut user = User::new("quser", "last", "first", "pass", "mail2@mail.com");
    class.additem(&client, &mut user).unwrap();
    assert!(class.contains(&client, &user).unwrap());
    class.delitem(&client, &user).unwrap();
    assert!(!class.contains(&client, &user).unwrap());

    let mut sheet = Sheet::new("First", "First one");
    class.additem(&client, &mut sheet).unwrap();
    assert!(sheet.qsheet.is_some());
    assert_eq!(class.listitem::<Sheet>(&client).unwrap().len(), 1);

    class.delete(&client).unwrap();
    let err = Class::get(&client, identity, QCLASS, "myclass").unwrap_err();
    assert!(matches!(err, ModelError::Remote(_)));
}

#[test]
fn live_unknown_route_lists_nothing() {
    let Some((client, identity)) = live() else {
        return;
    };
    assert!(Class::list(&client, &identity, "unknown_rclass").unwrap().is_empty());
}
