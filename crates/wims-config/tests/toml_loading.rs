//! Integration tests for TOML configuration loading.
//!
//! Uses figment::Jail for sandboxed working directories and env vars.

use figment::{
    Figment, Jail,
    providers::{Format, Serialized, Toml},
};
use wims_config::WimsConfig;

#[test]
fn loads_server_config_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[server]
url = "http://localhost:7777/wims/wims.cgi"
ident = "myself"
passwd = "toto"
timeout_secs = 5
"#,
        )?;

        let config: WimsConfig = Figment::from(Serialized::defaults(WimsConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert_eq!(config.server.url, "http://localhost:7777/wims/wims.cgi");
        assert_eq!(config.server.ident, "myself");
        assert_eq!(config.server.timeout_secs, 5);
        assert_eq!(config.server.user_agent, "wimsapi-rs/0.1");
        assert!(config.server.is_configured());
        Ok(())
    });
}

#[test]
fn loads_class_defaults_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[class]
lang = "fr"
level = "U1"
"#,
        )?;

        let config: WimsConfig = Figment::from(Serialized::defaults(WimsConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert_eq!(config.class.lang, "fr");
        assert_eq!(config.class.level, "U1");
        assert_eq!(config.class.limit, 30);
        assert_eq!(config.class.secure, "all");
        Ok(())
    });
}

#[test]
fn project_file_is_picked_up_by_load() {
    Jail::expect_with(|jail| {
        std::fs::create_dir(jail.directory().join(".wims")).expect("create .wims");
        jail.create_file(
            ".wims/config.toml",
            r#"
[server]
url = "http://wims.example.org/wims/wims.cgi"
ident = "project"
passwd = "secret"
"#,
        )?;

        let config = WimsConfig::load().expect("config loads");
        assert_eq!(config.server.ident, "project");
        let identity = config.server.identity().expect("configured");
        assert_eq!(identity.url(), "http://wims.example.org/wims/wims.cgi/");
        Ok(())
    });
}
