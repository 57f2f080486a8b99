//! # wims-config
//!
//! Layered configuration loading for the WIMS client using figment.
//!
//! Later sources override earlier ones: built-in defaults, then
//! `~/.config/wims/config.toml`, then `.wims/config.toml` in the working
//! directory, then `WIMS_*` environment variables. A double underscore
//! separates the section from the key, so `WIMS_SERVER__URL` sets
//! `server.url` and `WIMS_CLASS__LANG` sets `class.lang`.
//!
//! # Usage
//!
//! ```no_run
//! use wims_config::WimsConfig;
//!
//! let config = WimsConfig::load_with_dotenv().expect("config");
//!
//! if config.server.is_configured() {
//!     println!("WIMS endpoint: {}", config.server.url);
//! }
//! ```

mod class;
mod error;
mod server;

pub use class::ClassDefaults;
pub use error::ConfigError;
pub use server::ServerConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct WimsConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub class: ClassDefaults,
}

impl WimsConfig {
    /// Extract and validate the layered configuration. A `.env` file is only
    /// read by [`Self::load_with_dotenv`].
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Figment` if a source cannot be parsed, or
    /// `ConfigError::InvalidValue` if a value is out of range.
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment().extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with `.env` file support.
    ///
    /// # Errors
    ///
    /// Same as [`Self::load`].
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        Self::load_dotenv_from_workspace();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can add providers on top.
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        let local_path = PathBuf::from(".wims/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed("WIMS_").split("__"))
    }

    /// Reject values that would make every request fail.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.timeout_secs".into(),
                reason: "must be greater than zero".into(),
            });
        }
        if self.class.limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "class.limit".into(),
                reason: "must be greater than zero".into(),
            });
        }
        Ok(())
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("wims").join("config.toml"))
    }

    /// Load `.env` walking up from `CARGO_MANIFEST_DIR`, then the current dir.
    /// Silently does nothing if no `.env` is found.
    fn load_dotenv_from_workspace() {
        if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
            let mut dir = PathBuf::from(manifest_dir);
            // crate -> crates/ -> workspace root
            for _ in 0..3 {
                let env_path = dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                    return;
                }
                if !dir.pop() {
                    break;
                }
            }
        }

        let _ = dotenvy::dotenv();
    }
}
