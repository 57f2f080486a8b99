//! WIMS server connection settings.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use wims_core::Identity;

use crate::error::ConfigError;

/// Default request timeout in seconds.
const fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    "wimsapi-rs/0.1".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// adm/raw endpoint (e.g., `http://localhost:7777/wims/wims.cgi`).
    #[serde(default)]
    pub url: String,

    /// Access identifier declared in the server's `log/classes/.connections/` file.
    #[serde(default)]
    pub ident: String,

    /// Secret paired with `ident`.
    #[serde(default)]
    pub passwd: String,

    /// Per-request timeout, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// User-Agent header sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            ident: String::new(),
            passwd: String::new(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl ServerConfig {
    /// Check if the endpoint and both credentials are set.
    pub fn is_configured(&self) -> bool {
        !self.url.is_empty() && !self.ident.is_empty() && !self.passwd.is_empty()
    }

    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Build the identity triple from the configured values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotConfigured` if the endpoint or a credential is missing.
    pub fn identity(&self) -> Result<Identity, ConfigError> {
        if !self.is_configured() {
            return Err(ConfigError::NotConfigured {
                section: "server".into(),
            });
        }
        Ok(Identity::new(&self.url, &self.ident, &self.passwd))
    }
}
