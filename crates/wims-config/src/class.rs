//! Defaults applied to newly built classes.

use serde::{Deserialize, Serialize};

fn default_lang() -> String {
    "en".to_string()
}

fn default_level() -> String {
    "H4".to_string()
}

/// Default participant limit.
const fn default_limit() -> u32 {
    30
}

fn default_secure() -> String {
    "all".to_string()
}

/// Raw values; they are validated when a class is built from them.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClassDefaults {
    #[serde(default = "default_lang")]
    pub lang: String,

    #[serde(default = "default_level")]
    pub level: String,

    /// Maximum number of participants.
    #[serde(default = "default_limit")]
    pub limit: u32,

    /// Hosts allowed to reach the supervisor pages (`all` or `none` or a host list).
    #[serde(default = "default_secure")]
    pub secure: String,
}

impl Default for ClassDefaults {
    fn default() -> Self {
        Self {
            lang: default_lang(),
            level: default_level(),
            limit: default_limit(),
            secure: default_secure(),
        }
    }
}
