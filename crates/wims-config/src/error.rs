use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// A source could not be read or did not fit [`crate::WimsConfig`].
    #[error("cannot load WIMS configuration: {0}")]
    Figment(#[from] figment::Error),

    /// The section lacks a value needed to reach the server.
    #[error("[{section}] is incomplete: endpoint, ident and passwd are all required")]
    NotConfigured { section: String },

    #[error("{field} {reason}")]
    InvalidValue { field: String, reason: String },
}
