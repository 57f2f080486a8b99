use std::fmt;

/// The remote location and credentials used for every operation on a bound
/// entity: the adm/raw endpoint, the access identifier, and its secret.
///
/// The endpoint is normalized on construction so that it always ends with
/// exactly one `/`, whatever the caller supplied.
#[derive(Clone, PartialEq, Eq)]
pub struct Identity {
    url: String,
    ident: String,
    passwd: String,
}

impl Identity {
    pub fn new(url: impl Into<String>, ident: impl Into<String>, passwd: impl Into<String>) -> Self {
        Self {
            url: normalize_endpoint(&url.into()),
            ident: ident.into(),
            passwd: passwd.into(),
        }
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    #[must_use]
    pub fn ident(&self) -> &str {
        &self.ident
    }

    #[must_use]
    pub fn passwd(&self) -> &str {
        &self.passwd
    }
}

// Keeps the secret out of logs and panic messages.
impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("url", &self.url)
            .field("ident", &self.ident)
            .field("passwd", &"***")
            .finish()
    }
}

fn normalize_endpoint(url: &str) -> String {
    let mut normalized = url.trim_end_matches('/').to_string();
    normalized.push('/');
    normalized
}
