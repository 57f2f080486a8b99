//! Enumerated class fields accepted by the WIMS server.
//!
//! Both enums serialize to the exact tag the server expects and parse from it
//! with [`FromStr`], failing with [`CoreError::Validation`] on anything else.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::CoreError;

// ---------------------------------------------------------------------------
// Lang
// ---------------------------------------------------------------------------

/// Interface language of a class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    Ca,
    Cn,
    De,
    #[default]
    En,
    Es,
    Fr,
    It,
    Nl,
    Si,
    Tw,
}

impl Lang {
    pub const ALL: &'static [Self] = &[
        Self::Ca,
        Self::Cn,
        Self::De,
        Self::En,
        Self::Es,
        Self::Fr,
        Self::It,
        Self::Nl,
        Self::Si,
        Self::Tw,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ca => "ca",
            Self::Cn => "cn",
            Self::De => "de",
            Self::En => "en",
            Self::Es => "es",
            Self::Fr => "fr",
            Self::It => "it",
            Self::Nl => "nl",
            Self::Si => "si",
            Self::Tw => "tw",
        }
    }
}

impl fmt::Display for Lang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Lang {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|lang| lang.as_str() == s)
            .ok_or_else(|| CoreError::validation("lang", s, legal_values(Self::ALL)))
    }
}

// ---------------------------------------------------------------------------
// Level
// ---------------------------------------------------------------------------

/// Teaching level of a class.
///
/// ```text
/// E1..E6  primary school
/// H1..H6  secondary school
/// U1..U5  university
/// G       graduate
/// R       research
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Level {
    E1,
    E2,
    E3,
    E4,
    E5,
    E6,
    H1,
    H2,
    H3,
    #[default]
    H4,
    H5,
    H6,
    U1,
    U2,
    U3,
    U4,
    U5,
    G,
    R,
}

impl Level {
    pub const ALL: &'static [Self] = &[
        Self::E1,
        Self::E2,
        Self::E3,
        Self::E4,
        Self::E5,
        Self::E6,
        Self::H1,
        Self::H2,
        Self::H3,
        Self::H4,
        Self::H5,
        Self::H6,
        Self::U1,
        Self::U2,
        Self::U3,
        Self::U4,
        Self::U5,
        Self::G,
        Self::R,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::E1 => "E1",
            Self::E2 => "E2",
            Self::E3 => "E3",
            Self::E4 => "E4",
            Self::E5 => "E5",
            Self::E6 => "E6",
            Self::H1 => "H1",
            Self::H2 => "H2",
            Self::H3 => "H3",
            Self::H4 => "H4",
            Self::H5 => "H5",
            Self::H6 => "H6",
            Self::U1 => "U1",
            Self::U2 => "U2",
            Self::U3 => "U3",
            Self::U4 => "U4",
            Self::U5 => "U5",
            Self::G => "G",
            Self::R => "R",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|level| level.as_str() == s)
            .ok_or_else(|| CoreError::validation("level", s, legal_values(Self::ALL)))
    }
}

fn legal_values<T: fmt::Display>(all: &[T]) -> String {
    let joined = all
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    format!("expected one of: {joined}")
}
