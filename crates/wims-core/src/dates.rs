//! Expiration dates and the clock used to compute their default.
//!
//! The server exchanges dates as 8-digit `YYYYMMDD` strings. [`Expiration`]
//! holds a date that is known to render that way; [`one_year_later`] reads
//! "today" from an injected [`Clock`] so callers and tests control it.

use chrono::{Local, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::CoreError;

const WIRE_FORMAT: &str = "%Y%m%d";

/// Source of "today".
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

/// Reads the local system date.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Always returns the same date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Today's date shifted by one calendar year, as `YYYYMMDD`.
///
/// February 29th maps to February 28th of the following year.
pub fn one_year_later(clock: &impl Clock) -> String {
    Expiration::one_year_after(clock.today()).to_string()
}

/// A class or sheet expiration date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Expiration(NaiveDate);

impl Expiration {
    #[must_use]
    pub const fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Default expiration computed from `clock`.
    pub fn default_from(clock: &impl Clock) -> Self {
        Self::one_year_after(clock.today())
    }

    #[must_use]
    pub const fn date(self) -> NaiveDate {
        self.0
    }

    fn one_year_after(date: NaiveDate) -> Self {
        // checked_add_months clamps to the last day of the month, so it only
        // fails at the very end of chrono's supported range.
        Self(date.checked_add_months(Months::new(12)).unwrap_or(date))
    }
}

impl fmt::Display for Expiration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(WIRE_FORMAT))
    }
}

impl FromStr for Expiration {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // chrono's %Y accepts any width, so enforce the 8 digits first.
        if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CoreError::validation(
                "expiration",
                s,
                "expected an 8-digit YYYYMMDD date",
            ));
        }
        NaiveDate::parse_from_str(s, WIRE_FORMAT)
            .map(Self)
            .map_err(|e| CoreError::validation("expiration", s, e.to_string()))
    }
}

impl TryFrom<String> for Expiration {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Expiration> for String {
    fn from(value: Expiration) -> Self {
        value.to_string()
    }
}
