//! # wims-core
//!
//! Core types shared by every crate of the WIMS client.
//!
//! - The identity triple (endpoint, ident, passwd) used for every remote call
//! - Enumerated class fields (`Lang`, `Level`) validated at construction time
//! - `Expiration` dates and the injectable `Clock` behind [`one_year_later`]
//! - Cross-cutting error types

pub mod dates;
pub mod enums;
pub mod errors;
pub mod identity;

pub use dates::{Clock, Expiration, FixedClock, SystemClock, one_year_later};
pub use enums::{Lang, Level};
pub use errors::CoreError;
pub use identity::Identity;
