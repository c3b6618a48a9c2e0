//! Gatekeep Core
//!
//! Core domain types, traits, and error handling for Gatekeep.
//! This crate has minimal dependencies and defines the shared vocabulary
//! used by the license store, the access policy, the payload engine and
//! the command router.

pub mod error;
pub mod expiry;
pub mod ids;
pub mod ports;
pub mod snapshot;

pub use error::{Error, Result};
pub use expiry::Expiry;
pub use ids::*;
pub use snapshot::Snapshot;
