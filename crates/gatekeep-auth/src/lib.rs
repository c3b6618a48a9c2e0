//! Access policy for Gatekeep.
//!
//! Composes the admin allow-list, license entitlements and channel
//! membership into per-capability authorization decisions.

pub mod membership;
pub mod policy;

pub use membership::{
    bot_api::{BotApiConfig, BotApiMembership},
    fixed::StaticMembership,
};
pub use policy::{AccessPolicy, Capability, Decision, DenyReason, Requirement};
