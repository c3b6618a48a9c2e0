//! Gatekeep command router.
//!
//! Turns chat commands and file uploads into license operations and
//! payloads, after checking them against the access policy.

pub mod app;
pub mod commands;
pub mod config;
pub mod outcome;
pub mod router;
pub mod texts;
pub mod transport;

#[cfg(test)]
mod router_tests;

pub use app::{build_router, build_router_with, membership_oracle};
pub use commands::{CommandKind, ParsedCommand};
pub use config::BotConfig;
pub use outcome::{Message, Outcome, TextFormat};
pub use router::{Router, RouterSettings};
