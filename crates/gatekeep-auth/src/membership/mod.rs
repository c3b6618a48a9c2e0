//! Channel membership oracle implementations.

pub mod bot_api;
pub mod fixed;

/// Chat member statuses that count as membership.
pub const MEMBER_STATUSES: &[&str] = &["member", "administrator", "creator"];

pub fn is_member_status(status: &str) -> bool {
    MEMBER_STATUSES.contains(&status)
}
