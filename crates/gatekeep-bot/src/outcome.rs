//! Command outcomes and their rendering into reply messages.

use crate::commands::CommandKind;
use crate::router::RouterSettings;
use crate::texts;
use gatekeep_auth::DenyReason;
use gatekeep_core::{Error, Expiry};
use gatekeep_licensing::IssuedKey;
use gatekeep_payload::chunk;
use std::time::Duration;
use tracing::error;

/// Opening of every payload message.
pub const PAYLOAD_HEADER: &str = "Generated Payload:\n```\n";

/// Closing of every payload message.
pub const PAYLOAD_FOOTER: &str = "\n```";

/// How a transport should interpret a message body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextFormat {
    Plain,
    Markdown,
}

/// One reply message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub text: String,
    pub format: TextFormat,
}

impl Message {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            format: TextFormat::Plain,
        }
    }

    pub fn markdown(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            format: TextFormat::Markdown,
        }
    }
}

/// Result of handling one command, before rendering.
#[derive(Debug)]
pub enum Outcome {
    Text(String),
    Welcome { member: bool },
    Verified { member: bool },
    KeyIssued(IssuedKey),
    Redeemed { expires_at: Expiry },
    /// Rendered payload, split into as many messages as needed.
    Payload(String),
    AwaitingUpload,
    Status {
        entitlement: Option<Expiry>,
        active: bool,
        member: bool,
    },
    /// `pending_keys` is only filled in for administrators.
    Info {
        uptime: Duration,
        pending_keys: Option<usize>,
    },
    Usage(CommandKind),
    Denied(DenyReason),
    Failed(Error),
    Unknown,
}

/// Payload characters that fit in one message next to the header and footer.
pub fn payload_ceiling(message_limit: usize) -> usize {
    let overhead = PAYLOAD_HEADER.chars().count() + PAYLOAD_FOOTER.chars().count();
    message_limit.saturating_sub(overhead).max(1)
}

/// `Xh Ym Zs`
pub fn format_uptime(uptime: Duration) -> String {
    let secs = uptime.as_secs();
    format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
}

impl Outcome {
    /// Render into the ordered messages a transport sends back.
    pub fn render(self, settings: &RouterSettings) -> Vec<Message> {
        match self {
            Outcome::Text(text) => vec![Message::plain(text)],
            Outcome::Welcome { member: true } => vec![Message::plain(texts::welcome())],
            Outcome::Welcome { member: false } | Outcome::Verified { member: false } => {
                vec![Message::plain(texts::join_prompt(&settings.channels))]
            }
            Outcome::Verified { member: true } => vec![Message::plain(texts::JOINED)],
            Outcome::KeyIssued(issued) => vec![Message::plain(format!(
                "Generated new key: {}\nExpires on: {}",
                issued.key, issued.expires_at
            ))],
            Outcome::Redeemed { expires_at } => vec![Message::plain(format!(
                "Key redeemed successfully! Access granted until: {expires_at}"
            ))],
            Outcome::Payload(payload) => chunk(&payload, payload_ceiling(settings.message_limit))
                .into_iter()
                .map(|piece| Message::markdown(format!("{PAYLOAD_HEADER}{piece}{PAYLOAD_FOOTER}")))
                .collect(),
            Outcome::AwaitingUpload => vec![Message::plain(texts::AWAITING_UPLOAD)],
            Outcome::Status {
                entitlement,
                active,
                member,
            } => {
                let key = match (entitlement, active) {
                    (Some(expires_at), true) => format!("Active until {expires_at}"),
                    (Some(expires_at), false) => format!("Expired on {expires_at}"),
                    (None, _) => "None".to_string(),
                };
                let membership = if member { "Joined" } else { "Not joined" };
                vec![Message::plain(format!(
                    "Key: {key}\nChannel membership: {membership}"
                ))]
            }
            Outcome::Info {
                uptime,
                pending_keys,
            } => {
                let mut text = format!(
                    "Access the payload services with a valid key.\nJoin the required channels to use the bot.\nCurrent uptime: {}",
                    format_uptime(uptime)
                );
                if let Some(pending) = pending_keys {
                    text.push_str(&format!("\nUnredeemed keys: {pending}"));
                }
                vec![Message::plain(text)]
            }
            Outcome::Usage(kind) => vec![Message::plain(format!("Usage: {}", kind.usage()))],
            Outcome::Denied(reason) => vec![Message::plain(denial_text(reason, settings))],
            Outcome::Failed(err) => vec![Message::plain(failure_text(&err))],
            Outcome::Unknown => vec![Message::plain(texts::FALLBACK)],
        }
    }
}

fn denial_text(reason: DenyReason, settings: &RouterSettings) -> String {
    match reason {
        DenyReason::NotAdmin => "You are not authorized to use this command.".to_string(),
        DenyReason::EntitlementRequired => {
            "You need a valid key to use this command. Redeem one with /redeem <key>.".to_string()
        }
        DenyReason::MembershipRequired => texts::join_prompt(&settings.channels),
    }
}

fn failure_text(err: &Error) -> String {
    if err.is_user_correctable() {
        return err.to_string();
    }
    error!(error = %err, "Command failed");
    texts::FALLBACK.to_string()
}
