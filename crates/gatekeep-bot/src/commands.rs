//! Bot command table and parsing.

use gatekeep_auth::Capability;

/// Every command the router understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Start,
    Help,
    Rules,
    Owner,
    Info,
    Status,
    Verify,
    IssueKey,
    Redeem,
    QuotedEscapePayload,
    CArrayPayload,
    InputPayload,
    FilePayload,
}

/// Command names and aliases, matched case-insensitively.
pub const COMMAND_TABLE: &[(&str, CommandKind)] = &[
    ("start", CommandKind::Start),
    ("help", CommandKind::Help),
    ("rules", CommandKind::Rules),
    ("owner", CommandKind::Owner),
    ("info", CommandKind::Info),
    ("status", CommandKind::Status),
    ("verify", CommandKind::Verify),
    ("issue-key", CommandKind::IssueKey),
    ("genkey", CommandKind::IssueKey),
    ("redeem", CommandKind::Redeem),
    ("generate-sized-payload-a", CommandKind::QuotedEscapePayload),
    ("payload1", CommandKind::QuotedEscapePayload),
    ("generate-sized-payload-b", CommandKind::CArrayPayload),
    ("payload2", CommandKind::CArrayPayload),
    ("generate-from-input", CommandKind::InputPayload),
    ("payload3", CommandKind::InputPayload),
    ("generate-from-file", CommandKind::FilePayload),
    ("payload4", CommandKind::FilePayload),
];

impl CommandKind {
    pub fn lookup(name: &str) -> Option<Self> {
        COMMAND_TABLE
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, kind)| *kind)
    }

    /// Capability the access policy must grant before the command runs.
    pub fn capability(self) -> Capability {
        match self {
            CommandKind::Start
            | CommandKind::Help
            | CommandKind::Rules
            | CommandKind::Owner
            | CommandKind::Info
            | CommandKind::Status
            | CommandKind::Verify => Capability::Public,
            CommandKind::IssueKey => Capability::IssueKey,
            CommandKind::Redeem => Capability::Redeem,
            CommandKind::QuotedEscapePayload | CommandKind::CArrayPayload => {
                Capability::SizedPayload
            }
            CommandKind::InputPayload => Capability::InputPayload,
            CommandKind::FilePayload => Capability::FilePayload,
        }
    }

    /// Usage line shown when arguments do not fit.
    pub fn usage(self) -> &'static str {
        match self {
            CommandKind::IssueKey => "/genkey <duration> <days|months>",
            CommandKind::Redeem => "/redeem <key>",
            CommandKind::QuotedEscapePayload => "/payload1 <size in KB>",
            CommandKind::CArrayPayload => "/payload2 <size in KB>",
            CommandKind::InputPayload => "/payload3 <text or hex>",
            CommandKind::FilePayload => "/payload4, then send a binary file",
            CommandKind::Start => "/start",
            CommandKind::Help => "/help",
            CommandKind::Rules => "/rules",
            CommandKind::Owner => "/owner",
            CommandKind::Info => "/info",
            CommandKind::Status => "/status",
            CommandKind::Verify => "/verify",
        }
    }
}

/// A command line split into its kind and the raw argument text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand<'a> {
    pub kind: CommandKind,
    /// Everything after the command name, trimmed.
    pub rest: &'a str,
}

impl<'a> ParsedCommand<'a> {
    /// Parse `/name[@bot] args...`. The leading slash is optional.
    ///
    /// Returns `None` for empty input and unknown commands.
    pub fn parse(text: &'a str) -> Option<Self> {
        let text = text.trim();
        let (head, rest) = match text.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (text, ""),
        };

        let name = head.strip_prefix('/').unwrap_or(head);
        let name = name.split_once('@').map_or(name, |(name, _bot)| name);
        if name.is_empty() {
            return None;
        }

        CommandKind::lookup(name).map(|kind| Self { kind, rest })
    }

    /// Whitespace-separated arguments.
    pub fn args(&self) -> Vec<&'a str> {
        self.rest.split_whitespace().collect()
    }
}
