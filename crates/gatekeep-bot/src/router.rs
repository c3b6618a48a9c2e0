//! Command router: parses, authorizes, executes and renders.

use crate::commands::{CommandKind, ParsedCommand};
use crate::outcome::{Message, Outcome, payload_ceiling};
use crate::texts;
use gatekeep_auth::{AccessPolicy, Capability, Decision};
use gatekeep_core::{Error, Expiry, LicenseKey, PrincipalId, Result};
use gatekeep_licensing::{DurationUnit, LicenseStore};
use gatekeep_payload::{Upload, c_array_payload, from_input, from_upload, quoted_escape_payload};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Router limits and display settings.
#[derive(Debug, Clone)]
pub struct RouterSettings {
    /// Longest message a transport accepts, in characters.
    pub message_limit: usize,
    /// Largest size accepted by the sized payload commands, in KB.
    pub max_payload_kb: usize,
    /// Channels named in join prompts.
    pub channels: Vec<String>,
    /// Contact shown by `/owner`.
    pub owner: Option<String>,
}

impl Default for RouterSettings {
    fn default() -> Self {
        Self {
            message_limit: 4096,
            max_payload_kb: 64,
            channels: Vec::new(),
            owner: None,
        }
    }
}

/// Routes chat commands and uploads to the license store and payload engine.
pub struct Router {
    licenses: Arc<LicenseStore>,
    policy: Arc<AccessPolicy>,
    settings: RouterSettings,
    started_at: Instant,
}

impl Router {
    pub fn new(
        licenses: Arc<LicenseStore>,
        policy: Arc<AccessPolicy>,
        settings: RouterSettings,
    ) -> Self {
        Self {
            licenses,
            policy,
            settings,
            started_at: Instant::now(),
        }
    }

    pub fn settings(&self) -> &RouterSettings {
        &self.settings
    }

    /// Handle one line of chat text from `principal`.
    pub async fn handle_text(&self, principal: PrincipalId, text: &str) -> Vec<Message> {
        self.dispatch(principal, text).await.render(&self.settings)
    }

    /// Handle a file sent by `principal`.
    pub async fn handle_upload(&self, principal: PrincipalId, upload: Upload) -> Vec<Message> {
        info!(
            principal = %principal,
            size = upload.bytes.len(),
            file_name = upload.file_name.as_deref().unwrap_or("-"),
            "Handling upload"
        );

        let outcome = match self.authorize(principal, Capability::FilePayload).await {
            Some(denied) => denied,
            None => match self.render_upload(&upload) {
                Ok(payload) => Outcome::Payload(payload),
                Err(e) => Outcome::Failed(e),
            },
        };
        outcome.render(&self.settings)
    }

    async fn dispatch(&self, principal: PrincipalId, text: &str) -> Outcome {
        let Some(command) = ParsedCommand::parse(text) else {
            debug!(principal = %principal, "Unrecognized input");
            return Outcome::Unknown;
        };

        info!(principal = %principal, command = ?command.kind, "Handling command");

        if let Some(denied) = self.authorize(principal, command.kind.capability()).await {
            return denied;
        }

        match self.execute(principal, &command).await {
            Ok(outcome) => outcome,
            Err(e) => {
                debug!(principal = %principal, command = ?command.kind, error = %e, "Command failed");
                Outcome::Failed(e)
            }
        }
    }

    /// `None` when authorized, otherwise the outcome to reply with.
    async fn authorize(&self, principal: PrincipalId, capability: Capability) -> Option<Outcome> {
        match self.policy.authorize(principal, capability).await {
            Ok(Decision::Authorized) => None,
            Ok(Decision::Denied(reason)) => {
                info!(principal = %principal, ?capability, ?reason, "Command denied");
                Some(Outcome::Denied(reason))
            }
            Err(e) => Some(Outcome::Failed(e)),
        }
    }

    async fn execute(&self, principal: PrincipalId, command: &ParsedCommand<'_>) -> Result<Outcome> {
        let args = command.args();

        let outcome = match command.kind {
            CommandKind::Start => Outcome::Welcome {
                member: self.policy.verify_membership(principal).await,
            },
            CommandKind::Verify => Outcome::Verified {
                member: self.policy.verify_membership(principal).await,
            },
            CommandKind::Help => Outcome::Text(texts::HELP.to_string()),
            CommandKind::Rules => Outcome::Text(texts::RULES.to_string()),
            CommandKind::Owner => Outcome::Text(texts::owner(self.settings.owner.as_deref())),
            CommandKind::Info => {
                let pending_keys = if self.policy.is_admin(principal) {
                    Some(self.licenses.pending_keys().await?)
                } else {
                    None
                };
                Outcome::Info {
                    uptime: self.started_at.elapsed(),
                    pending_keys,
                }
            }
            CommandKind::Status => self.status(principal).await?,
            CommandKind::IssueKey => {
                let [duration, unit] = args[..] else {
                    return Ok(Outcome::Usage(command.kind));
                };
                let duration: i64 = duration.parse().map_err(|_| {
                    Error::InvalidArgument(format!("duration must be an integer, got '{duration}'"))
                })?;
                let unit: DurationUnit = unit.parse()?;
                Outcome::KeyIssued(self.licenses.issue_key(duration, unit).await?)
            }
            CommandKind::Redeem => {
                let [key] = args[..] else {
                    return Ok(Outcome::Usage(command.kind));
                };
                let expires_at = self.licenses.redeem(principal, &LicenseKey::new(key)).await?;
                Outcome::Redeemed { expires_at }
            }
            CommandKind::QuotedEscapePayload | CommandKind::CArrayPayload => {
                let [size] = args[..] else {
                    return Ok(Outcome::Usage(command.kind));
                };
                let size_kb = self.parse_size(size)?;
                Outcome::Payload(generate_sized(command.kind, size_kb).await?)
            }
            CommandKind::InputPayload => {
                if command.rest.is_empty() {
                    return Ok(Outcome::Usage(command.kind));
                }
                let payload = from_input(command.rest, &mut rand::thread_rng())?;
                self.ensure_single_message(&payload)?;
                Outcome::Payload(payload)
            }
            CommandKind::FilePayload => Outcome::AwaitingUpload,
        };
        Ok(outcome)
    }

    async fn status(&self, principal: PrincipalId) -> Result<Outcome> {
        let entitlement = self.licenses.entitlement(principal).await?;
        let active = match entitlement {
            Some(expires_at) => {
                !(self.licenses.options().enforce_expiry && expires_at.has_passed(Expiry::now()))
            }
            None => false,
        };
        Ok(Outcome::Status {
            entitlement,
            active,
            member: self.policy.verify_membership(principal).await,
        })
    }

    /// Positive integer no larger than the configured maximum.
    fn parse_size(&self, raw: &str) -> Result<usize> {
        let size_kb: usize = raw
            .parse()
            .map_err(|_| Error::InvalidArgument(format!("size must be a positive integer, got '{raw}'")))?;
        if size_kb == 0 {
            return Err(Error::InvalidArgument(
                "size must be a positive integer".to_string(),
            ));
        }
        if size_kb > self.settings.max_payload_kb {
            return Err(Error::PayloadTooLarge {
                size: size_kb,
                limit: self.settings.max_payload_kb,
            });
        }
        Ok(size_kb)
    }

    fn render_upload(&self, upload: &Upload) -> Result<String> {
        let payload = from_upload(upload)?;
        self.ensure_single_message(&payload)?;
        Ok(payload)
    }

    /// Formats C and D are sent as one message or not at all.
    fn ensure_single_message(&self, payload: &str) -> Result<()> {
        let limit = payload_ceiling(self.settings.message_limit);
        let size = payload.chars().count();
        if size > limit {
            return Err(Error::PayloadTooLarge { size, limit });
        }
        Ok(())
    }
}

/// Random payloads of many kilobytes are built off the async runtime.
async fn generate_sized(kind: CommandKind, size_kb: usize) -> Result<String> {
    tokio::task::spawn_blocking(move || {
        let mut rng = rand::thread_rng();
        match kind {
            CommandKind::CArrayPayload => c_array_payload(size_kb, &mut rng),
            _ => quoted_escape_payload(size_kb, &mut rng),
        }
    })
    .await
    .map_err(|e| Error::Internal(format!("payload generation task failed: {e}")))?
}
