//! Membership lookups against a Bot-API style `getChatMember` endpoint.

use super::is_member_status;
use async_trait::async_trait;
use gatekeep_core::ports::MembershipOracle;
use gatekeep_core::{Error, PrincipalId, Result};
use serde::Deserialize;
use tracing::debug;

/// Bot API connection settings.
#[derive(Debug, Clone)]
pub struct BotApiConfig {
    /// API base URL.
    pub api_url: String,
    /// Bot token.
    pub token: String,
    /// Channels the principal must belong to, by public username or chat id.
    pub channels: Vec<String>,
}

impl Default for BotApiConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.telegram.org".to_string(),
            token: String::new(),
            channels: Vec::new(),
        }
    }
}

/// Membership oracle that requires membership in every configured channel.
pub struct BotApiMembership {
    config: BotApiConfig,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatMember {
    status: String,
}

/// Public usernames are addressed as `@name`; numeric ids pass through.
fn chat_id(channel: &str) -> String {
    if channel.starts_with('@') || channel.parse::<i64>().is_ok() {
        channel.to_string()
    } else {
        format!("@{}", channel)
    }
}

impl BotApiMembership {
    pub fn new(config: BotApiConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    async fn member_status(&self, channel: &str, principal: PrincipalId) -> Result<String> {
        let url = format!(
            "{}/bot{}/getChatMember",
            self.config.api_url.trim_end_matches('/'),
            self.config.token
        );

        let response = self
            .client
            .get(&url)
            .query(&[
                ("chat_id", chat_id(channel)),
                ("user_id", principal.to_string()),
            ])
            .send()
            .await
            .map_err(|e| Error::Membership(e.without_url().to_string()))?;

        let body: ApiResponse<ChatMember> = response
            .json()
            .await
            .map_err(|e| Error::Membership(e.without_url().to_string()))?;

        match (body.ok, body.result) {
            (true, Some(member)) => Ok(member.status),
            _ => Err(Error::Membership(
                body.description
                    .unwrap_or_else(|| "getChatMember failed".to_string()),
            )),
        }
    }
}

#[async_trait]
impl MembershipOracle for BotApiMembership {
    async fn is_member(&self, principal: PrincipalId) -> Result<bool> {
        for channel in &self.config.channels {
            let status = self.member_status(channel, principal).await?;
            debug!(principal = %principal, channel = %channel, status = %status, "Chat member status");
            if !is_member_status(&status) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn name(&self) -> &str {
        "bot-api"
    }
}
