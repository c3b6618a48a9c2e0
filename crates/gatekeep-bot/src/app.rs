//! Wiring configuration into a ready router.

use crate::config::BotConfig;
use crate::router::{Router, RouterSettings};
use gatekeep_auth::{AccessPolicy, BotApiConfig, BotApiMembership, StaticMembership};
use gatekeep_core::ports::{MembershipOracle, SnapshotStore};
use gatekeep_core::{Error, Result};
use gatekeep_licensing::{JsonFileStore, LicenseStore, StoreOptions};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Membership oracle for `config`: the Bot API when channels are
/// configured, otherwise everyone is a member.
pub fn membership_oracle(config: &BotConfig) -> Result<Arc<dyn MembershipOracle>> {
    if config.channels.is_empty() {
        return Ok(Arc::new(StaticMembership::everyone()));
    }
    let token = config
        .bot_token
        .clone()
        .ok_or_else(|| Error::Config("channels are configured but no bot token is set".to_string()))?;
    Ok(Arc::new(BotApiMembership::new(BotApiConfig {
        api_url: config.api_url.clone(),
        token,
        channels: config.channels.clone(),
    })))
}

/// Build a router over an explicit snapshot store and oracle.
pub fn build_router_with(
    config: &BotConfig,
    store: Arc<dyn SnapshotStore>,
    oracle: Arc<dyn MembershipOracle>,
) -> Router {
    let licenses = Arc::new(LicenseStore::with_options(
        store,
        StoreOptions {
            enforce_expiry: config.enforce_entitlement_expiry,
        },
    ));
    let policy = Arc::new(
        AccessPolicy::new(config.admins(), licenses.clone(), oracle)
            .with_membership_timeout(Duration::from_secs(config.membership_timeout_secs)),
    );
    let settings = RouterSettings {
        message_limit: config.message_limit,
        max_payload_kb: config.max_payload_kb,
        channels: config.channels.clone(),
        owner: config.owner.clone(),
    };
    Router::new(licenses, policy, settings)
}

/// Build the production router: JSON files under `data_dir` and the
/// configured membership oracle.
pub fn build_router(config: &BotConfig) -> Result<Router> {
    let oracle = membership_oracle(config)?;
    info!(
        data_dir = %config.data_dir.display(),
        admins = config.admin_ids.len(),
        channels = config.channels.len(),
        oracle = oracle.name(),
        "Starting router"
    );
    let store = Arc::new(JsonFileStore::new(&config.data_dir));
    Ok(build_router_with(config, store, oracle))
}
