//! License store: key issuance, redemption and entitlement lookups.

use crate::keygen::generate_key;
use crate::types::{DurationUnit, IssuedKey};
use gatekeep_core::ports::SnapshotStore;
use gatekeep_core::{Error, Expiry, LicenseKey, PrincipalId, Result};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// License store behavior switches.
#[derive(Debug, Clone, Copy)]
pub struct StoreOptions {
    /// Treat entitlements whose expiry has passed as absent.
    pub enforce_expiry: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            enforce_expiry: true,
        }
    }
}

/// License store over an injected snapshot store.
///
/// Every operation holds one mutex across load, modify and save, so
/// concurrent callers never interleave their read-modify-write cycles and
/// never observe a half-written snapshot. Nothing is cached between calls.
pub struct LicenseStore {
    store: Arc<dyn SnapshotStore>,
    lock: Mutex<()>,
    options: StoreOptions,
}

fn key_prefix(key: &LicenseKey) -> &str {
    let s = key.as_str();
    &s[..4.min(s.len())]
}

impl LicenseStore {
    pub fn new(store: Arc<dyn SnapshotStore>) -> Self {
        Self::with_options(store, StoreOptions::default())
    }

    pub fn with_options(store: Arc<dyn SnapshotStore>, options: StoreOptions) -> Self {
        Self {
            store,
            lock: Mutex::new(()),
            options,
        }
    }

    pub fn options(&self) -> StoreOptions {
        self.options
    }

    /// Issue a new key valid for `duration` units from now.
    pub async fn issue_key(&self, duration: i64, unit: DurationUnit) -> Result<IssuedKey> {
        self.issue_key_at(duration, unit, Expiry::now()).await
    }

    /// Issue a new key valid for `duration` units from `now`.
    pub async fn issue_key_at(
        &self,
        duration: i64,
        unit: DurationUnit,
        now: Expiry,
    ) -> Result<IssuedKey> {
        if duration <= 0 {
            return Err(Error::InvalidDuration(duration));
        }
        let expires_at = unit
            .to_days(duration)
            .and_then(|days| now.checked_add_days(days))
            .ok_or(Error::InvalidDuration(duration))?;

        let _guard = self.lock.lock().await;
        let mut snapshot = self.store.load().await?;

        let key = {
            let mut rng = rand::thread_rng();
            loop {
                let candidate = generate_key(&mut rng);
                if !snapshot.keys.contains_key(&candidate) {
                    break candidate;
                }
                debug!("Generated key collided with a pooled key, retrying");
            }
        };

        snapshot.keys.insert(key.clone(), expires_at);
        self.store.save(&snapshot).await?;

        info!(
            key_prefix = key_prefix(&key),
            duration,
            unit = %unit,
            expires_at = %expires_at,
            "License key issued"
        );
        Ok(IssuedKey { key, expires_at })
    }

    /// Redeem a pooled key for `principal`, replacing any previous entitlement.
    ///
    /// Unknown and already redeemed keys both fail with [`Error::KeyNotFound`].
    pub async fn redeem(&self, principal: PrincipalId, key: &LicenseKey) -> Result<Expiry> {
        let _guard = self.lock.lock().await;
        let mut snapshot = self.store.load().await?;

        let Some(expires_at) = snapshot.redeem(principal, key) else {
            warn!(principal = %principal, key_prefix = key_prefix(key), "Redemption of unknown key");
            return Err(Error::KeyNotFound);
        };

        self.store.save(&snapshot).await?;

        info!(
            principal = %principal,
            key_prefix = key_prefix(key),
            expires_at = %expires_at,
            "License key redeemed"
        );
        Ok(expires_at)
    }

    /// Current entitlement record of `principal`, expired or not.
    pub async fn entitlement(&self, principal: PrincipalId) -> Result<Option<Expiry>> {
        let _guard = self.lock.lock().await;
        let snapshot = self.store.load().await?;
        Ok(snapshot.users.get(&principal).copied())
    }

    /// Whether `principal` holds an entitlement.
    pub async fn is_entitled(&self, principal: PrincipalId) -> Result<bool> {
        self.is_entitled_at(principal, Expiry::now()).await
    }

    /// Whether `principal` holds an entitlement at `now`. Expiry is only
    /// checked when [`StoreOptions::enforce_expiry`] is set.
    pub async fn is_entitled_at(&self, principal: PrincipalId, now: Expiry) -> Result<bool> {
        let Some(expires_at) = self.entitlement(principal).await? else {
            return Ok(false);
        };

        if self.options.enforce_expiry && expires_at.has_passed(now) {
            debug!(principal = %principal, expires_at = %expires_at, "Entitlement expired");
            return Ok(false);
        }
        Ok(true)
    }

    /// Number of issued keys waiting to be redeemed.
    pub async fn pending_keys(&self) -> Result<usize> {
        let _guard = self.lock.lock().await;
        Ok(self.store.load().await?.keys.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::MemoryStore;

    fn now() -> Expiry {
        Expiry::parse("2025-01-01 08:00:00").unwrap()
    }

    #[tokio::test]
    async fn test_issue_key_days() {
        let store = LicenseStore::new(Arc::new(MemoryStore::new()));
        let issued = store.issue_key_at(7, DurationUnit::Days, now()).await.unwrap();
        assert_eq!(issued.expires_at.to_string(), "2025-01-08 08:00:00");
        assert_eq!(store.pending_keys().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_issue_key_months() {
        let store = LicenseStore::new(Arc::new(MemoryStore::new()));
        let issued = store
            .issue_key_at(2, DurationUnit::Months, now())
            .await
            .unwrap();
        assert_eq!(issued.expires_at.to_string(), "2025-03-02 08:00:00");
    }

    #[tokio::test]
    async fn test_issue_key_rejects_non_positive_duration() {
        let store = LicenseStore::new(Arc::new(MemoryStore::new()));
        assert!(matches!(
            store.issue_key(0, DurationUnit::Days).await,
            Err(Error::InvalidDuration(0))
        ));
        assert!(matches!(
            store.issue_key(-3, DurationUnit::Months).await,
            Err(Error::InvalidDuration(-3))
        ));
        assert_eq!(store.pending_keys().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_issue_key_rejects_overflowing_duration() {
        let store = LicenseStore::new(Arc::new(MemoryStore::new()));
        assert!(matches!(
            store.issue_key(i64::MAX, DurationUnit::Months).await,
            Err(Error::InvalidDuration(_))
        ));
    }

    #[tokio::test]
    async fn test_expiry_enforcement_switch() {
        let backing = Arc::new(MemoryStore::new());
        let strict = LicenseStore::new(backing.clone());
        let lenient = LicenseStore::with_options(
            backing.clone(),
            StoreOptions {
                enforce_expiry: false,
            },
        );

        let issued = strict.issue_key_at(1, DurationUnit::Days, now()).await.unwrap();
        let principal = PrincipalId::new(10);
        strict.redeem(principal, &issued.key).await.unwrap();

        let later = now().checked_add_days(2).unwrap();
        assert!(strict.is_entitled_at(principal, now()).await.unwrap());
        assert!(!strict.is_entitled_at(principal, later).await.unwrap());
        assert!(lenient.is_entitled_at(principal, later).await.unwrap());
    }
}
