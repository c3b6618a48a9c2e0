//! Durable state of the license store.

use crate::expiry::Expiry;
use crate::ids::{LicenseKey, PrincipalId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Both mappings of the license store, loaded and saved as a unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Redeemed entitlements.
    #[serde(default)]
    pub users: BTreeMap<PrincipalId, Expiry>,
    /// Issued keys that have not been redeemed yet.
    #[serde(default)]
    pub keys: BTreeMap<LicenseKey, Expiry>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves a pooled key onto the principal's entitlement.
    ///
    /// Returns the granted expiry, or `None` if the key is not pooled, in
    /// which case the snapshot is left untouched.
    pub fn redeem(&mut self, principal: PrincipalId, key: &LicenseKey) -> Option<Expiry> {
        let expires_at = self.keys.remove(key)?;
        self.users.insert(principal, expires_at);
        Some(expires_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn expiry(s: &str) -> Expiry {
        Expiry::parse(s).unwrap()
    }

    #[test]
    fn test_redeem_moves_key() {
        let mut snapshot = Snapshot::new();
        let key = LicenseKey::new("abcDEF12345");
        snapshot.keys.insert(key.clone(), expiry("2030-01-01 00:00:00"));

        let granted = snapshot.redeem(PrincipalId::new(7), &key);

        assert_eq!(granted, Some(expiry("2030-01-01 00:00:00")));
        assert!(snapshot.keys.is_empty());
        assert_eq!(
            snapshot.users.get(&PrincipalId::new(7)),
            Some(&expiry("2030-01-01 00:00:00"))
        );
    }

    #[test]
    fn test_redeem_overwrites_previous_entitlement() {
        let mut snapshot = Snapshot::new();
        let principal = PrincipalId::new(7);
        snapshot.users.insert(principal, expiry("2040-01-01 00:00:00"));
        let key = LicenseKey::new("shorterKey1");
        snapshot.keys.insert(key.clone(), expiry("2030-01-01 00:00:00"));

        snapshot.redeem(principal, &key);

        assert_eq!(snapshot.users[&principal], expiry("2030-01-01 00:00:00"));
    }

    #[test]
    fn test_redeem_unknown_key_is_noop() {
        let mut snapshot = Snapshot::new();
        snapshot.keys.insert(LicenseKey::new("a"), expiry("2030-01-01 00:00:00"));
        let before = snapshot.clone();

        assert!(snapshot.redeem(PrincipalId::new(1), &LicenseKey::new("b")).is_none());
        assert_eq!(snapshot, before);
    }

    #[test]
    fn test_snapshot_json_shape() {
        let mut snapshot = Snapshot::new();
        snapshot.users.insert(PrincipalId::new(99), expiry("2030-05-06 07:08:09"));
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["users"]["99"], "2030-05-06 07:08:09");
    }
}
