//! Port traits (hexagonal architecture).
//!
//! These traits define the interfaces between the core domain and external adapters.

use crate::ids::PrincipalId;
use crate::snapshot::Snapshot;
use crate::Result;
use async_trait::async_trait;

/// Durable storage for the license store snapshot.
///
/// Implementations read and write both mappings wholesale. Callers are
/// responsible for serializing writers.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Load the last persisted snapshot. A store that was never written loads empty.
    async fn load(&self) -> Result<Snapshot>;

    /// Replace the persisted snapshot.
    async fn save(&self, snapshot: &Snapshot) -> Result<()>;
}

/// Channel-membership lookup.
#[async_trait]
pub trait MembershipOracle: Send + Sync {
    /// Whether the principal belongs to every required channel.
    ///
    /// Errors are transient lookup failures; callers treat them as "not a member".
    async fn is_member(&self, principal: PrincipalId) -> Result<bool>;

    /// Name used in logs.
    fn name(&self) -> &str;
}
