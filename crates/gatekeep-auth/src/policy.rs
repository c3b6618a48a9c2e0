//! Capability-based access decisions.

use gatekeep_core::ports::MembershipOracle;
use gatekeep_core::{Error, PrincipalId, Result};
use gatekeep_licensing::LicenseStore;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Default bound on a single membership lookup.
pub const DEFAULT_MEMBERSHIP_TIMEOUT: Duration = Duration::from_secs(5);

/// Something a principal may be allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Issue license keys.
    IssueKey,
    /// Redeem a license key.
    Redeem,
    /// Generate a sized random payload.
    SizedPayload,
    /// Generate a payload from supplied text or hex.
    InputPayload,
    /// Generate a payload from an uploaded file.
    FilePayload,
    /// Informational commands.
    Public,
}

/// A single check a capability requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Admin,
    Entitlement,
    Membership,
}

impl Capability {
    /// Checks in evaluation order; the first failing one decides the denial.
    pub fn requirements(self) -> &'static [Requirement] {
        match self {
            Capability::IssueKey => &[Requirement::Admin],
            Capability::Redeem => &[Requirement::Membership],
            Capability::SizedPayload | Capability::InputPayload | Capability::FilePayload => {
                &[Requirement::Entitlement, Requirement::Membership]
            }
            Capability::Public => &[],
        }
    }
}

/// Why access was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    NotAdmin,
    EntitlementRequired,
    MembershipRequired,
}

impl From<DenyReason> for Error {
    fn from(reason: DenyReason) -> Self {
        match reason {
            DenyReason::NotAdmin => Error::NotAdmin,
            DenyReason::EntitlementRequired => Error::EntitlementRequired,
            DenyReason::MembershipRequired => Error::MembershipRequired,
        }
    }
}

/// Outcome of an authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Authorized,
    Denied(DenyReason),
}

impl Decision {
    pub fn is_authorized(self) -> bool {
        matches!(self, Decision::Authorized)
    }

    /// Convert into a `Result`, mapping a denial to its error.
    pub fn into_result(self) -> Result<()> {
        match self {
            Decision::Authorized => Ok(()),
            Decision::Denied(reason) => Err(reason.into()),
        }
    }
}

/// Access policy over the admin list, license store and membership oracle.
pub struct AccessPolicy {
    admins: HashSet<PrincipalId>,
    licenses: Arc<LicenseStore>,
    oracle: Arc<dyn MembershipOracle>,
    membership_timeout: Duration,
}

impl AccessPolicy {
    pub fn new(
        admins: impl IntoIterator<Item = PrincipalId>,
        licenses: Arc<LicenseStore>,
        oracle: Arc<dyn MembershipOracle>,
    ) -> Self {
        Self {
            admins: admins.into_iter().collect(),
            licenses,
            oracle,
            membership_timeout: DEFAULT_MEMBERSHIP_TIMEOUT,
        }
    }

    /// Set the bound on a single membership lookup.
    pub fn with_membership_timeout(mut self, timeout: Duration) -> Self {
        self.membership_timeout = timeout;
        self
    }

    pub fn is_admin(&self, principal: PrincipalId) -> bool {
        self.admins.contains(&principal)
    }

    /// Ask the oracle, failing closed on error or timeout.
    pub async fn verify_membership(&self, principal: PrincipalId) -> bool {
        match tokio::time::timeout(self.membership_timeout, self.oracle.is_member(principal)).await
        {
            Ok(Ok(member)) => member,
            Ok(Err(e)) => {
                warn!(
                    principal = %principal,
                    oracle = self.oracle.name(),
                    error = %e,
                    "Membership lookup failed, denying"
                );
                false
            }
            Err(_) => {
                warn!(
                    principal = %principal,
                    oracle = self.oracle.name(),
                    timeout_ms = self.membership_timeout.as_millis() as u64,
                    "Membership lookup timed out, denying"
                );
                false
            }
        }
    }

    /// Decide whether `principal` may use `capability`.
    ///
    /// Errors only come from reading the license store.
    pub async fn authorize(
        &self,
        principal: PrincipalId,
        capability: Capability,
    ) -> Result<Decision> {
        for requirement in capability.requirements() {
            let satisfied = match requirement {
                Requirement::Admin => self.is_admin(principal),
                Requirement::Entitlement => self.licenses.is_entitled(principal).await?,
                Requirement::Membership => self.verify_membership(principal).await,
            };

            if !satisfied {
                let reason = match requirement {
                    Requirement::Admin => DenyReason::NotAdmin,
                    Requirement::Entitlement => DenyReason::EntitlementRequired,
                    Requirement::Membership => DenyReason::MembershipRequired,
                };
                debug!(principal = %principal, ?capability, ?reason, "Access denied");
                return Ok(Decision::Denied(reason));
            }
        }
        Ok(Decision::Authorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requirements() {
        assert_eq!(Capability::IssueKey.requirements(), &[Requirement::Admin]);
        assert_eq!(Capability::Redeem.requirements(), &[Requirement::Membership]);
        assert_eq!(
            Capability::SizedPayload.requirements(),
            &[Requirement::Entitlement, Requirement::Membership]
        );
        assert!(Capability::Public.requirements().is_empty());
    }

    #[test]
    fn test_decision_into_result() {
        assert!(Decision::Authorized.into_result().is_ok());
        assert!(matches!(
            Decision::Denied(DenyReason::NotAdmin).into_result(),
            Err(Error::NotAdmin)
        ));
    }
}
