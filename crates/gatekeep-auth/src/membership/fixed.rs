//! Membership oracle backed by a fixed set of principals.

use async_trait::async_trait;
use gatekeep_core::ports::MembershipOracle;
use gatekeep_core::{PrincipalId, Result};
use std::collections::HashSet;

/// Answers from a fixed member list, or admits everyone.
#[derive(Debug, Clone, Default)]
pub struct StaticMembership {
    members: HashSet<PrincipalId>,
    everyone: bool,
}

impl StaticMembership {
    pub fn new(members: impl IntoIterator<Item = PrincipalId>) -> Self {
        Self {
            members: members.into_iter().collect(),
            everyone: false,
        }
    }

    /// Every principal is a member.
    pub fn everyone() -> Self {
        Self {
            members: HashSet::new(),
            everyone: true,
        }
    }
}

#[async_trait]
impl MembershipOracle for StaticMembership {
    async fn is_member(&self, principal: PrincipalId) -> Result<bool> {
        Ok(self.everyone || self.members.contains(&principal))
    }

    fn name(&self) -> &str {
        "static"
    }
}
