//! Access condition definition

use serde::{Deserialize, Serialize};

/// Declarative access policy attached to a role or workspace.
///
/// All clauses are independent and must all pass. An empty list or a zero
/// value leaves its clause unconstrained. Edits replace the whole value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Condition {
    /// Multi-factor authentication must have been satisfied this session
    #[serde(rename = "requireMFA")]
    pub require_mfa: bool,

    /// The account must be verified
    #[serde(rename = "requireVerifiedAccount")]
    pub require_verified_account: bool,

    /// Maximum session age in seconds (0 = unbounded)
    #[serde(rename = "maxSessionAgeSeconds")]
    pub max_session_age_seconds: u64,

    /// Location codes the request must come from
    #[serde(rename = "allowedLocations")]
    pub allowed_locations: Vec<String>,

    /// Location codes the request must not come from
    #[serde(rename = "blockedLocations")]
    pub blocked_locations: Vec<String>,

    /// Named IP groups the client address must belong to
    #[serde(rename = "allowedIPGroups")]
    pub allowed_ip_groups: Vec<String>,

    /// Named IP groups the client address must not belong to
    #[serde(rename = "blockedIPGroups")]
    pub blocked_ip_groups: Vec<String>,
}

impl Condition {
    /// Create an unrestricted condition
    pub fn new() -> Self {
        Self::default()
    }

    pub fn require_mfa(mut self) -> Self {
        self.require_mfa = true;
        self
    }

    pub fn require_verified_account(mut self) -> Self {
        self.require_verified_account = true;
        self
    }

    pub fn with_max_session_age(mut self, seconds: u64) -> Self {
        self.max_session_age_seconds = seconds;
        self
    }

    pub fn allow_locations<I, S>(mut self, locations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_locations.extend(locations.into_iter().map(Into::into));
        self
    }

    pub fn block_locations<I, S>(mut self, locations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.blocked_locations.extend(locations.into_iter().map(Into::into));
        self
    }

    pub fn allow_ip_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_ip_groups.extend(groups.into_iter().map(Into::into));
        self
    }

    pub fn block_ip_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.blocked_ip_groups.extend(groups.into_iter().map(Into::into));
        self
    }

    /// True when no clause constrains the request
    pub fn is_unrestricted(&self) -> bool {
        !self.require_mfa
            && !self.require_verified_account
            && self.max_session_age_seconds == 0
            && self.allowed_locations.is_empty()
            && self.blocked_locations.is_empty()
            && self.allowed_ip_groups.is_empty()
            && self.blocked_ip_groups.is_empty()
    }
}
