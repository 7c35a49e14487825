//! Per-request context snapshot

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;

/// Globally unique application identifier (vendor + app)
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalAppId {
    pub vendor_id: String,
    pub app_id: String,
}

impl GlobalAppId {
    pub fn new(vendor_id: impl Into<String>, app_id: impl Into<String>) -> Self {
        Self {
            vendor_id: vendor_id.into(),
            app_id: app_id.into(),
        }
    }
}

/// Facts about the current request that access conditions are evaluated against.
///
/// Built once per request and treated as an immutable value; never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lookup {
    /// Workspace the request is made in
    pub workspace: String,

    /// Acting user
    pub user: String,

    /// Application making the request
    #[serde(default)]
    pub app: GlobalAppId,

    /// Geographic location code (e.g. "GB")
    #[serde(default)]
    pub geo_location: String,

    /// Client network address, if known
    #[serde(default)]
    pub ip_address: Option<IpAddr>,

    /// Multi-factor authentication was satisfied this session
    #[serde(default)]
    pub mfa: bool,

    /// The account has been verified
    #[serde(default)]
    pub verified_account: bool,

    /// When the session was issued
    #[serde(default)]
    pub session_issued: Option<DateTime<Utc>>,
}

impl Lookup {
    /// Create a lookup for a workspace/user pair
    pub fn new(workspace: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            workspace: workspace.into(),
            user: user.into(),
            ..Default::default()
        }
    }

    pub fn with_app(mut self, app: GlobalAppId) -> Self {
        self.app = app;
        self
    }

    pub fn with_location(mut self, geo_location: impl Into<String>) -> Self {
        self.geo_location = geo_location.into();
        self
    }

    pub fn with_ip(mut self, ip_address: IpAddr) -> Self {
        self.ip_address = Some(ip_address);
        self
    }

    pub fn with_mfa(mut self, mfa: bool) -> Self {
        self.mfa = mfa;
        self
    }

    pub fn with_verified_account(mut self, verified: bool) -> Self {
        self.verified_account = verified;
        self
    }

    pub fn with_session_issued(mut self, issued: DateTime<Utc>) -> Self {
        self.session_issued = Some(issued);
        self
    }

    /// Seconds elapsed since the session was issued, measured at `now`.
    ///
    /// Returns `None` when the issuance time is unknown.
    pub fn session_age_seconds(&self, now: DateTime<Utc>) -> Option<i64> {
        self.session_issued.map(|issued| now.timestamp() - issued.timestamp())
    }
}

impl fmt::Display for Lookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}---{}---{}---{}",
            self.workspace, self.user, self.app.vendor_id, self.app.app_id
        )
    }
}
