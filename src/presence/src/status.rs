//! User status and overlay types

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// `afterId` sentinel: chain after the most recently applied overlay
pub const LATEST_AFTER_ID: &str = "latest";

/// `afterId` sentinel: chain to the primary status
pub const OVERLAY_AFTER_ID: &str = "overlay";

/// Presence state shown for a user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserState {
    #[default]
    Online,
    Offline,
    Away,
    Busy,
    Hiatus,
    Active,
}

impl UserState {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserState::Online => "online",
            UserState::Offline => "offline",
            UserState::Away => "away",
            UserState::Busy => "busy",
            UserState::Hiatus => "hiatus",
            UserState::Active => "active",
        }
    }
}

impl std::fmt::Display for UserState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn is_zero(value: &u32) -> bool {
    *value == 0
}

/// A user's primary status, or one overlay layered on top of it.
///
/// The primary has an empty `id`. Overlays carry an identifier and may chain
/// after another overlay through `after_id`, in which case their expiry is
/// always the parent's expiry plus their own duration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserStatus {
    pub name: String,
    pub icon: String,
    pub state: UserState,
    pub extended_state: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub applied_time: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_time: Option<DateTime<Utc>>,

    /// Lifetime in seconds; 0 means no automatic clear
    #[serde(skip_serializing_if = "is_zero")]
    pub clear_after_seconds: u32,

    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub clear_end_of_day: bool,

    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub clear_on_logout: bool,

    /// Overlay identifier; empty for the primary
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,

    /// Parent overlay, or one of [`LATEST_AFTER_ID`] / [`OVERLAY_AFTER_ID`]
    #[serde(skip_serializing_if = "String::is_empty")]
    pub after_id: String,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub overlays: Vec<UserStatus>,
}

impl UserStatus {
    pub fn new(state: UserState) -> Self {
        Self {
            state,
            ..Default::default()
        }
    }

    /// An overlay identified by `id`
    pub fn overlay(id: impl Into<String>, state: UserState) -> Self {
        Self {
            id: id.into(),
            state,
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    pub fn with_extended_state(mut self, extended: impl Into<String>) -> Self {
        self.extended_state = extended.into();
        self
    }

    pub fn with_clear_after(mut self, seconds: u32) -> Self {
        self.clear_after_seconds = seconds;
        self
    }

    pub fn with_expiry(mut self, expiry: DateTime<Utc>) -> Self {
        self.expiry_time = Some(expiry);
        self
    }

    pub fn after(mut self, after_id: impl Into<String>) -> Self {
        self.after_id = after_id.into();
        self
    }

    pub fn clear_on_logout(mut self) -> Self {
        self.clear_on_logout = true;
        self
    }

    pub fn clear_end_of_day(mut self) -> Self {
        self.clear_end_of_day = true;
        self
    }

    pub fn with_overlay(mut self, overlay: UserStatus) -> Self {
        self.overlays.push(overlay);
        self
    }

    pub fn is_primary(&self) -> bool {
        self.id.is_empty()
    }

    pub(crate) fn clear_after(&self) -> Duration {
        Duration::seconds(i64::from(self.clear_after_seconds))
    }

    /// Set the expiry to `at` plus this status' own duration
    pub fn expiry_from(&mut self, at: DateTime<Utc>) {
        self.expiry_time = Some(at + self.clear_after());
    }

    /// True when an expiry is set and lies strictly before `now`
    pub fn is_overlay_expired_at(&self, now: DateTime<Utc>) -> bool {
        matches!(self.expiry_time, Some(expiry) if expiry < now)
    }

    /// The most recently applied overlay, if any
    pub fn active_overlay(&self) -> Option<&UserStatus> {
        self.overlays.iter().max_by_key(|o| o.applied_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialization_omits_empty_fields() {
        let status = UserStatus::new(UserState::Away).with_name("Lunch");
        let json = serde_json::to_value(&status).unwrap();

        assert_eq!(json["state"], "away");
        assert_eq!(json["name"], "Lunch");
        assert!(json.get("id").is_none());
        assert!(json.get("expiryTime").is_none());
        assert!(json.get("clearAfterSeconds").is_none());
        assert!(json.get("overlays").is_none());
    }

    #[test]
    fn test_overlay_quartet_roundtrip() {
        let expiry = Utc::now();
        let status = UserStatus::new(UserState::Online).with_overlay(
            UserStatus::overlay("busy", UserState::Busy)
                .after("meeting")
                .with_clear_after(90)
                .with_expiry(expiry),
        );

        let json = serde_json::to_string(&status).unwrap();
        assert!(json.contains("\"afterId\":\"meeting\""));
        assert!(json.contains("\"clearAfterSeconds\":90"));

        let back: UserStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, status);
    }

    #[test]
    fn test_expiry_helpers() {
        let now = Utc::now();
        let mut overlay = UserStatus::overlay("a", UserState::Busy).with_clear_after(30);
        assert!(!overlay.is_overlay_expired_at(now));

        overlay.expiry_from(now);
        assert_eq!(overlay.expiry_time, Some(now + Duration::seconds(30)));
        assert!(!overlay.is_overlay_expired_at(now));
        assert!(overlay.is_overlay_expired_at(now + Duration::seconds(31)));
    }

    #[test]
    fn test_active_overlay_is_latest_applied() {
        let now = Utc::now();
        let mut first = UserStatus::overlay("first", UserState::Away);
        first.applied_time = Some(now - Duration::minutes(5));
        let mut second = UserStatus::overlay("second", UserState::Busy);
        second.applied_time = Some(now);

        let status = UserStatus::default().with_overlay(second).with_overlay(first);
        assert_eq!(status.active_overlay().map(|o| o.id.as_str()), Some("second"));
        assert!(UserStatus::default().active_overlay().is_none());
    }
}
