//! # Rubix Presence
//!
//! A user's displayed status: a primary status plus time-bounded overlays
//! that can chain after one another. Expired overlays are collected and
//! chained expiries re-anchored by [`UserStatus::repair`], which stores run
//! on every read.
//!
//! ## Example
//!
//! ```rust
//! use chrono::{Duration, Utc};
//! use rubix_presence::{repair_status_at, UserState, UserStatus};
//!
//! let now = Utc::now();
//! let status = UserStatus::new(UserState::Online)
//!     .with_overlay(UserStatus::overlay("meeting", UserState::Busy).with_expiry(now + Duration::minutes(30)))
//!     .with_overlay(UserStatus::overlay("focus", UserState::Busy).after("meeting").with_clear_after(600));
//!
//! let repaired = repair_status_at(status, now);
//! assert_eq!(
//!     repaired.overlays[1].expiry_time,
//!     Some(now + Duration::minutes(30) + Duration::seconds(600))
//! );
//! ```

pub mod error;
pub mod repair;
pub mod status;
pub mod store;

pub use error::{PresenceError, Result};
pub use repair::{repair_status, repair_status_at};
pub use status::{UserState, UserStatus, LATEST_AFTER_ID, OVERLAY_AFTER_ID};
pub use store::{MemoryPresenceStore, PresenceStore};
