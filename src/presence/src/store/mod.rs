//! Presence persistence contract

pub mod memory;

pub use memory::MemoryPresenceStore;

use crate::error::Result;
use crate::status::UserStatus;
use async_trait::async_trait;

/// Stores primary statuses and overlays per (workspace, user).
///
/// Rows are keyed by overlay identifier, the primary using the empty id.
/// Implementations resolve the `"latest"` sentinel at write time, carry
/// chained durations forward when a link is cleared and prune rows whose
/// expiry has elapsed.
#[async_trait]
pub trait PresenceStore: Send + Sync {
    /// Upsert a primary status or overlay; true when a row was written
    async fn set_user_status(&self, workspace: &str, user: &str, status: UserStatus) -> Result<bool>;

    /// Assemble and repair the user's current status
    async fn get_user_status(&self, workspace: &str, user: &str) -> Result<UserStatus>;

    /// Remove one overlay by identifier
    async fn clear_user_status_id(&self, workspace: &str, user: &str, id: &str) -> Result<()>;

    /// Remove every row flagged to clear on logout
    async fn clear_user_status_logout(&self, workspace: &str, user: &str) -> Result<()>;

    /// Remove every row flagged to clear at the end of the day
    async fn clear_user_status_end_of_day(&self, workspace: &str, user: &str) -> Result<()>;
}
