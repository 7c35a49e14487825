//! In-memory presence store

use super::PresenceStore;
use crate::error::{PresenceError, Result};
use crate::status::{UserStatus, LATEST_AFTER_ID, OVERLAY_AFTER_ID};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// (workspace, user)
type StatusKey = (String, String);

/// Rows for one user keyed by overlay id; the primary uses ""
type StatusRows = BTreeMap<String, UserStatus>;

/// In-memory [`PresenceStore`]
#[derive(Default)]
pub struct MemoryPresenceStore {
    statuses: DashMap<StatusKey, StatusRows>,
}

impl MemoryPresenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of users with at least one stored row
    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }

    /// Run `f` against a user's rows, dropping the entry once it is empty
    fn update<R>(&self, workspace: &str, user: &str, f: impl FnOnce(&mut StatusRows) -> R) -> R {
        let key = (workspace.to_string(), user.to_string());
        let result = {
            let mut rows = self.statuses.entry(key.clone()).or_default();
            f(rows.value_mut())
        };
        self.statuses.remove_if(&key, |_, rows| rows.is_empty());
        result
    }
}

fn require(kind: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(PresenceError::InvalidInput(format!("{} is required", kind)));
    }
    Ok(())
}

fn prune_expired(rows: &mut StatusRows, now: DateTime<Utc>) {
    rows.retain(|_, row| !row.is_overlay_expired_at(now));
}

/// Live overlay with the greatest expiry, other than `own_id`
fn latest_overlay(rows: &StatusRows, own_id: &str, now: DateTime<Utc>) -> Option<(String, DateTime<Utc>)> {
    rows.values()
        .filter(|row| !row.is_primary() && row.id != own_id && !row.is_overlay_expired_at(now))
        .filter_map(|row| row.expiry_time.map(|expiry| (row.id.clone(), expiry)))
        .max_by_key(|(_, expiry)| *expiry)
}

/// Expiry of the live parent `after_id`, unless it is the row itself
fn parent_expiry(rows: &StatusRows, after_id: &str, own_id: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    if after_id == own_id {
        return None;
    }
    rows.get(after_id)
        .filter(|parent| !parent.is_primary() && !parent.is_overlay_expired_at(now))
        .and_then(|parent| parent.expiry_time)
}

/// Primary plus overlays in id order
fn assemble(rows: &StatusRows) -> UserStatus {
    let mut status = UserStatus::default();
    for row in rows.values() {
        if row.is_primary() {
            status = UserStatus {
                overlays: std::mem::take(&mut status.overlays),
                ..row.clone()
            };
        } else {
            status.overlays.push(row.clone());
        }
    }
    status
}

/// Persist expiries that repair started or re-derived
fn write_back(rows: &mut StatusRows, status: &UserStatus, workspace: &str, user: &str) {
    if let Some(primary) = rows.get_mut("") {
        if primary.expiry_time.is_none() && status.expiry_time.is_some() {
            primary.expiry_time = status.expiry_time;
            debug!(workspace, user, expiry = ?status.expiry_time, "primary status expiry started");
        }
    }

    for overlay in &status.overlays {
        if let Some(row) = rows.get_mut(&overlay.id) {
            if row.expiry_time != overlay.expiry_time {
                row.expiry_time = overlay.expiry_time;
                debug!(workspace, user, id = %overlay.id, expiry = ?overlay.expiry_time, "overlay expiry persisted");
            }
        }
    }
}

/// Seconds from `now` until `expiry`, clamped at zero
fn seconds_until(expiry: DateTime<Utc>, now: DateTime<Utc>) -> u32 {
    u32::try_from((expiry - now).num_seconds().max(0)).unwrap_or(u32::MAX)
}

#[async_trait]
impl PresenceStore for MemoryPresenceStore {
    async fn set_user_status(&self, workspace: &str, user: &str, status: UserStatus) -> Result<bool> {
        require("workspace", workspace)?;
        require("user", user)?;

        let now = Utc::now();
        let mut row = UserStatus {
            overlays: Vec::new(),
            ..status
        };

        if row.clear_after_seconds == 0 {
            if let Some(expiry) = row.expiry_time {
                row.clear_after_seconds = seconds_until(expiry, now);
            }
        }

        self.update(workspace, user, |rows| {
            if row.after_id == LATEST_AFTER_ID {
                match latest_overlay(rows, &row.id, now) {
                    Some((parent, expiry)) => {
                        row.after_id = parent;
                        row.expiry_from(expiry);
                    }
                    None => {
                        row.after_id.clear();
                        row.expiry_from(now);
                    }
                }
            } else if row.after_id == OVERLAY_AFTER_ID {
                row.expiry_time = None;
            } else if !row.after_id.is_empty() {
                // Chained expiry is the parent's expiry plus this row's duration
                if let Some(expiry) = parent_expiry(rows, &row.after_id, &row.id, now) {
                    row.expiry_from(expiry);
                }
            } else if !row.is_primary() && row.expiry_time.is_none() && row.clear_after_seconds > 0 {
                // Unchained overlays start their clock when applied
                row.expiry_from(now);
            }
            row.applied_time = Some(now);

            debug!(
                workspace,
                user,
                id = %row.id,
                after_id = %row.after_id,
                expiry = ?row.expiry_time,
                state = %row.state,
                "status applied"
            );

            rows.insert(row.id.clone(), row);
            prune_expired(rows, now);
        });

        Ok(true)
    }

    async fn get_user_status(&self, workspace: &str, user: &str) -> Result<UserStatus> {
        let now = Utc::now();
        let key = (workspace.to_string(), user.to_string());

        let status = {
            let Some(mut rows) = self.statuses.get_mut(&key) else {
                return Ok(UserStatus::default());
            };
            prune_expired(rows.value_mut(), now);

            let mut status = assemble(rows.value());
            status.repair_at(now);
            write_back(rows.value_mut(), &status, workspace, user);
            status
        };

        self.statuses.remove_if(&key, |_, rows| rows.is_empty());
        Ok(status)
    }

    async fn clear_user_status_id(&self, workspace: &str, user: &str, id: &str) -> Result<()> {
        require("status id", id)?;

        let now = Utc::now();
        self.update(workspace, user, |rows| {
            if let Some(removed) = rows.remove(id) {
                if removed.clear_after_seconds > 0 {
                    let extension = removed.clear_after();
                    for dependent in rows.values_mut().filter(|row| row.after_id == id) {
                        if let Some(expiry) = dependent.expiry_time {
                            dependent.expiry_time = Some(expiry + extension);
                        }
                    }
                }
                info!(workspace, user, id, "status cleared");
            }
            prune_expired(rows, now);
        });

        Ok(())
    }

    async fn clear_user_status_logout(&self, workspace: &str, user: &str) -> Result<()> {
        self.update(workspace, user, |rows| rows.retain(|_, row| !row.clear_on_logout));
        debug!(workspace, user, "logout statuses cleared");
        Ok(())
    }

    async fn clear_user_status_end_of_day(&self, workspace: &str, user: &str) -> Result<()> {
        self.update(workspace, user, |rows| rows.retain(|_, row| !row.clear_end_of_day));
        debug!(workspace, user, "end of day statuses cleared");
        Ok(())
    }
}
