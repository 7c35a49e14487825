//! Overlay repair
//!
//! Drops expired overlays, re-anchors chained expiries and wakes the
//! primary's own expiry once nothing masks it. Repair is idempotent for a
//! fixed `now` and safe to run on every read.
//!
//! Overlays are held in an arena indexed by identifier while chains are
//! resolved, so a malformed chain that loops back on itself cannot recurse
//! forever: the back-edge parent is treated as absent.

use crate::status::{UserStatus, OVERLAY_AFTER_ID};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    Pending,
    InProgress,
    Done,
}

struct OverlayArena {
    nodes: Vec<UserStatus>,
    index: HashMap<String, usize>,
    visits: Vec<Visit>,
}

impl OverlayArena {
    /// Index live overlays by id; a repeated id replaces the earlier entry
    /// in place.
    fn new(overlays: Vec<UserStatus>) -> Self {
        let mut nodes: Vec<UserStatus> = Vec::with_capacity(overlays.len());
        let mut index = HashMap::with_capacity(overlays.len());

        for overlay in overlays {
            match index.get(&overlay.id) {
                Some(&slot) => nodes[slot] = overlay,
                None => {
                    index.insert(overlay.id.clone(), nodes.len());
                    nodes.push(overlay);
                }
            }
        }

        let visits = vec![Visit::Pending; nodes.len()];
        Self { nodes, index, visits }
    }

    fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Resolve `slot`'s expiry, resolving its parent first
    fn resolve(&mut self, slot: usize, now: DateTime<Utc>) {
        if self.visits[slot] != Visit::Pending {
            return;
        }
        self.visits[slot] = Visit::InProgress;

        let overlay = &self.nodes[slot];
        if overlay.after_id.is_empty() {
            self.visits[slot] = Visit::Done;
            return;
        }

        let parent = self.index.get(&overlay.after_id).copied();
        let parent = match parent {
            Some(parent) if parent != slot => {
                self.resolve(parent, now);
                // Still in progress means we walked a cycle back to it
                (self.visits[parent] == Visit::Done).then_some(parent)
            }
            _ => None,
        };

        match parent {
            Some(parent) => {
                if let Some(parent_expiry) = self.nodes[parent].expiry_time {
                    self.nodes[slot].expiry_from(parent_expiry);
                }
            }
            None => {
                let overlay = &mut self.nodes[slot];
                if overlay.expiry_time.is_none() && overlay.clear_after_seconds > 0 {
                    trace!(id = %overlay.id, after_id = %overlay.after_id, "parent overlay missing, anchoring to now");
                    overlay.expiry_from(now);
                }
            }
        }

        self.visits[slot] = Visit::Done;
    }

    fn resolve_all(mut self, now: DateTime<Utc>) -> Vec<UserStatus> {
        for slot in 0..self.nodes.len() {
            self.resolve(slot, now);
        }
        self.nodes
    }
}

impl UserStatus {
    /// Repair against the current wall-clock time
    pub fn repair(&mut self) {
        self.repair_at(Utc::now());
    }

    /// Repair with expiry decisions taken at `now`
    pub fn repair_at(&mut self, now: DateTime<Utc>) {
        let before = self.overlays.len();
        let live: Vec<UserStatus> = std::mem::take(&mut self.overlays)
            .into_iter()
            .filter(|overlay| !overlay.is_overlay_expired_at(now))
            .collect();

        if live.len() < before {
            trace!(dropped = before - live.len(), "expired overlays removed");
        }

        let arena = OverlayArena::new(live);
        let survivors = arena.len();
        self.overlays = arena.resolve_all(now);

        if self.clear_after_seconds > 0
            && self.after_id == OVERLAY_AFTER_ID
            && self.expiry_time.is_none()
            && survivors == 0
        {
            self.expiry_from(now);
        }
    }
}

/// Repaired copy of `status`
pub fn repair_status(mut status: UserStatus) -> UserStatus {
    status.repair();
    status
}

/// [`repair_status`] at a fixed `now`
pub fn repair_status_at(mut status: UserStatus, now: DateTime<Utc>) -> UserStatus {
    status.repair_at(now);
    status
}
