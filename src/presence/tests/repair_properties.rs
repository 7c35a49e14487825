//! Property tests for overlay repair

use chrono::{DateTime, Duration, Utc};
use proptest::prelude::*;
use rubix_presence::{repair_status_at, UserState, UserStatus, OVERLAY_AFTER_ID};

fn fixed_now() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-05-01T12:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

fn expiry_strategy() -> impl Strategy<Value = Option<DateTime<Utc>>> {
    prop::option::of((-600i64..600).prop_map(|offset| fixed_now() + Duration::seconds(offset)))
}

fn overlay_strategy() -> impl Strategy<Value = UserStatus> {
    (
        prop::sample::select(vec!["a", "b", "c", "d"]),
        prop::sample::select(vec!["", "a", "b", "c", "d", "gone", "latest"]),
        0u32..600,
        expiry_strategy(),
    )
        .prop_map(|(id, after, seconds, expiry)| {
            let mut overlay = UserStatus::overlay(id, UserState::Busy)
                .after(after)
                .with_clear_after(seconds);
            overlay.expiry_time = expiry;
            overlay
        })
}

fn status_strategy() -> impl Strategy<Value = UserStatus> {
    (
        any::<bool>(),
        0u32..600,
        expiry_strategy(),
        prop::collection::vec(overlay_strategy(), 0..8),
    )
        .prop_map(|(chained, seconds, expiry, overlays)| {
            let mut status = UserStatus::new(UserState::Away).with_clear_after(seconds);
            if chained {
                status.after_id = OVERLAY_AFTER_ID.to_string();
            }
            status.expiry_time = expiry;
            status.overlays = overlays;
            status
        })
}

proptest! {
    #[test]
    fn prop_repair_is_idempotent(status in status_strategy()) {
        let now = fixed_now();
        let once = repair_status_at(status, now);
        let twice = repair_status_at(once.clone(), now);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_no_expired_overlay_survives(status in status_strategy()) {
        let now = fixed_now();
        let repaired = repair_status_at(status, now);
        for overlay in &repaired.overlays {
            prop_assert!(!overlay.is_overlay_expired_at(now));
        }
    }

    #[test]
    fn prop_overlay_ids_unique(status in status_strategy()) {
        let repaired = repair_status_at(status, fixed_now());
        let mut ids: Vec<&str> = repaired.overlays.iter().map(|o| o.id.as_str()).collect();
        let total = ids.len();
        ids.sort();
        ids.dedup();
        prop_assert_eq!(ids.len(), total);
    }

    #[test]
    fn prop_chained_expiry_is_parent_plus_duration(
        parent_offset in 0i64..600,
        seconds in 0u32..600,
        stale_offset in -60i64..3600,
    ) {
        let now = fixed_now();
        let parent_expiry = now + Duration::seconds(parent_offset);
        let status = UserStatus::default()
            .with_overlay(
                UserStatus::overlay("child", UserState::Away)
                    .after("parent")
                    .with_clear_after(seconds)
                    .with_expiry(now + Duration::seconds(stale_offset.max(0))),
            )
            .with_overlay(UserStatus::overlay("parent", UserState::Busy).with_expiry(parent_expiry));

        let repaired = repair_status_at(status, now);
        let child = repaired.overlays.iter().find(|o| o.id == "child").unwrap();
        prop_assert_eq!(child.expiry_time, Some(parent_expiry + Duration::seconds(i64::from(seconds))));
    }
}
