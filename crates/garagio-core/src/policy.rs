// ── Adaptive refresh-interval policy ──
//
// Pure state machine over recent poll outcomes. Fast when something is
// failing or a door is moving, slow when the device is healthy and
// static. MAX equals DEFAULT: past the first fast retry the interval
// doubles straight into the ceiling, a two-tier scheme rather than a
// smooth backoff curve.

use std::time::Duration;

use crate::status::Status;

pub const MIN_REFRESH_INTERVAL: Duration = Duration::from_millis(4_000);
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_millis(64_000);
pub const MAX_REFRESH_INTERVAL: Duration = Duration::from_millis(64_000);

/// How many consecutive "moving" polls stay at the minimum interval
/// before the doubling tier takes over.
const FAST_MOVING_POLLS: u32 = 5;

/// Poll-interval state. Owned by the engine; single-writer by
/// construction — at most one poll is ever in flight.
#[derive(Debug)]
pub struct RefreshPolicy {
    error_count: u32,
    moving_count: u32,
    interval: Duration,
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        Self {
            error_count: 0,
            moving_count: 0,
            interval: DEFAULT_REFRESH_INTERVAL,
        }
    }
}

impl RefreshPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one poll outcome into the policy and recompute the interval.
    pub fn apply(&mut self, status: &Status) {
        self.error_count = if status.is_ok() { 0 } else { self.error_count + 1 };
        self.moving_count = if status.is_moving() { self.moving_count + 1 } else { 0 };

        self.interval = if self.error_count == 1
            || (1..=FAST_MOVING_POLLS).contains(&self.moving_count)
        {
            MIN_REFRESH_INTERVAL
        } else if self.error_count > 0 || self.moving_count > 0 {
            (self.interval * 2).min(MAX_REFRESH_INTERVAL)
        } else {
            DEFAULT_REFRESH_INTERVAL
        };
    }

    /// Clear the error and motion counters. The current interval is left
    /// alone; the next [`apply`](Self::apply) recomputes it from the
    /// cleared counters.
    pub fn reset(&mut self) {
        self.error_count = 0;
        self.moving_count = 0;
    }

    /// The wait before the next poll.
    pub fn interval(&self) -> Duration {
        self.interval
    }
}

#[cfg(test)]
mod tests {
    use garagio_api::{DoorState, StatusSnapshot};

    use super::*;

    fn ok_static() -> Status {
        ok_with(DoorState::Closed, DoorState::Closed)
    }

    fn ok_with(door0: DoorState, door1: DoorState) -> Status {
        Status::Ok(StatusSnapshot {
            timestamp: chrono::Utc::now(),
            door0_state: door0,
            door0_age: 10,
            door1_state: door1,
            door1_age: 10,
            temperature: 21.0,
            uptime: 100,
            rssi: -60,
            heap: 20000,
        })
    }

    fn err() -> Status {
        Status::NetworkError("connect refused".into())
    }

    #[test]
    fn healthy_static_device_polls_at_default() {
        let mut policy = RefreshPolicy::new();
        for _ in 0..3 {
            policy.apply(&ok_static());
            assert_eq!(policy.interval(), DEFAULT_REFRESH_INTERVAL);
        }
    }

    #[test]
    fn consecutive_errors_back_off_from_min_to_max() {
        let mut policy = RefreshPolicy::new();

        policy.apply(&err());
        assert_eq!(policy.interval(), Duration::from_millis(4_000));
        policy.apply(&err());
        assert_eq!(policy.interval(), Duration::from_millis(8_000));
        policy.apply(&err());
        assert_eq!(policy.interval(), Duration::from_millis(16_000));
        policy.apply(&err());
        assert_eq!(policy.interval(), Duration::from_millis(32_000));
        policy.apply(&err());
        assert_eq!(policy.interval(), Duration::from_millis(64_000));
        policy.apply(&err());
        assert_eq!(policy.interval(), MAX_REFRESH_INTERVAL);
    }

    #[test]
    fn recovery_after_errors_returns_to_default() {
        let mut policy = RefreshPolicy::new();
        policy.apply(&err());
        policy.apply(&err());
        policy.apply(&ok_static());
        assert_eq!(policy.interval(), DEFAULT_REFRESH_INTERVAL);
    }

    #[test]
    fn moving_door_holds_min_for_five_polls_then_doubles() {
        let mut policy = RefreshPolicy::new();

        for _ in 0..5 {
            policy.apply(&ok_with(DoorState::Opening, DoorState::Closed));
            assert_eq!(policy.interval(), MIN_REFRESH_INTERVAL);
        }
        policy.apply(&ok_with(DoorState::Opening, DoorState::Closed));
        assert_eq!(policy.interval(), Duration::from_millis(8_000));
        policy.apply(&ok_with(DoorState::Opening, DoorState::Closed));
        assert_eq!(policy.interval(), Duration::from_millis(16_000));
    }

    #[test]
    fn either_door_counts_as_moving() {
        let mut policy = RefreshPolicy::new();
        policy.apply(&ok_with(DoorState::Closed, DoorState::Closing));
        assert_eq!(policy.interval(), MIN_REFRESH_INTERVAL);
    }

    #[test]
    fn motion_stopping_returns_to_default() {
        let mut policy = RefreshPolicy::new();
        policy.apply(&ok_with(DoorState::Opening, DoorState::Closed));
        policy.apply(&ok_static());
        assert_eq!(policy.interval(), DEFAULT_REFRESH_INTERVAL);
    }

    #[test]
    fn reset_then_clean_ok_yields_default_not_min() {
        let mut policy = RefreshPolicy::new();
        policy.apply(&err());
        policy.apply(&err());
        assert_eq!(policy.interval(), Duration::from_millis(8_000));

        policy.reset();
        policy.apply(&ok_static());
        assert_eq!(policy.interval(), DEFAULT_REFRESH_INTERVAL);
    }

    #[test]
    fn reset_alone_leaves_the_interval_untouched() {
        let mut policy = RefreshPolicy::new();
        policy.apply(&err());
        policy.reset();
        assert_eq!(policy.interval(), MIN_REFRESH_INTERVAL);
    }

    #[test]
    fn offline_counts_as_an_error_outcome() {
        let mut policy = RefreshPolicy::new();
        policy.apply(&Status::OfflineError);
        assert_eq!(policy.interval(), MIN_REFRESH_INTERVAL);
    }
}
