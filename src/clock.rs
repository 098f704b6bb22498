//! Gravity timer: fixed period, restarted whenever the engine state it was armed for changes.

use std::time::{Duration, Instant};

/// Gravity period. Constant; there is no level-based speed-up.
pub const GRAVITY_PERIOD: Duration = Duration::from_millis(800);

#[derive(Debug, Clone)]
pub struct GravityTimer {
    period: Duration,
    armed_at: Instant,
    /// Engine revision the timer was armed for.
    revision: u64,
}

impl GravityTimer {
    pub fn new(now: Instant, revision: u64) -> Self {
        Self::with_period(GRAVITY_PERIOD, now, revision)
    }

    fn with_period(period: Duration, now: Instant, revision: u64) -> Self {
        Self {
            period,
            armed_at: now,
            revision,
        }
    }

    /// Re-arm from `now`.
    pub fn restart(&mut self, now: Instant) {
        self.armed_at = now;
    }

    /// Re-arm if the engine changed since the timer was armed, so a stale
    /// countdown never fires on a replaced piece.
    pub fn observe(&mut self, revision: u64, now: Instant) {
        if revision != self.revision {
            self.revision = revision;
            self.restart(now);
        }
    }

    pub fn is_due(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.armed_at) >= self.period
    }

    /// Time left before the next gravity step (zero if due).
    pub fn remaining(&self, now: Instant) -> Duration {
        self.period
            .saturating_sub(now.saturating_duration_since(self.armed_at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_after_period() {
        let t0 = Instant::now();
        let timer = GravityTimer::new(t0, 0);
        assert!(!timer.is_due(t0));
        assert!(!timer.is_due(t0 + Duration::from_millis(799)));
        assert!(timer.is_due(t0 + GRAVITY_PERIOD));
        assert_eq!(timer.remaining(t0 + Duration::from_millis(300)), Duration::from_millis(500));
        assert_eq!(timer.remaining(t0 + Duration::from_secs(5)), Duration::ZERO);
    }

    #[test]
    fn test_revision_change_restarts() {
        let t0 = Instant::now();
        let mut timer = GravityTimer::new(t0, 3);
        let t1 = t0 + Duration::from_millis(600);
        timer.observe(4, t1);
        assert!(!timer.is_due(t0 + GRAVITY_PERIOD));
        assert!(timer.is_due(t1 + GRAVITY_PERIOD));
    }

    #[test]
    fn test_same_revision_keeps_countdown() {
        let t0 = Instant::now();
        let mut timer = GravityTimer::new(t0, 3);
        timer.observe(3, t0 + Duration::from_millis(600));
        assert!(timer.is_due(t0 + GRAVITY_PERIOD));
    }

    #[test]
    fn test_custom_period() {
        let t0 = Instant::now();
        let mut timer = GravityTimer::with_period(Duration::from_millis(10), t0, 0);
        assert!(timer.is_due(t0 + Duration::from_millis(10)));
        timer.restart(t0 + Duration::from_millis(10));
        assert!(!timer.is_due(t0 + Duration::from_millis(19)));
    }
}
