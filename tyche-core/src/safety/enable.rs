//! Enable gate
//!
//! A deadline extended by every feed. Actuation is permitted only while
//! the current time is before the deadline, so a stalled loop disables
//! the actuator within one feed timeout without any other action.

/// Software enable deadline
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EnableGate {
    /// Time (ms) at which actuation stops being permitted
    deadline_ms: Option<u64>,
    /// Number of feeds received
    feeds: u32,
}

impl EnableGate {
    /// Create a gate that starts disabled
    pub const fn new() -> Self {
        Self {
            deadline_ms: None,
            feeds: 0,
        }
    }

    /// Permit actuation until `now_ms + timeout_ms`
    pub fn feed(&mut self, now_ms: u64, timeout_ms: u32) {
        self.deadline_ms = Some(now_ms.saturating_add(timeout_ms as u64));
        self.feeds = self.feeds.wrapping_add(1);
    }

    /// Check if actuation is permitted at `now_ms`
    pub fn is_enabled(&self, now_ms: u64) -> bool {
        matches!(self.deadline_ms, Some(deadline) if now_ms < deadline)
    }

    /// Number of feeds received
    pub fn feeds(&self) -> u32 {
        self.feeds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_disabled() {
        let gate = EnableGate::new();
        assert!(!gate.is_enabled(0));
        assert_eq!(gate.feeds(), 0);
    }

    #[test]
    fn test_feed_enables_until_deadline() {
        let mut gate = EnableGate::new();
        gate.feed(100, 20);

        assert!(gate.is_enabled(100));
        assert!(gate.is_enabled(119));
        assert!(!gate.is_enabled(120));
    }

    #[test]
    fn test_regular_feeds_stay_enabled() {
        let mut gate = EnableGate::new();
        // 4 ms ticks with a 20 ms timeout
        for tick in 0..1000u64 {
            let now = tick * 4;
            gate.feed(now, 20);
            assert!(gate.is_enabled(now + 3));
        }
        assert_eq!(gate.feeds(), 1000);
    }

    #[test]
    fn test_missed_feeds_disable() {
        let mut gate = EnableGate::new();
        gate.feed(0, 20);
        // One missed tick is tolerated
        assert!(gate.is_enabled(8));
        // A real stall is not
        assert!(!gate.is_enabled(20));
    }
}
