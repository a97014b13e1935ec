//! Tick deadline clock
//!
//! Keeps an absolute deadline for the next tick so that sleep time equals
//! the period minus the processing time, without accumulating drift.

/// Deadline-driven tick clock (microseconds)
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickClock {
    /// Tick period
    period_us: u64,
    /// Deadline of the current tick
    deadline_us: u64,
    /// Periods skipped because processing ran past them
    skipped: u32,
}

impl TickClock {
    /// Start a clock whose first deadline is one period after `now_us`
    pub fn new(period_us: u32, now_us: u64) -> Self {
        let period_us = (period_us as u64).max(1);
        Self {
            period_us,
            deadline_us: now_us.saturating_add(period_us),
            skipped: 0,
        }
    }

    /// Tick period
    pub fn period_us(&self) -> u64 {
        self.period_us
    }

    /// Deadline of the current tick
    pub fn deadline_us(&self) -> u64 {
        self.deadline_us
    }

    /// Time to sleep before the current deadline, clamped at zero
    pub fn sleep_us(&self, now_us: u64) -> u64 {
        self.deadline_us.saturating_sub(now_us)
    }

    /// Move to the next deadline
    ///
    /// If `now_us` is already past the next deadline, the missed periods
    /// are skipped rather than run back to back. Returns how many were
    /// skipped.
    pub fn advance(&mut self, now_us: u64) -> u32 {
        self.deadline_us = self.deadline_us.saturating_add(self.period_us);

        if now_us < self.deadline_us {
            return 0;
        }

        let behind = now_us - self.deadline_us;
        let missed = behind / self.period_us + 1;
        self.deadline_us = self
            .deadline_us
            .saturating_add(missed.saturating_mul(self.period_us));
        let missed = missed.min(u32::MAX as u64) as u32;
        self.skipped = self.skipped.saturating_add(missed);
        missed
    }

    /// Total periods skipped
    pub fn skipped(&self) -> u32 {
        self.skipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sleep_is_remainder() {
        let clock = TickClock::new(4_000, 0);
        assert_eq!(clock.sleep_us(0), 4_000);
        assert_eq!(clock.sleep_us(1_500), 2_500);
        assert_eq!(clock.sleep_us(4_000), 0);
    }

    #[test]
    fn test_overrun_clamps_to_zero() {
        let clock = TickClock::new(4_000, 0);
        assert_eq!(clock.sleep_us(5_000), 0);
    }

    #[test]
    fn test_no_drift() {
        let mut clock = TickClock::new(4_000, 0);
        // Processing jitter does not shift later deadlines
        for (tick, work) in [300u64, 1_200, 50, 3_900].iter().enumerate() {
            let start = tick as u64 * 4_000 + 4_000;
            assert_eq!(clock.deadline_us(), start);
            assert_eq!(clock.advance(start + work), 0);
        }
        assert_eq!(clock.deadline_us(), 20_000);
    }

    #[test]
    fn test_long_stall_skips_periods() {
        let mut clock = TickClock::new(4_000, 0);
        // Woke at 4 ms, then processing ran until 13 ms
        let skipped = clock.advance(13_000);
        assert_eq!(skipped, 2);
        assert_eq!(clock.deadline_us(), 16_000);
        assert_eq!(clock.skipped(), 2);
    }

    #[test]
    fn test_exact_boundary_skips_one() {
        let mut clock = TickClock::new(4_000, 0);
        assert_eq!(clock.advance(8_000), 1);
        assert_eq!(clock.deadline_us(), 12_000);
    }
}
