//! Loop health monitor
//!
//! Counts ticks that ran on stale sensor data and ticks whose processing
//! overran the period. Stale ticks are reported at the start of a run and
//! then once every `report_every` ticks so a disconnected sensor does not
//! flood the log.

/// Outcome of one recorded tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LoopStatus {
    /// Fresh data, within budget
    Ok,
    /// Stale data; report carries the current run length
    Stale(u32),
    /// Stale data, already reported for this run
    StaleQuiet,
}

/// Loop health counters
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LoopMonitor {
    /// Report a stale run once per this many ticks
    report_every: u32,
    /// Consecutive stale ticks
    stale_run: u32,
    /// Total stale ticks
    stale_total: u32,
    /// Ticks whose processing exceeded the period
    overruns: u32,
    /// Longest processing time seen, in microseconds
    worst_elapsed_us: u32,
}

impl LoopMonitor {
    /// Create a monitor
    pub fn new(report_every: u32) -> Self {
        Self {
            report_every: report_every.max(1),
            stale_run: 0,
            stale_total: 0,
            overruns: 0,
            worst_elapsed_us: 0,
        }
    }

    /// Record whether this tick saw fresh sensor data
    pub fn record_sensor(&mut self, fresh: bool) -> LoopStatus {
        if fresh {
            self.stale_run = 0;
            return LoopStatus::Ok;
        }

        self.stale_run = self.stale_run.saturating_add(1);
        self.stale_total = self.stale_total.saturating_add(1);

        if self.stale_run == 1 || self.stale_run % self.report_every == 0 {
            LoopStatus::Stale(self.stale_run)
        } else {
            LoopStatus::StaleQuiet
        }
    }

    /// Record the processing time of one tick
    ///
    /// Returns true if the tick overran its period.
    pub fn record_elapsed(&mut self, elapsed_us: u32, period_us: u32) -> bool {
        self.worst_elapsed_us = self.worst_elapsed_us.max(elapsed_us);

        if elapsed_us > period_us {
            self.overruns = self.overruns.saturating_add(1);
            true
        } else {
            false
        }
    }

    /// Consecutive stale ticks
    pub fn stale_run(&self) -> u32 {
        self.stale_run
    }

    /// Total stale ticks
    pub fn stale_total(&self) -> u32 {
        self.stale_total
    }

    /// Total overruns
    pub fn overruns(&self) -> u32 {
        self.overruns
    }

    /// Longest processing time seen
    pub fn worst_elapsed_us(&self) -> u32 {
        self.worst_elapsed_us
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_ticks() {
        let mut monitor = LoopMonitor::new(250);
        for _ in 0..10 {
            assert_eq!(monitor.record_sensor(true), LoopStatus::Ok);
        }
        assert_eq!(monitor.stale_total(), 0);
    }

    #[test]
    fn test_stale_reports_rate_limited() {
        let mut monitor = LoopMonitor::new(4);
        let reports: usize = (0..12)
            .filter(|_| matches!(monitor.record_sensor(false), LoopStatus::Stale(_)))
            .count();

        // Run lengths 1, 4, 8, 12
        assert_eq!(reports, 4);
        assert_eq!(monitor.stale_run(), 12);
        assert_eq!(monitor.stale_total(), 12);
    }

    #[test]
    fn test_fresh_data_ends_run() {
        let mut monitor = LoopMonitor::new(100);
        assert_eq!(monitor.record_sensor(false), LoopStatus::Stale(1));
        assert_eq!(monitor.record_sensor(false), LoopStatus::StaleQuiet);
        monitor.record_sensor(true);
        assert_eq!(monitor.stale_run(), 0);

        // A new run is reported immediately
        assert_eq!(monitor.record_sensor(false), LoopStatus::Stale(1));
        assert_eq!(monitor.stale_total(), 3);
    }

    #[test]
    fn test_overruns() {
        let mut monitor = LoopMonitor::new(1);
        assert!(!monitor.record_elapsed(3_000, 4_000));
        assert!(!monitor.record_elapsed(4_000, 4_000));
        assert!(monitor.record_elapsed(4_500, 4_000));
        assert_eq!(monitor.overruns(), 1);
        assert_eq!(monitor.worst_elapsed_us(), 4_500);
    }
}
