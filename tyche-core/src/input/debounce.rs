//! Debounced digital input
//!
//! Filters a raw boolean reading into a stable logical level. A new raw
//! level is accepted only after it has been observed unchanged for the
//! configured number of ticks; shorter glitches are ignored entirely.

/// Tick-counting debounce filter
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Debouncer {
    /// Ticks a raw level must hold before it is committed
    window_ticks: u32,
    /// Last committed level
    stable: bool,
    /// Raw level observed on the previous tick (the pending level)
    last_raw: bool,
    /// Ticks since the raw level last changed
    ticks_since_transition: u32,
}

impl Debouncer {
    /// Create a debouncer whose stable level starts at `initial`
    ///
    /// `initial` should be the first raw reading so that startup does not
    /// produce a spurious edge.
    pub fn new(window_ticks: u32, initial: bool) -> Self {
        Self {
            window_ticks,
            stable: initial,
            last_raw: initial,
            ticks_since_transition: 0,
        }
    }

    /// Feed one tick's raw reading
    ///
    /// Returns `Some(level)` on the tick a new stable level is committed,
    /// `None` otherwise. A committed level is reported exactly once.
    pub fn update(&mut self, raw: bool) -> Option<bool> {
        if raw != self.last_raw {
            self.last_raw = raw;
            self.ticks_since_transition = 0;
        } else {
            self.ticks_since_transition = self.ticks_since_transition.saturating_add(1);
        }

        if self.ticks_since_transition >= self.window_ticks && self.last_raw != self.stable {
            self.stable = self.last_raw;
            return Some(self.stable);
        }

        None
    }

    /// Current stable level
    pub fn stable(&self) -> bool {
        self.stable
    }

    /// Ticks since the last raw transition
    pub fn ticks_since_transition(&self) -> u32 {
        self.ticks_since_transition
    }
}
