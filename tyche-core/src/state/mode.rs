//! Two-valued motion mode

/// Motion mode selected by the operator input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Drive the mechanism up to speed
    #[default]
    Accelerate,
    /// Let the mechanism coast to rest
    Decelerate,
}

impl Mode {
    /// Process a confirmed debounced edge and return the next mode
    ///
    /// `closed` is the newly committed input level. Closing the input
    /// while accelerating starts deceleration; opening it while
    /// decelerating resumes acceleration. Every other combination leaves
    /// the mode unchanged, so repeated identical edges are harmless.
    pub fn on_stable_edge(self, closed: bool) -> Self {
        use Mode::*;

        match (self, closed) {
            (Accelerate, true) => Decelerate,
            (Decelerate, false) => Accelerate,
            _ => self,
        }
    }

    /// Check if this mode drives the mechanism
    pub fn is_driving(&self) -> bool {
        matches!(self, Mode::Accelerate)
    }
}
