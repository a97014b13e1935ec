//! Actuator enable feed trait

/// Periodic heartbeat that keeps the actuator energized
///
/// Each call permits actuation for `timeout_ms` from now. If no further
/// call arrives before that deadline, the implementation must disable the
/// actuator on its own, independent of any software state.
pub trait EnableFeed {
    /// Extend the enable deadline
    fn feed(&mut self, timeout_ms: u32);
}
