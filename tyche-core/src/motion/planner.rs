//! Velocity ramp for velocity/acceleration commands
//!
//! Moves the actual velocity toward the commanded target at the commanded
//! acceleration, giving a trapezoidal velocity profile. The ramp passes
//! through zero when the target reverses direction.

use super::ActuatorCommand;

/// Current motion state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionState {
    /// Motor is stopped
    Stopped,
    /// Speed magnitude is increasing toward target
    Accelerating,
    /// Motor is at target speed
    AtSpeed,
    /// Speed magnitude is decreasing toward target
    Decelerating,
}

/// Velocity ramp state
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct VelocityRamp {
    /// Current velocity in rev/s
    current_rps: f32,
    /// Target velocity in rev/s
    target_rps: f32,
    /// Acceleration in rev/s²
    accel_rps2: f32,
    /// Current motion state
    state: MotionState,
}

impl Default for VelocityRamp {
    fn default() -> Self {
        Self::new()
    }
}

impl VelocityRamp {
    /// Create a stopped ramp
    pub fn new() -> Self {
        Self {
            current_rps: 0.0,
            target_rps: 0.0,
            accel_rps2: 0.0,
            state: MotionState::Stopped,
        }
    }

    /// Set the target velocity and acceleration
    ///
    /// A non-positive or non-finite acceleration keeps the current one;
    /// a non-finite velocity is ignored.
    pub fn set_target(&mut self, command: ActuatorCommand) {
        if command.velocity_rps.is_finite() {
            self.target_rps = command.velocity_rps;
        }
        if command.acceleration_rps2.is_finite() && command.acceleration_rps2 > 0.0 {
            self.accel_rps2 = command.acceleration_rps2;
        }
        self.update_state();
    }

    /// Get the target velocity
    pub fn target(&self) -> f32 {
        self.target_rps
    }

    /// Get the current velocity (may be ramping)
    pub fn current(&self) -> f32 {
        self.current_rps
    }

    /// Get the current motion state
    pub fn state(&self) -> MotionState {
        self.state
    }

    /// Advance the ramp by `delta_ms` and return the new velocity
    pub fn update(&mut self, delta_ms: u32) -> f32 {
        let step = self.accel_rps2 * delta_ms as f32 / 1000.0;

        if self.current_rps < self.target_rps {
            self.current_rps = (self.current_rps + step).min(self.target_rps);
        } else if self.current_rps > self.target_rps {
            self.current_rps = (self.current_rps - step).max(self.target_rps);
        }

        self.update_state();
        self.current_rps
    }

    /// Immediately stop and clear the target
    pub fn emergency_stop(&mut self) {
        self.target_rps = 0.0;
        self.current_rps = 0.0;
        self.state = MotionState::Stopped;
    }

    fn update_state(&mut self) {
        let current = magnitude(self.current_rps);
        let target = magnitude(self.target_rps);
        let same_side = (self.current_rps >= 0.0) == (self.target_rps >= 0.0);

        self.state = if self.current_rps == self.target_rps {
            if self.current_rps == 0.0 {
                MotionState::Stopped
            } else {
                MotionState::AtSpeed
            }
        } else if same_side && current < target {
            MotionState::Accelerating
        } else {
            MotionState::Decelerating
        };
    }
}

fn magnitude(v: f32) -> f32 {
    if v < 0.0 {
        -v
    } else {
        v
    }
}
