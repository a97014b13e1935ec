//! Motion commands
//!
//! The actuator command chosen every tick and the velocity ramp that
//! executes it on the motor side.

pub mod planner;

pub use planner::{MotionState, VelocityRamp};

use crate::state::Mode;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Target velocity and the acceleration used to reach it
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ActuatorCommand {
    /// Target velocity in revolutions per second
    pub velocity_rps: f32,
    /// Acceleration in revolutions per second squared
    pub acceleration_rps2: f32,
}

impl ActuatorCommand {
    /// Default drive profile: 5 rev/s at 10 rev/s²
    pub const DRIVE: Self = Self::new(5.0, 10.0);

    /// Default hold profile: stop at 0.25 rev/s²
    pub const HOLD: Self = Self::new(0.0, 0.25);

    /// Create a command
    pub const fn new(velocity_rps: f32, acceleration_rps2: f32) -> Self {
        Self {
            velocity_rps,
            acceleration_rps2,
        }
    }
}

/// The two canonical commands, selected by mode
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotionProfiles {
    /// Command while accelerating
    pub drive: ActuatorCommand,
    /// Command while decelerating
    pub hold: ActuatorCommand,
}

impl Default for MotionProfiles {
    fn default() -> Self {
        Self {
            drive: ActuatorCommand::DRIVE,
            hold: ActuatorCommand::HOLD,
        }
    }
}

impl MotionProfiles {
    /// Create a profile pair
    pub const fn new(drive: ActuatorCommand, hold: ActuatorCommand) -> Self {
        Self { drive, hold }
    }

    /// Select the command for a mode
    pub fn select(&self, mode: Mode) -> ActuatorCommand {
        match mode {
            Mode::Accelerate => self.drive,
            Mode::Decelerate => self.hold,
        }
    }
}
