//! Motor driver traits

use crate::motion::ActuatorCommand;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Motor rotation direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Direction {
    /// Clockwise rotation (positive velocity)
    #[default]
    Clockwise,
    /// Counter-clockwise rotation (negative velocity)
    CounterClockwise,
}

impl Direction {
    /// Direction implied by the sign of a velocity
    pub fn of_velocity(velocity: f32) -> Self {
        if velocity < 0.0 {
            Direction::CounterClockwise
        } else {
            Direction::Clockwise
        }
    }
}

/// Trait for motion actuators driven by velocity commands
///
/// The actuator ramps toward the commanded velocity using the commanded
/// acceleration. The command is issued every tick; implementations should
/// treat a repeated identical command as a no-op.
pub trait MotionActuator {
    /// Set the target velocity (rev/s) and acceleration (rev/s²)
    fn set_velocity_acceleration(&mut self, command: ActuatorCommand);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_of_velocity() {
        assert_eq!(Direction::of_velocity(5.0), Direction::Clockwise);
        assert_eq!(Direction::of_velocity(0.0), Direction::Clockwise);
        assert_eq!(Direction::of_velocity(-0.5), Direction::CounterClockwise);
    }
}
