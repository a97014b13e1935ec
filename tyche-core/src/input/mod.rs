//! Sensor inputs
//!
//! Snapshots of the raw readings published by the sensor collaborator,
//! and the debounce filter applied to the digital input.

pub mod debounce;

pub use debounce::Debouncer;

/// One set of sensor readings, immutable for the duration of a tick
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorSnapshot {
    /// Angular position in revolutions (multi-turn, may be negative)
    pub angular_position: f32,
    /// Digital input reads closed (button pressed)
    pub input_closed: bool,
    /// Sample counter from the sensor collaborator
    pub sample: u32,
}

impl SensorSnapshot {
    /// Create a snapshot
    pub const fn new(angular_position: f32, input_closed: bool, sample: u32) -> Self {
        Self {
            angular_position,
            input_closed,
            sample,
        }
    }
}

impl Default for SensorSnapshot {
    fn default() -> Self {
        Self::new(0.0, false, 0)
    }
}

