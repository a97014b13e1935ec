//! Hardware configuration types
//!
//! Motor driver settings applied once at startup. Pin assignments are
//! board constants in the firmware and do not appear here.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Largest microstep setting supported by the driver
pub const MAX_MICROSTEPS: u16 = 256;

/// Stepper motor and TMC2209 driver configuration
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MotorHwConfig {
    /// Full steps per motor rotation (typically 200 for 1.8° motors)
    pub full_steps_per_rotation: u16,
    /// Microsteps setting (power of two, 1-256)
    pub microsteps: u16,
    /// Run current in mA
    pub run_current_ma: u16,
    /// Hold current in mA
    pub hold_current_ma: u16,
    /// Enable StealthChop mode
    pub stealthchop: bool,
    /// UART address (0-3 for multi-driver bus)
    pub uart_address: u8,
    /// Configuration attempts at startup before giving up
    pub config_attempts: u8,
    /// Velocity ceiling in rev/s
    pub max_velocity_rps: f32,
}

impl Default for MotorHwConfig {
    fn default() -> Self {
        Self {
            full_steps_per_rotation: 200,
            microsteps: 16,
            run_current_ma: 800,
            hold_current_ma: 400,
            stealthchop: true,
            uart_address: 0,
            config_attempts: 6,
            max_velocity_rps: 10.0,
        }
    }
}

impl MotorHwConfig {
    /// Microsteps per output revolution
    pub fn steps_per_rev(&self) -> u32 {
        self.full_steps_per_rotation as u32 * self.microsteps as u32
    }

    /// Step frequency for a velocity in rev/s (magnitude only)
    pub fn step_hz(&self, velocity_rps: f32) -> u32 {
        let v = if velocity_rps < 0.0 {
            -velocity_rps
        } else {
            velocity_rps
        };
        (v * self.steps_per_rev() as f32) as u32
    }

    /// Check the microstep setting is a supported power of two
    pub fn microsteps_valid(&self) -> bool {
        self.microsteps.is_power_of_two() && self.microsteps <= MAX_MICROSTEPS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steps_per_rev() {
        let motor = MotorHwConfig::default();
        assert_eq!(motor.steps_per_rev(), 3200);
        assert_eq!(motor.step_hz(5.0), 16_000);
        assert_eq!(motor.step_hz(-0.5), 1600);
    }

    #[test]
    fn test_microsteps_valid() {
        let mut motor = MotorHwConfig::default();
        assert!(motor.microsteps_valid());

        motor.microsteps = 12;
        assert!(!motor.microsteps_valid());

        motor.microsteps = 512;
        assert!(!motor.microsteps_valid());

        motor.microsteps = 0;
        assert!(!motor.microsteps_valid());
    }
}
