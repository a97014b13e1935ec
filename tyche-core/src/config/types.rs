//! Configuration type definitions
//!
//! Every tunable of the control loop, grouped by concern. Durations are
//! kept in milliseconds (or microseconds) and converted to tick counts
//! against the loop rate.

use crate::motion::{ActuatorCommand, MotionProfiles};
use crate::scoring::ScoreTable;
use crate::traits::Rgb;

use super::hardware::MotorHwConfig;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum LED segments on the indicator strip
pub const MAX_SEGMENTS: u8 = 64;

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Loop rate is zero
    ZeroLoopRate,
    /// Sensor update rate is zero
    ZeroSensorRate,
    /// Sensor wait is not strictly shorter than one tick
    SensorTimeoutTooLong,
    /// Dwell duration rounds to zero ticks
    ZeroDwell,
    /// Enable feed timeout is not strictly longer than one tick
    EnableTimeoutTooShort,
    /// Hardware watchdog would fire before the enable gate
    WatchdogTimeoutTooShort,
    /// Acceleration is non-positive or not finite
    InvalidAcceleration,
    /// Velocity is not finite or exceeds the motor ceiling
    VelocityOutOfRange,
    /// Microsteps is not a power of two up to 256
    InvalidMicrosteps,
    /// No startup configuration attempts allowed
    ZeroConfigAttempts,
    /// Segment count is zero or too large
    InvalidSegmentCount,
    /// Score bands are not strictly ascending within [0, 360]
    UnorderedScoreBands,
    /// A score is outside the valid score set
    InvalidScore,
}

/// Control loop timing
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LoopConfig {
    /// Loop rate in Hz
    pub loop_hz: u32,
    /// Bounded wait for fresh sensor data, in microseconds
    pub sensor_timeout_us: u32,
    /// Debounce window in milliseconds, 0 disables debouncing
    pub debounce_ms: u32,
    /// Stopping dwell before the score is shown, in milliseconds
    pub dwell_ms: u32,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            loop_hz: 250,
            sensor_timeout_us: 3_000,
            debounce_ms: 500,
            dwell_ms: 2_000,
        }
    }
}

impl LoopConfig {
    /// Tick period in microseconds
    pub fn period_us(&self) -> u32 {
        1_000_000 / self.loop_hz.max(1)
    }

    /// Convert a duration to whole ticks at the loop rate
    pub fn ms_to_ticks(&self, ms: u32) -> u32 {
        let ticks = ms as u64 * self.loop_hz as u64 / 1000;
        ticks.min(u32::MAX as u64) as u32
    }

    /// Debounce window in ticks
    pub fn debounce_ticks(&self) -> u32 {
        self.ms_to_ticks(self.debounce_ms)
    }

    /// Stopping dwell in ticks
    pub fn dwell_ticks(&self) -> u32 {
        self.ms_to_ticks(self.dwell_ms)
    }
}

/// Sensor sampling
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SensorConfig {
    /// Sampling rate in Hz
    pub update_hz: u32,
    /// Input reads closed when the pin is high
    pub invert_input: bool,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            update_hz: 500,
            invert_input: false,
        }
    }
}

impl SensorConfig {
    /// Sampling period in microseconds
    pub fn period_us(&self) -> u32 {
        1_000_000 / self.update_hz.max(1)
    }
}

/// Enable gate and watchdog timing
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SafetyConfig {
    /// Actuator stays enabled this long after each feed
    pub enable_timeout_ms: u32,
    /// Hardware watchdog reset timeout
    pub watchdog_reset_ms: u32,
    /// Report stale sensor ticks once per this many in a row
    pub stale_report_every: u32,
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            enable_timeout_ms: 20,
            watchdog_reset_ms: 500,
            stale_report_every: 250,
        }
    }
}

/// LED indicator appearance
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct IndicatorConfig {
    /// Number of segments on the strip
    pub segments: u8,
    /// Global brightness (0-255)
    pub brightness: u8,
    /// Color of lit score segments as [r, g, b]
    pub score_color: [u8; 3],
    /// Color of the stopping flow animation as [r, g, b]
    pub flow_color: [u8; 3],
    /// One fill-and-drain cycle of the flow animation
    pub flow_period_ms: u32,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            segments: 8,
            brightness: 255,
            score_color: [0, 255, 0],
            flow_color: [0, 255, 0],
            flow_period_ms: 1_000,
        }
    }
}

impl IndicatorConfig {
    /// Score color with brightness applied
    pub fn score_rgb(&self) -> Rgb {
        scale(self.score_color, self.brightness)
    }

    /// Flow color with brightness applied
    pub fn flow_rgb(&self) -> Rgb {
        scale(self.flow_color, self.brightness)
    }
}

fn scale(color: [u8; 3], brightness: u8) -> Rgb {
    let s = |c: u8| ((c as u16 * brightness as u16) / 255) as u8;
    Rgb::new(s(color[0]), s(color[1]), s(color[2]))
}

/// Complete control configuration
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ControlConfig {
    /// Loop timing
    pub control: LoopConfig,
    /// Sensor sampling
    pub sensor: SensorConfig,
    /// Enable gate and watchdog
    pub safety: SafetyConfig,
    /// Command while accelerating
    pub drive: ActuatorCommand,
    /// Command while decelerating
    pub hold: ActuatorCommand,
    /// Motor driver settings
    pub motor: MotorHwConfig,
    /// LED indicator
    pub indicator: IndicatorConfig,
    /// Angle-to-score table
    pub score: ScoreTable,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            control: LoopConfig::default(),
            sensor: SensorConfig::default(),
            safety: SafetyConfig::default(),
            drive: ActuatorCommand::DRIVE,
            hold: ActuatorCommand::HOLD,
            motor: MotorHwConfig::default(),
            indicator: IndicatorConfig::default(),
            score: ScoreTable::default(),
        }
    }
}

impl ControlConfig {
    /// Create the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Drive and hold commands as a profile pair
    pub fn profiles(&self) -> MotionProfiles {
        MotionProfiles::new(self.drive, self.hold)
    }

    /// Check the configuration for internal consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        let control = &self.control;

        if control.loop_hz == 0 {
            return Err(ConfigError::ZeroLoopRate);
        }
        if self.sensor.update_hz == 0 {
            return Err(ConfigError::ZeroSensorRate);
        }

        let period_us = control.period_us();
        if control.sensor_timeout_us >= period_us {
            return Err(ConfigError::SensorTimeoutTooLong);
        }
        if control.dwell_ticks() == 0 {
            return Err(ConfigError::ZeroDwell);
        }

        let safety = &self.safety;
        if (safety.enable_timeout_ms as u64) * 1000 <= period_us as u64 {
            return Err(ConfigError::EnableTimeoutTooShort);
        }
        if safety.watchdog_reset_ms <= safety.enable_timeout_ms {
            return Err(ConfigError::WatchdogTimeoutTooShort);
        }

        for command in [&self.drive, &self.hold] {
            self.check_command(command)?;
        }

        if !self.motor.microsteps_valid() {
            return Err(ConfigError::InvalidMicrosteps);
        }
        if self.motor.config_attempts == 0 {
            return Err(ConfigError::ZeroConfigAttempts);
        }

        let segments = self.indicator.segments;
        if segments == 0 || segments > MAX_SEGMENTS {
            return Err(ConfigError::InvalidSegmentCount);
        }

        if !self.score.is_ascending() {
            return Err(ConfigError::UnorderedScoreBands);
        }
        if !self.score.scores_valid() {
            return Err(ConfigError::InvalidScore);
        }
        // A score lights that many segments
        let widest = self
            .score
            .bands
            .iter()
            .map(|band| band.score)
            .fold(self.score.fallback, u8::max);
        if widest > segments {
            return Err(ConfigError::InvalidSegmentCount);
        }

        Ok(())
    }

    fn check_command(&self, command: &ActuatorCommand) -> Result<(), ConfigError> {
        let accel = command.acceleration_rps2;
        if !accel.is_finite() || accel <= 0.0 {
            return Err(ConfigError::InvalidAcceleration);
        }

        let v = command.velocity_rps;
        let limit = self.motor.max_velocity_rps;
        if !limit.is_finite() || limit <= 0.0 || !v.is_finite() || v > limit || v < -limit {
            return Err(ConfigError::VelocityOutOfRange);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = ControlConfig::default();
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_tick_conversions() {
        let control = LoopConfig::default();
        assert_eq!(control.period_us(), 4_000);
        assert_eq!(control.debounce_ticks(), 125);
        assert_eq!(control.dwell_ticks(), 500);
        assert_eq!(control.ms_to_ticks(3), 0);
    }

    #[test]
    fn test_sensor_wait_must_fit_in_tick() {
        let mut config = ControlConfig::default();
        config.control.sensor_timeout_us = 10_000;
        assert_eq!(config.validate(), Err(ConfigError::SensorTimeoutTooLong));

        config.control.sensor_timeout_us = 4_000;
        assert_eq!(config.validate(), Err(ConfigError::SensorTimeoutTooLong));

        config.control.sensor_timeout_us = 3_999;
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_enable_timeout_must_exceed_tick() {
        let mut config = ControlConfig::default();
        config.safety.enable_timeout_ms = 4;
        assert_eq!(config.validate(), Err(ConfigError::EnableTimeoutTooShort));

        config.safety.enable_timeout_ms = 50;
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_watchdog_after_enable_gate() {
        let mut config = ControlConfig::default();
        config.safety.watchdog_reset_ms = 20;
        assert_eq!(config.validate(), Err(ConfigError::WatchdogTimeoutTooShort));
    }

    #[test]
    fn test_zero_rates_rejected() {
        let mut config = ControlConfig::default();
        config.control.loop_hz = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroLoopRate));

        let mut config = ControlConfig::default();
        config.sensor.update_hz = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroSensorRate));

        let mut config = ControlConfig::default();
        config.control.dwell_ms = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroDwell));
    }

    #[test]
    fn test_zero_debounce_accepted() {
        let mut config = ControlConfig::default();
        config.control.debounce_ms = 0;
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.control.debounce_ticks(), 0);

        // Rounds down to no debounce at 250 Hz
        config.control.debounce_ms = 2;
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_commands_checked() {
        let mut config = ControlConfig::default();
        config.hold.acceleration_rps2 = 0.0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidAcceleration));

        let mut config = ControlConfig::default();
        config.drive.velocity_rps = 50.0;
        assert_eq!(config.validate(), Err(ConfigError::VelocityOutOfRange));

        let mut config = ControlConfig::default();
        config.drive.velocity_rps = -5.0;
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_segments_cover_scores() {
        let mut config = ControlConfig::default();
        config.indicator.segments = 6;
        assert_eq!(config.validate(), Err(ConfigError::InvalidSegmentCount));

        config.indicator.segments = 0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidSegmentCount));
    }

    #[test]
    fn test_score_table_checked() {
        let mut config = ControlConfig::default();
        config.score.fallback = 1;
        assert_eq!(config.validate(), Err(ConfigError::InvalidScore));

        let mut config = ControlConfig::default();
        config.score.bands.swap(0, 1);
        assert_eq!(config.validate(), Err(ConfigError::UnorderedScoreBands));
    }

    #[test]
    fn test_brightness_scaling() {
        let mut indicator = IndicatorConfig::default();
        assert_eq!(indicator.score_rgb(), Rgb::new(0, 255, 0));

        indicator.brightness = 128;
        assert_eq!(indicator.flow_rgb(), Rgb::new(0, 128, 0));

        indicator.brightness = 0;
        assert_eq!(indicator.score_rgb(), Rgb::new(0, 0, 0));
    }
}
