//! Velocity-controlled stepper motor
//!
//! Accepts velocity/acceleration commands, ramps toward them, and yields
//! the step frequency and direction for a step generator. The driver
//! stage is switched through an enable pin; disabling it also drops the
//! ramp to zero so re-enabling never resumes at speed.
//!
//! ```ignore
//! let mut motor = VelocityStepper::new(&config.motor, enable_pin, true);
//! motor.set_enabled(true)?;
//! motor.set_velocity_acceleration(ActuatorCommand::DRIVE);
//!
//! // Every millisecond:
//! let out = motor.update(1);
//! step_generator.set_frequency(out.step_hz, out.direction);
//! ```

use embedded_hal::digital::OutputPin;

use tyche_core::config::MotorHwConfig;
use tyche_core::motion::{ActuatorCommand, VelocityRamp};
use tyche_core::traits::{Direction, MotionActuator};

/// Step generator setting for one update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StepOutput {
    /// Step frequency in Hz (0 = no steps)
    pub step_hz: u32,
    /// Rotation direction
    pub direction: Direction,
}

/// Stepper driven by velocity commands
pub struct VelocityStepper<EN> {
    ramp: VelocityRamp,
    motor: MotorHwConfig,
    enable: EN,
    /// Enable pin is active-low
    active_low: bool,
    enabled: bool,
}

impl<EN: OutputPin> VelocityStepper<EN> {
    /// Create a disabled stepper
    pub fn new(motor: &MotorHwConfig, enable: EN, active_low: bool) -> Self {
        Self {
            ramp: VelocityRamp::new(),
            motor: motor.clone(),
            enable,
            active_low,
            enabled: false,
        }
    }

    /// Switch the driver stage
    pub fn set_enabled(&mut self, enabled: bool) -> Result<(), EN::Error> {
        let high = enabled != self.active_low;
        if high {
            self.enable.set_high()?;
        } else {
            self.enable.set_low()?;
        }

        if !enabled {
            self.ramp.emergency_stop();
        }
        self.enabled = enabled;
        Ok(())
    }

    /// Check if the driver stage is enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Current velocity in rev/s
    pub fn velocity(&self) -> f32 {
        self.ramp.current()
    }

    /// Advance the ramp by `delta_ms`
    pub fn update(&mut self, delta_ms: u32) -> StepOutput {
        if !self.enabled {
            return StepOutput::default();
        }

        let velocity = self.ramp.update(delta_ms);
        StepOutput {
            step_hz: self.motor.step_hz(velocity),
            direction: Direction::of_velocity(velocity),
        }
    }
}

impl<EN: OutputPin> MotionActuator for VelocityStepper<EN> {
    fn set_velocity_acceleration(&mut self, command: ActuatorCommand) {
        let limit = self.motor.max_velocity_rps;
        let velocity = command.velocity_rps.min(limit).max(-limit);
        self.ramp
            .set_target(ActuatorCommand::new(velocity, command.acceleration_rps2));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_hal::digital::ErrorType;

    #[derive(Default)]
    struct FakePin {
        high: bool,
    }

    impl ErrorType for FakePin {
        type Error = Infallible;
    }

    impl OutputPin for FakePin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.high = false;
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.high = true;
            Ok(())
        }
    }

    fn stepper() -> VelocityStepper<FakePin> {
        VelocityStepper::new(&MotorHwConfig::default(), FakePin { high: true }, true)
    }

    #[test]
    fn test_disabled_produces_no_steps() {
        let mut motor = stepper();
        motor.set_velocity_acceleration(ActuatorCommand::DRIVE);
        assert_eq!(motor.update(1000), StepOutput::default());
    }

    #[test]
    fn test_enable_pin_active_low() {
        let mut motor = stepper();
        motor.set_enabled(true).unwrap();
        assert!(!motor.enable.high);
        motor.set_enabled(false).unwrap();
        assert!(motor.enable.high);
    }

    #[test]
    fn test_ramps_to_step_rate() {
        let mut motor = stepper();
        motor.set_enabled(true).unwrap();
        motor.set_velocity_acceleration(ActuatorCommand::DRIVE);

        // 10 rev/s² for 100 ms = 1 rev/s = 3200 steps/s
        let out = motor.update(100);
        assert_eq!(out.step_hz, 3200);
        assert_eq!(out.direction, Direction::Clockwise);

        let out = motor.update(1000);
        assert_eq!(out.step_hz, 16_000);
    }

    #[test]
    fn test_reverse_direction() {
        let mut motor = stepper();
        motor.set_enabled(true).unwrap();
        motor.set_velocity_acceleration(ActuatorCommand::new(-1.0, 10.0));
        let out = motor.update(1000);
        assert_eq!(out.direction, Direction::CounterClockwise);
        assert_eq!(out.step_hz, 3200);
    }

    #[test]
    fn test_velocity_clamped() {
        let mut motor = stepper();
        motor.set_enabled(true).unwrap();
        motor.set_velocity_acceleration(ActuatorCommand::new(100.0, 1000.0));
        motor.update(1000);
        assert_eq!(motor.velocity(), 10.0);
    }

    #[test]
    fn test_disable_drops_ramp() {
        let mut motor = stepper();
        motor.set_enabled(true).unwrap();
        motor.set_velocity_acceleration(ActuatorCommand::DRIVE);
        motor.update(500);
        assert!(motor.velocity() > 0.0);

        motor.set_enabled(false).unwrap();
        assert_eq!(motor.velocity(), 0.0);

        // Re-enabled: target was cleared, so it stays at rest until commanded
        motor.set_enabled(true).unwrap();
        assert_eq!(motor.update(100).step_hz, 0);
    }
}
