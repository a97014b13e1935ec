//! Stepper motor control task
//!
//! Applies the latest actuator command, ramps the velocity every
//! millisecond and drives the PIO step generator. The driver stage is
//! enabled only while the enable gate is fed.

use defmt::*;
use embassy_rp::gpio::Output;
use embassy_rp::peripherals::PIO0;
use embassy_time::{Duration, Instant, Ticker};

use tyche_core::traits::MotionActuator;
use tyche_drivers::motor::VelocityStepper;
use tyche_hal_rp2040::PioStepper;

use crate::channels::{ENABLE_GATE, MOTOR_CMD};

/// Ramp update interval in milliseconds
const UPDATE_INTERVAL_MS: u32 = 1;

/// Stepper control task for the actuator motor
///
/// Uses PIO0 state machine 0 for step pulses.
#[embassy_executor::task]
pub async fn motor_task(
    mut motor: VelocityStepper<Output<'static>>,
    mut steps: PioStepper<'static, PIO0, 0>,
) {
    info!("Motor task started");

    let mut ticker = Ticker::every(Duration::from_millis(UPDATE_INTERVAL_MS as u64));

    loop {
        ticker.next().await;

        if let Some(command) = MOTOR_CMD.try_take() {
            motor.set_velocity_acceleration(command);
        }

        let now_ms = Instant::now().as_millis();
        let permitted = ENABLE_GATE.lock(|gate| gate.borrow().is_enabled(now_ms));

        if permitted != motor.is_enabled() {
            // Output pins are infallible
            let _ = motor.set_enabled(permitted);
            if permitted {
                info!("Actuator enabled");
            } else {
                warn!(
                    "Actuator disabled by enable gate at {} Hz",
                    steps.current_freq()
                );
            }
        }

        let out = motor.update(UPDATE_INTERVAL_MS);
        steps.set_output(out.step_hz, out.direction);
    }
}
