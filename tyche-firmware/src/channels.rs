//! Inter-task communication channels
//!
//! Defines the statics used for communication between Embassy tasks.
//! Every per-tick write from the control loop is non-blocking
//! (`signal` / `try_send`), so a slow consumer never stalls the loop.

use core::cell::RefCell;
use core::ops::Range;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;

use tyche_core::input::SensorSnapshot;
use tyche_core::motion::ActuatorCommand;
use tyche_core::safety::EnableGate;
use tyche_core::traits::{FlowAnimation, Rgb};

/// Channel capacity for LED operations
const LED_CHANNEL_SIZE: usize = 8;

/// One LED operation, applied in order by the LED task
#[derive(Debug, Clone, PartialEq)]
pub enum LedOp {
    /// Paint a range of segments
    Solid(Rgb, Range<u8>),
    /// Start or keep the flow animation
    Animate(FlowAnimation),
}

/// Latest sensor reading (updated by the sensor task)
pub static SENSOR: Signal<CriticalSectionRawMutex, SensorSnapshot> = Signal::new();

/// Actuator command (updated by the control loop every tick)
pub static MOTOR_CMD: Signal<CriticalSectionRawMutex, ActuatorCommand> = Signal::new();

/// LED operations from the control loop
pub static LED_OPS: Channel<CriticalSectionRawMutex, LedOp, LED_CHANNEL_SIZE> = Channel::new();

/// Actuator enable deadline (fed by the control loop, checked by the motor task)
pub static ENABLE_GATE: Mutex<CriticalSectionRawMutex, RefCell<EnableGate>> =
    Mutex::new(RefCell::new(EnableGate::new()));
