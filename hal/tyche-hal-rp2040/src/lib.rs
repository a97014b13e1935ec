//! RP2040-specific HAL for the Tyche actuator firmware
//!
//! - PIO-based step pulse generation
//! - Clock divider math for the step program

#![no_std]

pub mod pio;
pub mod stepper;

pub use stepper::PioStepper;
