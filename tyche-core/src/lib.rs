//! Board-agnostic core logic for the actuator firmware
//!
//! This crate contains all control logic that does not depend on
//! specific hardware implementations:
//!
//! - Debounced digital input and sensor snapshots
//! - Mode state and LED display state machine
//! - Angle-to-score table
//! - Actuator command selection and velocity ramping
//! - Control loop state object and tick timing
//! - Enable gate and loop health monitoring
//! - Startup retry policy
//! - Configuration type definitions
//! - Collaborator traits (motor, LED indicator, enable feed)

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod config;
pub mod input;
pub mod motion;
pub mod safety;
pub mod scheduler;
pub mod scoring;
pub mod startup;
pub mod state;
pub mod traits;
