//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the collaborator
//! traits defined in tyche-core, independent of any particular chip:
//!
//! - Stepper drivers (TMC2209 UART configuration)
//! - Angle sensors (AS5600 magnetic encoder, multi-turn tracking)
//! - LED segment strip (solid segments, flow animation)
//! - Velocity-controlled stepper motor

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod led;
pub mod motor;
pub mod sensor;
pub mod stepper;
