//! Motor driver implementations
//!
//! - Velocity stepper: velocity/acceleration commands turned into a step
//!   frequency and direction for a step generator

pub mod velocity;

pub use velocity::{StepOutput, VelocityStepper};
