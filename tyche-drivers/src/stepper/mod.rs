//! Stepper driver implementations

pub mod tmc2209;

pub use tmc2209::{Tmc2209, Tmc2209Config, Tmc2209Error, TmcUart};
