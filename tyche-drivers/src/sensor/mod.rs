//! Sensor implementations

pub mod as5600;

pub use as5600::{As5600, EncoderError, MagnetStatus, TurnCounter};
