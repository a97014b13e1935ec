//! Collaborator traits
//!
//! These traits define the interface between the control loop and the
//! hardware-specific sinks it drives every tick. All of them are
//! fire-and-forget: the loop never waits on, or inspects, the result.

pub mod enable;
pub mod indicator;
pub mod motor;

pub use enable::EnableFeed;
pub use indicator::{FlowAnimation, LedIndicator, Rgb};
pub use motor::{Direction, MotionActuator};
