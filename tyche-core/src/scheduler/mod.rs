//! Control loop scheduling
//!
//! The loop state object advanced once per tick, and the deadline clock
//! that paces it.

pub mod control;
pub mod timing;

pub use control::{ControlLoop, TickOutput};
pub use timing::TickClock;
