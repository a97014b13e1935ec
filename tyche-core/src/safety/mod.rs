//! Safety monitoring
//!
//! The software enable gate that de-energizes the actuator when the loop
//! stops feeding it, and the loop health counters reported in the logs.

pub mod enable;
pub mod monitor;

pub use enable::EnableGate;
pub use monitor::{LoopMonitor, LoopStatus};
