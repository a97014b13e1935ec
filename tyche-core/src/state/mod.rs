//! Control state
//!
//! The mode toggle and the LED display phase machine. Both are explicit,
//! finite, and deterministic; they change only on confirmed input edges
//! and on the display dwell timer.

pub mod display;
pub mod mode;

pub use display::{DisplayMachine, LedCommand, LedPhase};
pub use mode::Mode;
