//! Configuration types
//!
//! Board-agnostic configuration for the control loop. The firmware parses
//! it from TOML at boot; the build script deserializes the same file with
//! serde and runs [`ControlConfig::validate`] so a bad file fails the build.

pub mod hardware;
pub mod types;

pub use hardware::*;
pub use types::*;
