//! Configuration loading and parsing
//!
//! The configuration is embedded at compile time and parsed at boot by a
//! small no_std TOML parser. An invalid file falls back to the defaults.

pub mod toml;

pub use toml::{parse_config, ParseError};

use defmt::*;
use tyche_core::config::ControlConfig;

/// Embedded configuration (compiled into firmware)
/// Edit actuator.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../../actuator.toml");

/// Parse and validate the embedded configuration
pub fn load() -> ControlConfig {
    let config = match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to parse embedded config: {:?}", e);
            error!("Using default configuration");
            return ControlConfig::default();
        }
    };

    match config.validate() {
        Ok(()) => {
            info!("Configuration loaded");
            config
        }
        Err(e) => {
            error!("Invalid configuration: {:?}", e);
            error!("Using default configuration");
            ControlConfig::default()
        }
    }
}
