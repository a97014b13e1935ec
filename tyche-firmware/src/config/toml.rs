//! Simple TOML parser for the actuator configuration
//!
//! This is a minimal TOML parser that handles only the subset needed for
//! the Tyche configuration. It does NOT support the full TOML grammar.
//!
//! Supported features:
//! - Key = value pairs (integer, float, boolean)
//! - [section] headers
//! - Integer arrays for colors: score_color = [0, 255, 0]
//! - Inline tables for score bands: bands = [{ below = 45.0, score = 4 }]
//! - Comments (# ...)
//!
//! NOT supported:
//! - Strings, multi-line values and datetimes
//! - Nested inline tables
//! - Dotted keys
//!
//! Unknown keys are ignored so that newer files still load; unknown
//! sections are an error.

use heapless::Vec;

use tyche_core::config::ControlConfig;
use tyche_core::motion::ActuatorCommand;
use tyche_core::scoring::{ScoreBand, MAX_BANDS};

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Invalid section header
    InvalidSection,
    /// Invalid value type
    InvalidValue,
    /// Too many items (exceeded heapless capacity)
    TooManyItems,
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Control,
    Sensor,
    Safety,
    Drive,
    Hold,
    Motor,
    Indicator,
    Score,
}

/// Parse TOML configuration on top of the defaults
///
/// Keys that are absent keep their default value. The result is not
/// validated here; call [`ControlConfig::validate`].
pub fn parse_config(input: &str) -> Result<ControlConfig, ParseError> {
    let mut config = ControlConfig::default();
    let mut section = Section::Root;

    for line in input.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') {
            let header = strip_comment(line);
            if !header.ends_with(']') {
                return Err(ParseError::InvalidSection);
            }
            section = parse_section_header(&header[1..header.len() - 1])?;
            continue;
        }

        if let Some((key, value)) = parse_key_value(line) {
            apply_value(section, key, value, &mut config)?;
        }
    }

    Ok(config)
}

/// Parse section header like "control" or "score"
fn parse_section_header(header: &str) -> Result<Section, ParseError> {
    match header.trim() {
        "control" => Ok(Section::Control),
        "sensor" => Ok(Section::Sensor),
        "safety" => Ok(Section::Safety),
        "drive" => Ok(Section::Drive),
        "hold" => Ok(Section::Hold),
        "motor" => Ok(Section::Motor),
        "indicator" => Ok(Section::Indicator),
        "score" => Ok(Section::Score),
        _ => Err(ParseError::InvalidSection),
    }
}

/// Remove a trailing comment
fn strip_comment(s: &str) -> &str {
    match s.find('#') {
        Some(pos) => s[..pos].trim(),
        None => s.trim(),
    }
}

/// Parse "key = value" line
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let value = strip_comment(&line[eq_pos + 1..]);

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

/// Parse an integer value
fn parse_int<T: core::str::FromStr>(value: &str) -> Result<T, ParseError> {
    value
        .replace_underscores()
        .parse()
        .map_err(|_| ParseError::InvalidValue)
}

/// Parse a float value (integers are accepted)
fn parse_float(value: &str) -> Result<f32, ParseError> {
    value
        .replace_underscores()
        .parse()
        .map_err(|_| ParseError::InvalidValue)
}

/// Parse a boolean value
fn parse_bool(value: &str) -> Result<bool, ParseError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ParseError::InvalidValue),
    }
}

/// Digit separators are allowed in numbers (`1_000`)
trait ReplaceUnderscores {
    fn replace_underscores(&self) -> heapless::String<24>;
}

impl ReplaceUnderscores for str {
    fn replace_underscores(&self) -> heapless::String<24> {
        let mut out = heapless::String::new();
        for c in self.chars().filter(|c| *c != '_') {
            // Overlong numbers fail to parse below
            if out.push(c).is_err() {
                out.clear();
                break;
            }
        }
        out
    }
}

/// Strip the outer brackets of an array
fn array_inner(value: &str) -> Result<&str, ParseError> {
    let value = value.trim();
    // A lone "[" both starts and ends with a bracket
    if value.len() < 2 || !value.starts_with('[') || !value.ends_with(']') {
        return Err(ParseError::InvalidValue);
    }
    Ok(&value[1..value.len() - 1])
}

/// Parse a color like [0, 255, 0]
fn parse_color(value: &str) -> Result<[u8; 3], ParseError> {
    let mut color = [0u8; 3];
    let mut count = 0;

    for part in array_inner(value)?.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let slot = color.get_mut(count).ok_or(ParseError::InvalidValue)?;
        *slot = parse_int(part)?;
        count += 1;
    }

    if count != 3 {
        return Err(ParseError::InvalidValue);
    }
    Ok(color)
}

/// Parse score bands array
fn parse_bands(value: &str) -> Result<Vec<ScoreBand, MAX_BANDS>, ParseError> {
    let mut bands = Vec::new();
    let inner = array_inner(value)?;

    // Parse each band { below = 45.0, score = 4 }
    let mut depth = 0;
    let mut start = 0;

    for (i, c) in inner.char_indices() {
        match c {
            '{' => {
                if depth == 0 {
                    start = i;
                }
                depth += 1;
            }
            '}' => {
                depth -= 1;
                if depth == 0 {
                    let band = parse_single_band(&inner[start..=i])?;
                    bands.push(band).map_err(|_| ParseError::TooManyItems)?;
                }
            }
            _ => {}
        }
    }

    if depth != 0 {
        return Err(ParseError::InvalidValue);
    }
    Ok(bands)
}

/// Parse a single band like { below = 45.0, score = 4 }
fn parse_single_band(s: &str) -> Result<ScoreBand, ParseError> {
    let s = s.trim();
    if !s.starts_with('{') || !s.ends_with('}') {
        return Err(ParseError::InvalidValue);
    }
    let inner = &s[1..s.len() - 1];

    let mut below = None;
    let mut score = None;

    for part in inner.split(',') {
        if let Some((key, value)) = parse_key_value(part.trim()) {
            match key {
                "below" => below = Some(parse_float(value)?),
                "score" => score = Some(parse_int(value)?),
                _ => {}
            }
        }
    }

    match (below, score) {
        (Some(below), Some(score)) => Ok(ScoreBand::new(below, score)),
        _ => Err(ParseError::InvalidValue),
    }
}

/// Apply a value to an actuator command section
fn apply_command(command: &mut ActuatorCommand, key: &str, value: &str) -> Result<(), ParseError> {
    match key {
        "velocity_rps" => command.velocity_rps = parse_float(value)?,
        "acceleration_rps2" => command.acceleration_rps2 = parse_float(value)?,
        _ => {}
    }
    Ok(())
}

/// Apply a parsed value to the appropriate config field
fn apply_value(
    section: Section,
    key: &str,
    value: &str,
    config: &mut ControlConfig,
) -> Result<(), ParseError> {
    match section {
        Section::Control => {
            let control = &mut config.control;
            match key {
                "loop_hz" => control.loop_hz = parse_int(value)?,
                "sensor_timeout_us" => control.sensor_timeout_us = parse_int(value)?,
                "debounce_ms" => control.debounce_ms = parse_int(value)?,
                "dwell_ms" => control.dwell_ms = parse_int(value)?,
                _ => {}
            }
        }
        Section::Sensor => match key {
            "update_hz" => config.sensor.update_hz = parse_int(value)?,
            "invert_input" => config.sensor.invert_input = parse_bool(value)?,
            _ => {}
        },
        Section::Safety => {
            let safety = &mut config.safety;
            match key {
                "enable_timeout_ms" => safety.enable_timeout_ms = parse_int(value)?,
                "watchdog_reset_ms" => safety.watchdog_reset_ms = parse_int(value)?,
                "stale_report_every" => safety.stale_report_every = parse_int(value)?,
                _ => {}
            }
        }
        Section::Drive => apply_command(&mut config.drive, key, value)?,
        Section::Hold => apply_command(&mut config.hold, key, value)?,
        Section::Motor => {
            let motor = &mut config.motor;
            match key {
                "full_steps_per_rotation" => motor.full_steps_per_rotation = parse_int(value)?,
                "microsteps" => motor.microsteps = parse_int(value)?,
                "run_current_ma" => motor.run_current_ma = parse_int(value)?,
                "hold_current_ma" => motor.hold_current_ma = parse_int(value)?,
                "stealthchop" => motor.stealthchop = parse_bool(value)?,
                "uart_address" => motor.uart_address = parse_int(value)?,
                "config_attempts" => motor.config_attempts = parse_int(value)?,
                "max_velocity_rps" => motor.max_velocity_rps = parse_float(value)?,
                _ => {}
            }
        }
        Section::Indicator => {
            let indicator = &mut config.indicator;
            match key {
                "segments" => indicator.segments = parse_int(value)?,
                "brightness" => indicator.brightness = parse_int(value)?,
                "score_color" => indicator.score_color = parse_color(value)?,
                "flow_color" => indicator.flow_color = parse_color(value)?,
                "flow_period_ms" => indicator.flow_period_ms = parse_int(value)?,
                _ => {}
            }
        }
        Section::Score => match key {
            "bands" => config.score.bands = parse_bands(value)?,
            "fallback" => config.score.fallback = parse_int(value)?,
            _ => {}
        },
        Section::Root => {
            // No root-level keys
        }
    }

    Ok(())
}
