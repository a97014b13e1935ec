//! Control loop state object
//!
//! Owns every piece of per-loop state (debounce filter, mode, display
//! phase) and advances it once per tick from an immutable sensor
//! snapshot. The caller supplies the snapshot and the sinks; this type
//! never blocks or sleeps.

use crate::config::{ControlConfig, IndicatorConfig};
use crate::input::{Debouncer, SensorSnapshot};
use crate::motion::{ActuatorCommand, MotionProfiles};
use crate::scoring::ScoreTable;
use crate::state::{DisplayMachine, LedCommand, LedPhase, Mode};
use crate::traits::{EnableFeed, LedIndicator, MotionActuator};

/// Everything one tick decided
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickOutput {
    /// LED command for this tick
    pub led: LedCommand,
    /// Actuator command for this tick
    pub actuator: ActuatorCommand,
    /// Enable feed timeout to issue
    pub feed_timeout_ms: u32,
    /// New mode, if it changed this tick
    pub mode_changed: Option<Mode>,
    /// New display phase, if it changed this tick
    pub phase_changed: Option<LedPhase>,
}

/// Control loop state
#[derive(Debug, Clone)]
pub struct ControlLoop {
    debounce: Debouncer,
    mode: Mode,
    display: DisplayMachine,
    profiles: MotionProfiles,
    score: ScoreTable,
    indicator: IndicatorConfig,
    feed_timeout_ms: u32,
    ticks: u32,
}

impl ControlLoop {
    /// Create the loop state from configuration and the first reading
    ///
    /// The debounced input starts at the first raw reading, so an input
    /// that is already closed at startup does not count as an edge.
    pub fn new(config: &ControlConfig, first: &SensorSnapshot) -> Self {
        Self {
            debounce: Debouncer::new(config.control.debounce_ticks(), first.input_closed),
            mode: Mode::Accelerate,
            display: DisplayMachine::new(config.control.dwell_ticks()),
            profiles: config.profiles(),
            score: config.score.clone(),
            indicator: config.indicator.clone(),
            feed_timeout_ms: config.safety.enable_timeout_ms,
            ticks: 0,
        }
    }

    /// Current mode
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Current display phase
    pub fn phase(&self) -> LedPhase {
        self.display.phase()
    }

    /// Current debounced input level
    pub fn input_closed(&self) -> bool {
        self.debounce.stable()
    }

    /// Ticks run so far
    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    /// Indicator settings used when issuing LED commands
    pub fn indicator(&self) -> &IndicatorConfig {
        &self.indicator
    }

    /// Advance one tick and return what to issue
    pub fn tick(&mut self, snapshot: &SensorSnapshot) -> TickOutput {
        self.ticks = self.ticks.wrapping_add(1);

        let mode_changed = self
            .debounce
            .update(snapshot.input_closed)
            .map(|closed| self.mode.on_stable_edge(closed))
            .filter(|next| *next != self.mode);
        if let Some(next) = mode_changed {
            self.mode = next;
        }

        let before = self.display.phase();
        let led = self
            .display
            .tick(mode_changed, snapshot.angular_position, &self.score);
        let after = self.display.phase();

        TickOutput {
            led,
            actuator: self.profiles.select(self.mode),
            feed_timeout_ms: self.feed_timeout_ms,
            mode_changed,
            phase_changed: (after != before).then_some(after),
        }
    }

    /// Advance one tick and issue its commands to the sinks
    ///
    /// Order: LED command, actuator command, enable feed.
    pub fn run_tick<M, L, F>(
        &mut self,
        snapshot: &SensorSnapshot,
        motor: &mut M,
        leds: &mut L,
        enable: &mut F,
    ) -> TickOutput
    where
        M: MotionActuator,
        L: LedIndicator,
        F: EnableFeed,
    {
        let output = self.tick(snapshot);

        output.led.issue(leds, &self.indicator);
        motor.set_velocity_acceleration(output.actuator);
        enable.feed(output.feed_timeout_ms);

        output
    }
}
