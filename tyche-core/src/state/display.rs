//! LED display phase machine
//!
//! Two of the three transitions are driven by mode edges; the third
//! (Stopping to ShowScore) is driven by a dwell counter. A mode edge
//! always wins over the dwell counter.

use crate::config::IndicatorConfig;
use crate::scoring::ScoreTable;
use crate::traits::{FlowAnimation, LedIndicator, Rgb};

use super::Mode;

/// Display phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LedPhase {
    /// Mechanism is being driven; LEDs off
    #[default]
    Accelerating,
    /// Mechanism is coasting; flow animation
    Stopping,
    /// Mechanism is at rest; score shown
    ShowScore,
}

/// LED command produced by one tick of the phase machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LedCommand {
    /// Whole strip off
    Off,
    /// Run the flow animation
    Flow,
    /// Light the first N segments
    Score(u8),
}

impl LedCommand {
    /// Issue this command to an LED indicator
    pub fn issue<L: LedIndicator>(&self, leds: &mut L, indicator: &IndicatorConfig) {
        let count = leds.segment_count();

        match *self {
            LedCommand::Off => leds.set_solid(Rgb::default(), 0..count),
            LedCommand::Flow => leds.run_animation(FlowAnimation {
                color: indicator.flow_rgb(),
                period_ms: indicator.flow_period_ms,
            }),
            LedCommand::Score(score) => {
                let lit = score.min(count);
                leds.set_solid(Rgb::default(), lit..count);
                leds.set_solid(indicator.score_rgb(), 0..lit);
            }
        }
    }
}

/// Phase machine state
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayMachine {
    /// Current phase
    phase: LedPhase,
    /// Ticks spent in Stopping
    dwell_ticks: u32,
    /// Stopping ticks before the score is shown
    dwell_threshold: u32,
}

impl DisplayMachine {
    /// Create a machine in the Accelerating phase
    pub fn new(dwell_threshold: u32) -> Self {
        Self {
            phase: LedPhase::Accelerating,
            dwell_ticks: 0,
            dwell_threshold,
        }
    }

    /// Get the current phase
    pub fn phase(&self) -> LedPhase {
        self.phase
    }

    /// Get the Stopping dwell counter
    pub fn dwell_ticks(&self) -> u32 {
        self.dwell_ticks
    }

    /// Advance one tick
    ///
    /// `edge` is the new mode if it changed this tick. `position` is the
    /// latest angular position in revolutions, scored through `table`
    /// while the score is shown.
    pub fn tick(&mut self, edge: Option<Mode>, position: f32, table: &ScoreTable) -> LedCommand {
        match edge {
            Some(Mode::Decelerate) => self.enter(LedPhase::Stopping),
            Some(Mode::Accelerate) => self.enter(LedPhase::Accelerating),
            None => {}
        }

        match self.phase {
            LedPhase::Accelerating => {
                self.dwell_ticks = 0;
                LedCommand::Off
            }
            LedPhase::Stopping => {
                if self.dwell_ticks >= self.dwell_threshold {
                    self.enter(LedPhase::ShowScore);
                    LedCommand::Score(table.score_for(position))
                } else {
                    self.dwell_ticks += 1;
                    LedCommand::Flow
                }
            }
            LedPhase::ShowScore => LedCommand::Score(table.score_for(position)),
        }
    }

    fn enter(&mut self, phase: LedPhase) {
        self.phase = phase;
        self.dwell_ticks = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::ops::Range;
    use std::vec::Vec;

    #[derive(Debug, PartialEq)]
    enum Op {
        Solid(Rgb, Range<u8>),
        Animate(FlowAnimation),
    }

    struct RecordingLeds {
        ops: Vec<Op>,
    }

    impl LedIndicator for RecordingLeds {
        fn set_solid(&mut self, color: Rgb, segments: Range<u8>) {
            self.ops.push(Op::Solid(color, segments));
        }

        fn run_animation(&mut self, animation: FlowAnimation) {
            self.ops.push(Op::Animate(animation));
        }

        fn segment_count(&self) -> u8 {
            8
        }
    }

    #[test]
    fn test_initial_phase() {
        let mut machine = DisplayMachine::new(500);
        assert_eq!(machine.phase(), LedPhase::Accelerating);
        let table = ScoreTable::default();
        assert_eq!(machine.tick(None, 0.0, &table), LedCommand::Off);
    }

    #[test]
    fn test_dwell_then_score() {
        let table = ScoreTable::default();
        let mut machine = DisplayMachine::new(500);
        let mut phases = Vec::new();

        // Mode flips to Decelerate on tick 1 and stays there for 700 ticks
        for tick in 1..=700u32 {
            let edge = (tick == 1).then_some(Mode::Decelerate);
            machine.tick(edge, 0.3, &table);
            phases.push(machine.phase());
        }

        assert!(phases[..500].iter().all(|p| *p == LedPhase::Stopping));
        assert!(phases[500..].iter().all(|p| *p == LedPhase::ShowScore));
    }

    #[test]
    fn test_show_score_tracks_position() {
        let table = ScoreTable::default();
        let mut machine = DisplayMachine::new(1);
        machine.tick(Some(Mode::Decelerate), 0.0, &table);
        assert_eq!(machine.tick(None, 1.25, &table), LedCommand::Score(2));
        assert_eq!(machine.tick(None, 0.0, &table), LedCommand::Score(4));
        assert_eq!(machine.tick(None, -0.1, &table), LedCommand::Score(2));
    }

    #[test]
    fn test_accelerate_overrides_stopping() {
        let table = ScoreTable::default();
        let mut machine = DisplayMachine::new(500);
        machine.tick(Some(Mode::Decelerate), 0.0, &table);
        for _ in 0..100 {
            machine.tick(None, 0.0, &table);
        }
        assert_eq!(machine.dwell_ticks(), 101);

        let cmd = machine.tick(Some(Mode::Accelerate), 0.0, &table);
        assert_eq!(cmd, LedCommand::Off);
        assert_eq!(machine.phase(), LedPhase::Accelerating);
        assert_eq!(machine.dwell_ticks(), 0);

        // Re-entering Stopping restarts the full dwell
        machine.tick(Some(Mode::Decelerate), 0.0, &table);
        assert_eq!(machine.dwell_ticks(), 1);
    }

    #[test]
    fn test_show_score_persists() {
        let table = ScoreTable::default();
        let mut machine = DisplayMachine::new(2);
        machine.tick(Some(Mode::Decelerate), 0.0, &table);
        for _ in 0..10_000 {
            machine.tick(None, 0.0, &table);
        }
        assert_eq!(machine.phase(), LedPhase::ShowScore);

        machine.tick(Some(Mode::Accelerate), 0.0, &table);
        assert_eq!(machine.phase(), LedPhase::Accelerating);
    }

    #[test]
    fn test_full_mode_cycle_sequence() {
        let table = ScoreTable::default();
        let mut machine = DisplayMachine::new(3);
        let edges = [
            None,
            Some(Mode::Decelerate),
            None,
            None,
            None,
            None,
            None,
            Some(Mode::Accelerate),
            None,
        ];

        let mut phases: Vec<LedPhase> = Vec::new();
        for edge in edges {
            machine.tick(edge, 0.0, &table);
            let phase = machine.phase();
            if phases.last() != Some(&phase) {
                phases.push(phase);
            }
        }

        assert_eq!(
            phases,
            [
                LedPhase::Accelerating,
                LedPhase::Stopping,
                LedPhase::ShowScore,
                LedPhase::Accelerating,
            ]
        );
    }

    #[test]
    fn test_issue_score_clears_rest() {
        let indicator = IndicatorConfig::default();
        let mut leds = RecordingLeds { ops: Vec::new() };

        LedCommand::Score(3).issue(&mut leds, &indicator);
        assert_eq!(
            leds.ops,
            [
                Op::Solid(Rgb::default(), 3..8),
                Op::Solid(Rgb::new(0, 255, 0), 0..3),
            ]
        );
    }

    #[test]
    fn test_issue_off_and_flow() {
        let indicator = IndicatorConfig::default();
        let mut leds = RecordingLeds { ops: Vec::new() };

        LedCommand::Off.issue(&mut leds, &indicator);
        LedCommand::Flow.issue(&mut leds, &indicator);
        assert_eq!(
            leds.ops,
            [
                Op::Solid(Rgb::default(), 0..8),
                Op::Animate(FlowAnimation {
                    color: Rgb::new(0, 255, 0),
                    period_ms: 1_000,
                }),
            ]
        );
    }
}
