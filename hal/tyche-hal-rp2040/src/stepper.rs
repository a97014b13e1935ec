//! PIO-based step generator
//!
//! Uses RP2040's Programmable I/O to generate step pulses at a frequency
//! set by the state machine clock divider. Direction is a plain GPIO.
//! The driver enable pin is not owned here; it belongs to whoever
//! enforces the enable deadline.

use embassy_rp::gpio::{Level, Output, Pin};
use embassy_rp::pio::{Common, Config, Direction as PioDirection, Instance, PioPin, StateMachine};
use embassy_rp::Peri;
use fixed::types::U24F8;

use tyche_core::traits::Direction;

use crate::pio::{actual_freq_hz, clock_divider, divider_bits, MAX_DIVIDER_INT};

/// PIO step generator
pub struct PioStepper<'d, PIO: Instance, const SM: usize> {
    /// PIO state machine for step generation
    sm: StateMachine<'d, PIO, SM>,
    /// Direction GPIO output
    dir_pin: Output<'d>,
    /// Invert the direction pin
    dir_inverted: bool,
    /// Divider currently loaded, if running
    divider: Option<(u16, u8)>,
    /// Current direction
    direction: Direction,
}

impl<'d, PIO: Instance, const SM: usize> PioStepper<'d, PIO, SM> {
    /// Load the step program and set up the state machine, stopped
    pub fn new<STEP: PioPin, DIR: Pin>(
        common: &mut Common<'d, PIO>,
        mut sm: StateMachine<'d, PIO, SM>,
        step_pin: Peri<'d, STEP>,
        dir_pin: Peri<'d, DIR>,
        dir_inverted: bool,
    ) -> Self {
        // 64 cycles per step, see `pio::CYCLES_PER_STEP`
        let prg = pio::pio_asm!(
            ".wrap_target",
            "set pins, 1 [31]",
            "set pins, 0 [31]",
            ".wrap"
        );

        let installed = common.load_program(&prg.program);
        let step_pio_pin = common.make_pio_pin(step_pin);

        let mut cfg = Config::default();
        cfg.use_program(&installed, &[]);
        cfg.set_set_pins(&[&step_pio_pin]);
        // Slowest valid divider until the first frequency is set
        cfg.clock_divider = U24F8::from_bits(divider_bits(MAX_DIVIDER_INT, 0));

        sm.set_config(&cfg);
        sm.set_pin_dirs(PioDirection::Out, &[&step_pio_pin]);

        let mut stepper = Self {
            sm,
            dir_pin: Output::new(dir_pin, Level::Low),
            dir_inverted,
            divider: None,
            direction: Direction::Clockwise,
        };
        stepper.write_direction();
        stepper
    }

    /// Set step frequency and direction
    ///
    /// A frequency too low for the divider stops pulse generation.
    pub fn set_output(&mut self, step_hz: u32, direction: Direction) {
        if direction != self.direction {
            self.direction = direction;
            self.write_direction();
        }

        let divider = clock_divider(step_hz);
        if divider == self.divider {
            return;
        }

        match divider {
            Some((int_part, frac_part)) => {
                self.sm
                    .set_clock_divider(U24F8::from_bits(divider_bits(int_part, frac_part)));
                if self.divider.is_none() {
                    self.sm.set_enable(true);
                }
            }
            None => self.sm.set_enable(false),
        }
        self.divider = divider;
    }

    /// Step frequency being generated in Hz
    pub fn current_freq(&self) -> u32 {
        self.divider
            .map(|(int_part, frac_part)| actual_freq_hz(int_part, frac_part))
            .unwrap_or(0)
    }

    fn write_direction(&mut self) {
        let high = (self.direction == Direction::CounterClockwise) != self.dir_inverted;
        self.dir_pin.set_level(if high { Level::High } else { Level::Low });
    }
}
