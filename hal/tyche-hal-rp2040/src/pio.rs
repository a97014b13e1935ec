//! PIO step pulse timing
//!
//! The step program toggles the step pin with a fixed number of PIO cycles
//! per pulse; the step frequency is set entirely by the state machine
//! clock divider. Delay slots stretch each step to [`CYCLES_PER_STEP`]
//! cycles so low frequencies stay within the 16-bit integer divider.

/// System clock frequency (RP2040 default)
pub const SYS_CLK_HZ: u32 = 125_000_000;

/// PIO cycles per step: two `set` instructions with 31 delay cycles each
pub const CYCLES_PER_STEP: u32 = 64;

/// Minimum pulse width in nanoseconds (2.5µs is safe for all drivers)
pub const MIN_PULSE_WIDTH_NS: u32 = 2500;

/// Maximum step frequency in Hz (limited by pulse width)
pub const MAX_STEP_FREQ_HZ: u32 = 200_000;

/// Largest integer divider the state machine accepts
pub const MAX_DIVIDER_INT: u16 = 0xFFFF;

/// Lowest step frequency reachable with the maximum divider
pub const fn min_step_freq_hz() -> u32 {
    let cycles = (MAX_DIVIDER_INT as u64 + 1) * CYCLES_PER_STEP as u64;
    SYS_CLK_HZ.div_ceil(cycles as u32)
}

/// Clock divider for a step frequency
///
/// The step frequency is `SYS_CLK / (divider * CYCLES_PER_STEP)`, so
/// `divider = SYS_CLK / (freq * CYCLES_PER_STEP)`.
///
/// Returns `(integer_part, fractional_part)` of the 16.8 fixed-point
/// divider, or `None` when the frequency is too low to generate (the
/// caller stops the state machine instead). Frequencies above
/// [`MAX_STEP_FREQ_HZ`] are clamped.
pub fn clock_divider(freq_hz: u32) -> Option<(u16, u8)> {
    if freq_hz < min_step_freq_hz() {
        return None;
    }
    let freq = freq_hz.min(MAX_STEP_FREQ_HZ) as u64;

    // 8 fractional bits: scale by 256 before dividing
    let divider_x256 = (SYS_CLK_HZ as u64 * 256) / (freq * CYCLES_PER_STEP as u64);

    let int_part = (divider_x256 / 256).min(MAX_DIVIDER_INT as u64) as u16;
    let frac_part = (divider_x256 % 256) as u8;

    Some((int_part, frac_part))
}

/// Divider as the raw bits of a 24.8 fixed-point value
pub fn divider_bits(int_part: u16, frac_part: u8) -> u32 {
    ((int_part as u32) << 8) | frac_part as u32
}

/// Step frequency actually produced by a divider
pub fn actual_freq_hz(int_part: u16, frac_part: u8) -> u32 {
    let bits = divider_bits(int_part, frac_part) as u64;
    if bits == 0 {
        return 0;
    }
    ((SYS_CLK_HZ as u64 * 256) / (bits * CYCLES_PER_STEP as u64)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_divider() {
        // 125 MHz / (1000 * 64) = 1953.125
        assert_eq!(clock_divider(1000), Some((1953, 32)));

        // 125 MHz / (16000 * 64) = 122.0703125
        let (int_part, _) = clock_divider(16_000).unwrap();
        assert_eq!(int_part, 122);
    }

    #[test]
    fn test_low_frequency_not_generated() {
        assert_eq!(clock_divider(0), None);
        assert_eq!(clock_divider(min_step_freq_hz() - 1), None);
        assert!(clock_divider(min_step_freq_hz()).is_some());
    }

    #[test]
    fn test_high_frequency_clamped() {
        assert_eq!(clock_divider(1_000_000), clock_divider(MAX_STEP_FREQ_HZ));
    }

    #[test]
    fn test_actual_frequency_close() {
        for freq in [100, 3200, 16_000, 50_000] {
            let (i, f) = clock_divider(freq).unwrap();
            let actual = actual_freq_hz(i, f);
            assert!(actual.abs_diff(freq) * 100 <= freq, "{freq} -> {actual}");
        }
    }
}
