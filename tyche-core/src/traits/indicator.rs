//! LED indicator trait

use core::ops::Range;

/// 8-bit RGB color
pub type Rgb = smart_leds::RGB8;

/// Color flowing along the strip
///
/// One cycle fills the strip from the first segment to the last and then
/// drains it in the same direction over `period_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowAnimation {
    /// Color of lit segments
    pub color: Rgb,
    /// Duration of one fill-and-drain cycle
    pub period_ms: u32,
}

/// Trait for multi-segment LED indicators
pub trait LedIndicator {
    /// Paint `segments` with a solid color
    ///
    /// Segments outside the strip are ignored. Painting a solid color
    /// stops any running animation.
    fn set_solid(&mut self, color: Rgb, segments: Range<u8>);

    /// Start (or keep running) a flow animation over the whole strip
    ///
    /// Calling this again with the same animation must not restart it.
    fn run_animation(&mut self, animation: FlowAnimation);

    /// Number of segments on the strip
    fn segment_count(&self) -> u8;
}
