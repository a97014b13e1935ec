//! LED segment strip
//!
//! Keeps a frame buffer for an addressable strip and turns solid segment
//! commands and the flow animation into frames. The frame is pushed to
//! the hardware by the caller (e.g. a PIO WS2812 driver).

use core::ops::Range;

use tyche_core::traits::{FlowAnimation, LedIndicator, Rgb};

/// Flow animation frame at `elapsed_ms` into the animation
///
/// The first half of each period fills the strip from segment 0 upward;
/// the second half drains it in the same direction.
pub fn flow_frame<const N: usize>(
    frame: &mut [Rgb; N],
    len: u8,
    animation: &FlowAnimation,
    elapsed_ms: u64,
) {
    let len = (len as usize).min(N);
    let period = (animation.period_ms as u64).max(2);
    let half = period / 2;
    let t = elapsed_ms % period;

    let lit = if t < half {
        // Fill: 1..=len segments lit from the start
        let n = (t * len as u64 / half) as usize + 1;
        0..n.min(len)
    } else {
        // Drain: leading segments go dark first
        let n = ((t - half) * len as u64 / half) as usize + 1;
        n.min(len)..len
    };

    for (i, pixel) in frame.iter_mut().enumerate() {
        *pixel = if lit.contains(&i) {
            animation.color
        } else {
            Rgb::default()
        };
    }
}

/// Frame buffer for an N-pixel strip
#[derive(Debug, Clone)]
pub struct SegmentStrip<const N: usize> {
    /// Pixel colors
    frame: [Rgb; N],
    /// Segments actually fitted (at most N)
    len: u8,
    /// Running animation and the time it started, once rendered
    animation: Option<(FlowAnimation, Option<u64>)>,
    /// Frame changed since the last render
    dirty: bool,
}

impl<const N: usize> SegmentStrip<N> {
    /// Create a strip with `len` segments, all off
    pub fn new(len: u8) -> Self {
        Self {
            frame: [Rgb::default(); N],
            len: len.min(N.min(u8::MAX as usize) as u8),
            animation: None,
            dirty: true,
        }
    }

    /// Check if an animation is running
    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// Current frame
    pub fn frame(&self) -> &[Rgb; N] {
        &self.frame
    }

    /// Produce the frame for `now_ms`
    ///
    /// Returns `None` when nothing changed since the previous render, so
    /// the caller can skip the hardware write.
    pub fn render(&mut self, now_ms: u64) -> Option<&[Rgb; N]> {
        if let Some((animation, started)) = &mut self.animation {
            let start = *started.get_or_insert(now_ms);
            flow_frame(&mut self.frame, self.len, animation, now_ms.saturating_sub(start));
            self.dirty = false;
            return Some(&self.frame);
        }

        if self.dirty {
            self.dirty = false;
            Some(&self.frame)
        } else {
            None
        }
    }
}

impl<const N: usize> LedIndicator for SegmentStrip<N> {
    fn set_solid(&mut self, color: Rgb, segments: Range<u8>) {
        if self.animation.take().is_some() {
            self.dirty = true;
        }

        let end = segments.end.min(self.len) as usize;
        let start = (segments.start as usize).min(end);
        for pixel in &mut self.frame[start..end] {
            if *pixel != color {
                *pixel = color;
                self.dirty = true;
            }
        }
    }

    fn run_animation(&mut self, animation: FlowAnimation) {
        match &self.animation {
            Some((running, _)) if *running == animation => {}
            _ => self.animation = Some((animation, None)),
        }
    }

    fn segment_count(&self) -> u8 {
        self.len
    }
}
