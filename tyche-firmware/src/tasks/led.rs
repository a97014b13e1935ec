//! LED indicator task
//!
//! Applies LED operations from the control loop to the segment strip and
//! writes changed frames to the WS2812 chain. The flow animation is
//! rendered here at the frame rate, independent of the control loop.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_rp::peripherals::PIO1;
use embassy_rp::pio_programs::ws2812::{Grb, PioWs2812};
use embassy_time::{Duration, Instant, Timer};

use tyche_core::traits::LedIndicator;
use tyche_drivers::led::SegmentStrip;

use crate::channels::{LedOp, LED_OPS};

/// Pixels on the WS2812 chain
pub const STRIP_LEN: usize = 8;

/// Animation frame interval
const FRAME_INTERVAL: Duration = Duration::from_millis(20);

/// WS2812 driver on PIO1 state machine 0
pub type Ws2812 = PioWs2812<'static, PIO1, 0, STRIP_LEN, Grb>;

/// LED indicator task
#[embassy_executor::task]
pub async fn led_task(mut driver: Ws2812, segments: u8) {
    info!("LED task started with {} segments", segments);

    let mut strip = SegmentStrip::<STRIP_LEN>::new(segments);

    loop {
        if let Some(frame) = strip.render(Instant::now().as_millis()) {
            driver.write(frame).await;
        }

        let op = if strip.is_animating() {
            match select(LED_OPS.receive(), Timer::after(FRAME_INTERVAL)).await {
                Either::First(op) => Some(op),
                Either::Second(()) => None,
            }
        } else {
            Some(LED_OPS.receive().await)
        };

        if let Some(op) = op {
            apply(&mut strip, op);
            // Apply a whole tick's batch before rendering
            while let Ok(op) = LED_OPS.try_receive() {
                apply(&mut strip, op);
            }
        }
    }
}

fn apply(strip: &mut SegmentStrip<STRIP_LEN>, op: LedOp) {
    match op {
        LedOp::Solid(color, segments) => strip.set_solid(color, segments),
        LedOp::Animate(animation) => strip.run_animation(animation),
    }
}
