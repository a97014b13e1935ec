//! Control loop task
//!
//! Runs the fixed-rate loop: wait (bounded) for a fresh sensor sample,
//! advance the control state, issue the LED and actuator commands, feed
//! the enable gate and the hardware watchdog, then sleep until the next
//! deadline.

use core::ops::Range;

use defmt::*;
use embassy_rp::watchdog::Watchdog;
use embassy_time::{with_timeout, Duration, Instant, Timer};
use heapless::Vec;

use tyche_core::config::ControlConfig;
use tyche_core::input::SensorSnapshot;
use tyche_core::motion::ActuatorCommand;
use tyche_core::safety::{LoopMonitor, LoopStatus};
use tyche_core::scheduler::{ControlLoop, TickClock};
use tyche_core::traits::{EnableFeed, FlowAnimation, LedIndicator, MotionActuator, Rgb};

use crate::channels::{LedOp, ENABLE_GATE, LED_OPS, MOTOR_CMD, SENSOR};

/// LED operations issued by one tick
const MAX_OPS_PER_TICK: usize = 4;

/// Actuator sink: latest command wins
struct MotorLink;

impl MotionActuator for MotorLink {
    fn set_velocity_acceleration(&mut self, command: ActuatorCommand) {
        MOTOR_CMD.signal(command);
    }
}

/// Enable sink: extends the shared enable deadline
struct EnableLink;

impl EnableFeed for EnableLink {
    fn feed(&mut self, timeout_ms: u32) {
        let now_ms = Instant::now().as_millis();
        ENABLE_GATE.lock(|gate| gate.borrow_mut().feed(now_ms, timeout_ms));
    }
}

/// LED sink: forwards a tick's operations only when they differ from the
/// previous tick's
struct LedLink {
    segments: u8,
    pending: Vec<LedOp, MAX_OPS_PER_TICK>,
    sent: Vec<LedOp, MAX_OPS_PER_TICK>,
    dropped: u32,
}

impl LedLink {
    fn new(segments: u8) -> Self {
        Self {
            segments,
            pending: Vec::new(),
            sent: Vec::new(),
            dropped: 0,
        }
    }

    fn flush(&mut self) {
        if self.pending == self.sent {
            self.pending.clear();
            return;
        }

        for op in &self.pending {
            if LED_OPS.try_send(op.clone()).is_err() {
                self.dropped = self.dropped.wrapping_add(1);
                warn!("LED queue full, {} ops dropped", self.dropped);
                // Resend everything next tick
                self.pending.clear();
                self.sent.clear();
                return;
            }
        }

        core::mem::swap(&mut self.pending, &mut self.sent);
        self.pending.clear();
    }
}

impl LedIndicator for LedLink {
    fn set_solid(&mut self, color: Rgb, segments: Range<u8>) {
        let _ = self.pending.push(LedOp::Solid(color, segments));
    }

    fn run_animation(&mut self, animation: FlowAnimation) {
        let _ = self.pending.push(LedOp::Animate(animation));
    }

    fn segment_count(&self) -> u8 {
        self.segments
    }
}

/// Control loop task
#[embassy_executor::task]
pub async fn control_task(config: ControlConfig, mut watchdog: Watchdog) {
    info!("Control task started at {} Hz", config.control.loop_hz);

    let period_us = config.control.period_us();
    let sensor_timeout = Duration::from_micros(config.control.sensor_timeout_us as u64);

    // Seed the debounce filter with the first reading
    let mut last = match with_timeout(Duration::from_micros(period_us as u64), SENSOR.wait()).await {
        Ok(snapshot) => snapshot,
        Err(_) => {
            warn!("No sensor reading at startup, assuming open input");
            SensorSnapshot::default()
        }
    };

    let mut control = ControlLoop::new(&config, &last);
    let mut monitor = LoopMonitor::new(config.safety.stale_report_every);
    let mut clock = TickClock::new(period_us, Instant::now().as_micros());

    let mut motor = MotorLink;
    let mut leds = LedLink::new(config.indicator.segments);
    let mut enable = EnableLink;

    loop {
        let started = Instant::now();

        let fresh = match with_timeout(sensor_timeout, SENSOR.wait()).await {
            Ok(snapshot) => {
                last = snapshot;
                true
            }
            Err(_) => false,
        };

        match monitor.record_sensor(fresh) {
            LoopStatus::Ok | LoopStatus::StaleQuiet => {}
            LoopStatus::Stale(run) => {
                warn!(
                    "Sensor wait timed out, reusing sample {} ({} stale ticks)",
                    last.sample, run
                );
            }
        }

        let output = control.run_tick(&last, &mut motor, &mut leds, &mut enable);
        leds.flush();
        watchdog.feed();

        if let Some(mode) = output.mode_changed {
            info!("Mode -> {:?}", mode);
        }
        if let Some(phase) = output.phase_changed {
            info!("LED phase -> {:?} ({:?})", phase, output.led);
        }
        trace!(
            "Tick {}: pos={} closed={} cmd={}",
            control.ticks(),
            last.angular_position,
            last.input_closed,
            output.actuator.velocity_rps
        );

        let elapsed_us = started.elapsed().as_micros().min(u32::MAX as u64) as u32;
        if monitor.record_elapsed(elapsed_us, period_us) {
            warn!(
                "Tick overran: {} us > {} us ({} overruns)",
                elapsed_us,
                period_us,
                monitor.overruns()
            );
        }

        Timer::at(Instant::from_micros(clock.deadline_us())).await;

        let skipped = clock.advance(Instant::now().as_micros());
        if skipped > 0 {
            warn!("Skipped {} tick(s), {} total", skipped, clock.skipped());
        }
    }
}
