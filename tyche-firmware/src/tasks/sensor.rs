//! Sensor sampling task
//!
//! Samples the digital input and the AS5600 encoder at the sensor rate
//! and publishes a snapshot with an increasing sample counter. Encoder
//! read errors keep the previous position.

use defmt::*;
use embassy_rp::gpio::Input;
use embassy_rp::i2c::{Async, I2c};
use embassy_rp::peripherals::I2C0;
use embassy_time::{Duration, Ticker};

use tyche_core::config::SensorConfig;
use tyche_core::input::SensorSnapshot;
use tyche_drivers::sensor::{As5600, EncoderError, TurnCounter};

use crate::channels::SENSOR;

/// Encoder on I2C0
pub type Encoder = As5600<I2c<'static, I2C0, Async>>;

/// Sensor sampling task
#[embassy_executor::task]
pub async fn sensor_task(input: Input<'static>, mut encoder: Encoder, config: SensorConfig) {
    info!("Sensor task started at {} Hz", config.update_hz);

    match encoder.check_magnet().await {
        Ok(status) if status.is_ok() => info!("AS5600 magnet OK"),
        Ok(status) => warn!(
            "AS5600 magnet out of range (weak={}, strong={})",
            status.too_weak, status.too_strong
        ),
        Err(EncoderError::MagnetMissing) => warn!("AS5600 reports no magnet"),
        Err(EncoderError::Bus(e)) => warn!("AS5600 not responding: {:?}", e),
    }

    let mut turns = TurnCounter::new(false);
    let mut position = 0.0f32;
    let mut sample: u32 = 0;
    let mut failing = false;

    let mut ticker = Ticker::every(Duration::from_micros(config.period_us() as u64));

    loop {
        ticker.next().await;

        // Input pulls up; closed pulls the pin low
        let closed = input.is_low() != config.invert_input;

        match encoder.raw_angle().await {
            Ok(raw) => {
                position = turns.update(raw);
                if failing {
                    info!("Encoder reads again");
                    failing = false;
                }
            }
            Err(e) => {
                if !failing {
                    warn!("Encoder read failed: {:?}", e);
                    failing = true;
                }
            }
        }

        sample = sample.wrapping_add(1);
        SENSOR.signal(SensorSnapshot::new(position, closed, sample));
    }
}
