//! AS5600 magnetic angle encoder
//!
//! 12-bit absolute angle over I2C (fixed address 0x36). The encoder only
//! reports the angle within one revolution; [`TurnCounter`] accumulates
//! wraps so the published position is a multi-turn value in revolutions.

use embedded_hal_async::i2c::I2c;

/// Fixed 7-bit I2C address
pub const ADDRESS: u8 = 0x36;

/// Counts per revolution (12-bit)
pub const COUNTS_PER_REV: u16 = 4096;

/// Turn count wraps to stay within +/- this many turns
///
/// Whole turns do not change the score, and a bounded count keeps the
/// 12-bit fraction exact in an `f32` (11 integer bits + 12 fraction bits).
pub const TURN_WRAP: i32 = 1024;

/// AS5600 register addresses
pub mod reg {
    /// Magnet status (MD, ML, MH)
    pub const STATUS: u8 = 0x0B;
    /// Unscaled, unfiltered angle (2 bytes, 12 bits)
    pub const RAW_ANGLE: u8 = 0x0C;
    /// Automatic gain control value
    pub const AGC: u8 = 0x1A;
}

/// Encoder errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EncoderError<E> {
    /// I2C bus error
    Bus(E),
    /// No magnet detected
    MagnetMissing,
}

/// Decoded STATUS register
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MagnetStatus {
    /// Magnet detected (MD)
    pub detected: bool,
    /// Magnet too weak (ML)
    pub too_weak: bool,
    /// Magnet too strong (MH)
    pub too_strong: bool,
}

impl MagnetStatus {
    /// Decode the STATUS register
    pub fn from_register(value: u8) -> Self {
        Self {
            detected: value & (1 << 5) != 0,
            too_weak: value & (1 << 4) != 0,
            too_strong: value & (1 << 3) != 0,
        }
    }

    /// Check the magnet is present and within range
    pub fn is_ok(&self) -> bool {
        self.detected && !self.too_weak && !self.too_strong
    }
}

/// AS5600 driver
pub struct As5600<I2C> {
    i2c: I2C,
}

impl<I2C: I2c> As5600<I2C> {
    /// Create a driver on a bus
    pub fn new(i2c: I2C) -> Self {
        Self { i2c }
    }

    /// Release the bus
    pub fn release(self) -> I2C {
        self.i2c
    }

    /// Read the raw 12-bit angle
    pub async fn raw_angle(&mut self) -> Result<u16, EncoderError<I2C::Error>> {
        let mut buf = [0u8; 2];
        self.i2c
            .write_read(ADDRESS, &[reg::RAW_ANGLE], &mut buf)
            .await
            .map_err(EncoderError::Bus)?;

        Ok(u16::from_be_bytes(buf) & 0x0FFF)
    }

    /// Read the magnet status
    pub async fn magnet_status(&mut self) -> Result<MagnetStatus, EncoderError<I2C::Error>> {
        let mut buf = [0u8; 1];
        self.i2c
            .write_read(ADDRESS, &[reg::STATUS], &mut buf)
            .await
            .map_err(EncoderError::Bus)?;

        Ok(MagnetStatus::from_register(buf[0]))
    }

    /// Fail if no magnet is present
    ///
    /// A weak or strong magnet still reads, so only absence is an error;
    /// the returned status lets the caller warn about the rest.
    pub async fn check_magnet(&mut self) -> Result<MagnetStatus, EncoderError<I2C::Error>> {
        let status = self.magnet_status().await?;
        if !status.detected {
            return Err(EncoderError::MagnetMissing);
        }
        Ok(status)
    }
}

/// Multi-turn accumulator over 12-bit readings
///
/// Assumes the shaft turns less than half a revolution between readings.
/// The turn count wraps within [`TURN_WRAP`], so the position stays
/// exact however long the wheel runs.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TurnCounter {
    /// Previous raw reading
    last: Option<u16>,
    /// Whole turns accumulated
    turns: i32,
    /// Count in the opposite direction
    invert: bool,
}

impl TurnCounter {
    /// Create a counter
    pub fn new(invert: bool) -> Self {
        Self {
            last: None,
            turns: 0,
            invert,
        }
    }

    /// Feed a raw reading and return the position in revolutions
    pub fn update(&mut self, raw: u16) -> f32 {
        let raw = raw & 0x0FFF;
        let raw = if self.invert {
            (COUNTS_PER_REV - raw) % COUNTS_PER_REV
        } else {
            raw
        };

        if let Some(last) = self.last {
            let delta = raw as i32 - last as i32;
            let half = (COUNTS_PER_REV / 2) as i32;
            if delta > half {
                self.turns -= 1;
            } else if delta < -half {
                self.turns += 1;
            }

            if self.turns >= TURN_WRAP {
                self.turns -= 2 * TURN_WRAP;
            } else if self.turns < -TURN_WRAP {
                self.turns += 2 * TURN_WRAP;
            }
        }
        self.last = Some(raw);

        self.turns as f32 + raw as f32 / COUNTS_PER_REV as f32
    }

    /// Whole turns accumulated
    pub fn turns(&self) -> i32 {
        self.turns
    }
}
