//! TMC2209 stepper driver (UART configuration)
//!
//! The TMC2209 is configured once at startup over its single-wire UART;
//! stepping itself happens on the STEP/DIR pins.
//!
//! # UART Protocol
//!
//! 115200 baud 8N1, one wire shared by TX and RX:
//! - Write: sync 0x05, slave address, register | 0x80, 4 data bytes
//!   (big-endian), CRC8
//! - Read request: sync 0x05, slave address, register, CRC8
//! - Read reply: sync 0x05, master address 0xFF, register, 4 data bytes,
//!   CRC8
//!
//! Because TX and RX share the wire, every byte written is echoed back
//! and must be consumed before the reply.
//!
//! # Write verification
//!
//! Writes are never acknowledged directly. The interface counter (IFCNT)
//! increments for every valid write datagram, so the driver reads it
//! before and after the configuration burst and accepts the burst only if
//! it advanced by the number of datagrams sent.

use tyche_core::config::MotorHwConfig;

/// TMC2209 Register addresses
pub mod reg {
    /// General configuration
    pub const GCONF: u8 = 0x00;
    /// Global status flags
    pub const GSTAT: u8 = 0x01;
    /// Interface transmission counter
    pub const IFCNT: u8 = 0x02;
    /// Hold/run current settings
    pub const IHOLD_IRUN: u8 = 0x10;
    /// Power down delay
    pub const TPOWERDOWN: u8 = 0x11;
    /// Chopper configuration
    pub const CHOPCONF: u8 = 0x6C;
    /// StealthChop PWM configuration
    pub const PWMCONF: u8 = 0x70;
}

/// UART sync byte for TMC2209
const SYNC_BYTE: u8 = 0x05;

/// Master address in read replies
const MASTER_ADDRESS: u8 = 0xFF;

/// Datagrams written by [`Tmc2209::configure`]
pub const INIT_WRITES: u8 = 6;

/// TMC2209 communication errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Tmc2209Error {
    /// Invalid sync byte in response
    InvalidSync,
    /// CRC mismatch
    CrcMismatch,
    /// Reply came from the wrong register
    UnexpectedRegister,
    /// Echoed bytes differ from what was sent
    EchoMismatch,
    /// Communication timeout
    Timeout,
    /// UART error
    Bus,
    /// Interface counter did not advance by the number of writes
    NotAcknowledged,
}

/// Single-wire UART used to talk to the driver
///
/// Implementations map their own errors (including timeouts) into
/// [`Tmc2209Error`].
#[allow(async_fn_in_trait)]
pub trait TmcUart {
    /// Write all of `bytes`
    async fn write(&mut self, bytes: &[u8]) -> Result<(), Tmc2209Error>;

    /// Fill all of `buf`
    async fn read(&mut self, buf: &mut [u8]) -> Result<(), Tmc2209Error>;
}

/// TMC2209 driver configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Tmc2209Config {
    /// UART address (0-3, set by MS1/MS2 pins)
    pub uart_address: u8,
    /// Run current in mA
    pub run_current_ma: u16,
    /// Hold current in mA
    pub hold_current_ma: u16,
    /// Enable StealthChop mode (quiet operation)
    pub stealthchop: bool,
    /// Microstepping (1, 2, 4, ... 256)
    pub microsteps: u16,
    /// TX and RX share one wire, so writes echo back
    pub single_wire: bool,
}

impl Default for Tmc2209Config {
    fn default() -> Self {
        Self::from(&MotorHwConfig::default())
    }
}

impl From<&MotorHwConfig> for Tmc2209Config {
    fn from(motor: &MotorHwConfig) -> Self {
        Self {
            uart_address: motor.uart_address,
            run_current_ma: motor.run_current_ma,
            hold_current_ma: motor.hold_current_ma,
            stealthchop: motor.stealthchop,
            microsteps: motor.microsteps,
            single_wire: true,
        }
    }
}

impl Tmc2209Config {
    /// Convert microsteps to MRES register value
    pub fn mres(&self) -> u8 {
        match self.microsteps {
            256 => 0,
            128 => 1,
            64 => 2,
            32 => 3,
            16 => 4,
            8 => 5,
            4 => 6,
            2 => 7,
            1 => 8,
            _ => 4,
        }
    }

    /// Convert an RMS current in mA to a CS scale value (0-31)
    ///
    /// Assumes Rsense = 0.11 ohm and the internal 0.325 V reference:
    /// CS = I_rms * 32 * sqrt(2) * (Rsense + 0.02) / 0.325 - 1.
    pub fn current_to_cs(current_ma: u16) -> u8 {
        let cs = ((current_ma as u32) * 1810 / 100_000).saturating_sub(1);
        cs.min(31) as u8
    }
}

/// CRC8 over a datagram, polynomial 0x07, bits taken LSB first
pub fn crc8(data: &[u8]) -> u8 {
    let mut crc = 0u8;
    for &byte in data {
        let mut current = byte;
        for _ in 0..8 {
            if ((crc >> 7) ^ (current & 0x01)) != 0 {
                crc = (crc << 1) ^ 0x07;
            } else {
                crc <<= 1;
            }
            current >>= 1;
        }
    }
    crc
}

/// Build a write datagram
pub fn build_write_datagram(addr: u8, reg: u8, data: u32) -> [u8; 8] {
    let mut datagram = [0u8; 8];
    datagram[0] = SYNC_BYTE;
    datagram[1] = addr;
    datagram[2] = reg | 0x80;
    datagram[3..7].copy_from_slice(&data.to_be_bytes());
    datagram[7] = crc8(&datagram[..7]);
    datagram
}

/// Build a read request datagram
pub fn build_read_request(addr: u8, reg: u8) -> [u8; 4] {
    let mut datagram = [0u8; 4];
    datagram[0] = SYNC_BYTE;
    datagram[1] = addr;
    datagram[2] = reg;
    datagram[3] = crc8(&datagram[..3]);
    datagram
}

/// Parse a read reply for `reg`
pub fn parse_read_response(response: &[u8; 8], reg: u8) -> Result<u32, Tmc2209Error> {
    if response[0] != SYNC_BYTE || response[1] != MASTER_ADDRESS {
        return Err(Tmc2209Error::InvalidSync);
    }
    if response[7] != crc8(&response[..7]) {
        return Err(Tmc2209Error::CrcMismatch);
    }
    if response[2] != reg {
        return Err(Tmc2209Error::UnexpectedRegister);
    }

    Ok(u32::from_be_bytes([
        response[3],
        response[4],
        response[5],
        response[6],
    ]))
}

/// Check that the 8-bit interface counter advanced by `writes`
pub fn verify_write_count(before: u32, after: u32, writes: u8) -> Result<(), Tmc2209Error> {
    let advanced = (after as u8).wrapping_sub(before as u8);
    if advanced == writes {
        Ok(())
    } else {
        Err(Tmc2209Error::NotAcknowledged)
    }
}

/// TMC2209 configuration driver
#[derive(Debug, Clone)]
pub struct Tmc2209 {
    config: Tmc2209Config,
}

impl Tmc2209 {
    /// Create a driver
    pub fn new(config: Tmc2209Config) -> Self {
        Self { config }
    }

    /// Get the configuration
    pub fn config(&self) -> &Tmc2209Config {
        &self.config
    }

    fn build_gconf(&self) -> u32 {
        let mut gconf = 0u32;

        // en_spreadcycle when StealthChop is off
        if !self.config.stealthchop {
            gconf |= 1 << 2;
        }
        // pdn_disable: PDN_UART pin is the UART
        gconf |= 1 << 6;
        // mstep_reg_select: microsteps from MRES, not MS pins
        gconf |= 1 << 7;
        // multistep_filt
        gconf |= 1 << 8;

        gconf
    }

    fn build_chopconf(&self) -> u32 {
        // TOFF=5 (must be nonzero), HSTRT=4, HEND=0, TBL=2
        let mut chopconf = 5 | (4 << 4) | (2 << 15);
        chopconf |= (self.config.mres() as u32) << 24;
        // intpol: interpolate to 256 microsteps
        chopconf |= 1 << 28;
        chopconf
    }

    fn build_ihold_irun(&self) -> u32 {
        let ihold = Tmc2209Config::current_to_cs(self.config.hold_current_ma) as u32;
        let irun = Tmc2209Config::current_to_cs(self.config.run_current_ma) as u32;
        let iholddelay = 6u32;

        (iholddelay << 16) | ((irun & 0x1F) << 8) | (ihold & 0x1F)
    }

    fn build_pwmconf(&self) -> u32 {
        // PWM_OFS=36, PWM_GRAD=14, PWM_FREQ=1, autoscale, autograd,
        // PWM_REG=4, PWM_LIM=12
        36 | (14 << 8) | (1 << 16) | (1 << 18) | (1 << 19) | (4 << 24) | (12 << 28)
    }

    /// Register write datagrams for initialization, in order
    pub fn init_datagrams(&self) -> [[u8; 8]; INIT_WRITES as usize] {
        let addr = self.config.uart_address;

        [
            // Clear reset/error flags
            build_write_datagram(addr, reg::GSTAT, 0x07),
            build_write_datagram(addr, reg::GCONF, self.build_gconf()),
            build_write_datagram(addr, reg::CHOPCONF, self.build_chopconf()),
            build_write_datagram(addr, reg::IHOLD_IRUN, self.build_ihold_irun()),
            build_write_datagram(addr, reg::TPOWERDOWN, 20),
            build_write_datagram(addr, reg::PWMCONF, self.build_pwmconf()),
        ]
    }

    /// Write one datagram, consuming its echo on a single-wire bus
    pub async fn write_datagram<U: TmcUart>(
        &self,
        uart: &mut U,
        datagram: &[u8; 8],
    ) -> Result<(), Tmc2209Error> {
        uart.write(datagram).await?;

        if self.config.single_wire {
            let mut echo = [0u8; 8];
            uart.read(&mut echo).await?;
            if &echo != datagram {
                return Err(Tmc2209Error::EchoMismatch);
            }
        }

        Ok(())
    }

    /// Read a register
    pub async fn read_register<U: TmcUart>(&self, uart: &mut U, reg: u8) -> Result<u32, Tmc2209Error> {
        let request = build_read_request(self.config.uart_address, reg);
        uart.write(&request).await?;

        if self.config.single_wire {
            let mut echo = [0u8; 4];
            uart.read(&mut echo).await?;
            if echo != request {
                return Err(Tmc2209Error::EchoMismatch);
            }
        }

        let mut reply = [0u8; 8];
        uart.read(&mut reply).await?;
        parse_read_response(&reply, reg)
    }

    /// Write the full configuration and verify it was accepted
    pub async fn configure<U: TmcUart>(&self, uart: &mut U) -> Result<(), Tmc2209Error> {
        let before = self.read_register(uart, reg::IFCNT).await?;

        for datagram in &self.init_datagrams() {
            self.write_datagram(uart, datagram).await?;
        }

        let after = self.read_register(uart, reg::IFCNT).await?;
        verify_write_count(before, after, INIT_WRITES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;
    use std::collections::VecDeque;
    use std::vec::Vec;

    /// Single-wire bus model: echoes writes, answers reads, counts writes
    struct FakeBus {
        rx: VecDeque<u8>,
        ifcnt: u8,
        drop_writes: usize,
        corrupt_crc: bool,
        written: Vec<[u8; 8]>,
    }

    impl FakeBus {
        fn new() -> Self {
            Self {
                rx: VecDeque::new(),
                ifcnt: 250,
                drop_writes: 0,
                corrupt_crc: false,
                written: Vec::new(),
            }
        }
    }

    impl TmcUart for FakeBus {
        async fn write(&mut self, bytes: &[u8]) -> Result<(), Tmc2209Error> {
            self.rx.extend(bytes.iter().copied());

            match bytes.len() {
                8 => {
                    if self.drop_writes > 0 {
                        self.drop_writes -= 1;
                    } else {
                        self.ifcnt = self.ifcnt.wrapping_add(1);
                    }
                    let mut dg = [0u8; 8];
                    dg.copy_from_slice(bytes);
                    self.written.push(dg);
                }
                4 => {
                    let mut reply = [SYNC_BYTE, MASTER_ADDRESS, bytes[2], 0, 0, 0, 0, 0];
                    if bytes[2] == reg::IFCNT {
                        reply[6] = self.ifcnt;
                    }
                    reply[7] = crc8(&reply[..7]);
                    if self.corrupt_crc {
                        reply[7] ^= 0xFF;
                    }
                    self.rx.extend(reply);
                }
                _ => return Err(Tmc2209Error::Bus),
            }
            Ok(())
        }

        async fn read(&mut self, buf: &mut [u8]) -> Result<(), Tmc2209Error> {
            for b in buf.iter_mut() {
                *b = self.rx.pop_front().ok_or(Tmc2209Error::Timeout)?;
            }
            Ok(())
        }
    }

    #[test]
    fn test_mres_conversion() {
        let mut config = Tmc2209Config::default();

        config.microsteps = 256;
        assert_eq!(config.mres(), 0);

        config.microsteps = 16;
        assert_eq!(config.mres(), 4);

        config.microsteps = 1;
        assert_eq!(config.mres(), 8);
    }

    #[test]
    fn test_current_conversion() {
        let cs = Tmc2209Config::current_to_cs(800);
        assert_eq!(cs, 13);

        let cs_low = Tmc2209Config::current_to_cs(400);
        assert!(cs_low < cs);

        assert_eq!(Tmc2209Config::current_to_cs(5000), 31);
    }

    #[test]
    fn test_crc8_known_vectors() {
        // Read request for GCONF at address 0
        assert_eq!(crc8(&[0x05, 0x00, 0x00]), 0x48);
        assert_eq!(build_read_request(0, reg::GCONF), [0x05, 0x00, 0x00, 0x48]);
    }

    #[test]
    fn test_write_datagram() {
        let datagram = build_write_datagram(0, reg::GCONF, 0x0000_0140);

        assert_eq!(&datagram[..3], &[SYNC_BYTE, 0x00, reg::GCONF | 0x80]);
        assert_eq!(&datagram[3..7], &[0x00, 0x00, 0x01, 0x40]);
        assert_eq!(datagram[7], crc8(&datagram[..7]));
    }

    #[test]
    fn test_parse_read_response() {
        let mut response = [SYNC_BYTE, MASTER_ADDRESS, reg::IFCNT, 0x12, 0x34, 0x56, 0x78, 0];
        response[7] = crc8(&response[..7]);

        assert_eq!(parse_read_response(&response, reg::IFCNT), Ok(0x1234_5678));
        assert_eq!(
            parse_read_response(&response, reg::GCONF),
            Err(Tmc2209Error::UnexpectedRegister)
        );

        let mut bad_sync = response;
        bad_sync[0] = 0x00;
        assert_eq!(
            parse_read_response(&bad_sync, reg::IFCNT),
            Err(Tmc2209Error::InvalidSync)
        );

        let mut bad_crc = response;
        bad_crc[7] ^= 0x01;
        assert_eq!(
            parse_read_response(&bad_crc, reg::IFCNT),
            Err(Tmc2209Error::CrcMismatch)
        );
    }

    #[test]
    fn test_verify_write_count_wraps() {
        assert_eq!(verify_write_count(250, 0, 6), Ok(()));
        assert_eq!(verify_write_count(10, 16, 6), Ok(()));
        assert_eq!(
            verify_write_count(10, 15, 6),
            Err(Tmc2209Error::NotAcknowledged)
        );
    }

    #[test]
    fn test_init_datagrams() {
        let driver = Tmc2209::new(Tmc2209Config::default());
        let datagrams = driver.init_datagrams();

        assert_eq!(datagrams.len(), INIT_WRITES as usize);
        for dg in &datagrams {
            assert_eq!(dg[0], SYNC_BYTE);
            assert_eq!(dg[2] & 0x80, 0x80);
            assert_eq!(dg[7], crc8(&dg[..7]));
        }

        // MRES for 16 microsteps lands in CHOPCONF bits 24-27
        let mut data = [0u8; 4];
        data.copy_from_slice(&datagrams[2][3..7]);
        let chopconf = u32::from_be_bytes(data);
        assert_eq!((chopconf >> 24) & 0x0F, 4);
    }

    #[test]
    fn test_spreadcycle_bit() {
        let mut config = Tmc2209Config::default();
        config.stealthchop = false;
        let driver = Tmc2209::new(config);
        let gconf = driver.init_datagrams()[1];
        assert_eq!(gconf[6] & 0x04, 0x04);
    }

    #[test]
    fn test_configure_verified() {
        let driver = Tmc2209::new(Tmc2209Config::default());
        let mut bus = FakeBus::new();

        assert_eq!(block_on(driver.configure(&mut bus)), Ok(()));
        assert_eq!(bus.written.len(), INIT_WRITES as usize);
        assert!(bus.rx.is_empty());
    }

    #[test]
    fn test_configure_detects_dropped_write() {
        let driver = Tmc2209::new(Tmc2209Config::default());
        let mut bus = FakeBus::new();
        bus.drop_writes = 1;

        assert_eq!(
            block_on(driver.configure(&mut bus)),
            Err(Tmc2209Error::NotAcknowledged)
        );
    }

    #[test]
    fn test_configure_reports_crc_error() {
        let driver = Tmc2209::new(Tmc2209Config::default());
        let mut bus = FakeBus::new();
        bus.corrupt_crc = true;

        assert_eq!(
            block_on(driver.configure(&mut bus)),
            Err(Tmc2209Error::CrcMismatch)
        );
    }
}
