//! Tyche - Actuator Control Core Firmware
//!
//! Main firmware binary for RP2040-based boards. Drives a wheel with a
//! stepper motor, toggles between accelerating and coasting on a push
//! button, and shows the score under the wheel's resting angle on an LED
//! strip.
//!
//! Board wiring (SKR Pico style):
//! - Stepper: STEP GPIO11, DIR GPIO10, EN GPIO12 (active low)
//! - TMC2209 UART1: TX GPIO8, RX GPIO9
//! - Button: GPIO4 to ground, internal pull-up
//! - AS5600 I2C0: SDA GPIO0, SCL GPIO1
//! - WS2812 data: GPIO24 (PIO1)

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::i2c::{Config as I2cConfig, I2c, InterruptHandler as I2cInterruptHandler};
use embassy_rp::peripherals::{I2C0, PIO0, PIO1, UART1};
use embassy_rp::pio::{InterruptHandler as PioInterruptHandler, Pio};
use embassy_rp::pio_programs::ws2812::{PioWs2812, PioWs2812Program};
use embassy_rp::uart::{Config as UartConfig, InterruptHandler as UartInterruptHandler, Uart};
use embassy_rp::watchdog::Watchdog;
use embassy_time::Duration;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use tyche_drivers::motor::VelocityStepper;
use tyche_drivers::sensor::As5600;
use tyche_drivers::stepper::Tmc2209Config;
use tyche_hal_rp2040::PioStepper;

mod channels;
mod config;
mod tasks;

bind_interrupts!(struct Irqs {
    UART1_IRQ => UartInterruptHandler<UART1>;
    I2C0_IRQ => I2cInterruptHandler<I2C0>;
    PIO0_IRQ_0 => PioInterruptHandler<PIO0>;
    PIO1_IRQ_0 => PioInterruptHandler<PIO1>;
});

/// TMC2209 UART baud rate
const TMC_BAUD: u32 = 115_200;

/// AS5600 I2C clock
const I2C_FREQ_HZ: u32 = 400_000;

/// Enable pin on the stepper driver is active low
const ENABLE_ACTIVE_LOW: bool = true;

// The WS2812 program must outlive the driver that references it
static WS2812_PROGRAM: StaticCell<PioWs2812Program<'static, PIO1>> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Tyche firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = config::load();

    // Hardware watchdog: resets the MCU if the control loop stops feeding it
    let mut watchdog = Watchdog::new(p.WATCHDOG);
    watchdog.start(Duration::from_millis(config.safety.watchdog_reset_ms as u64));
    info!(
        "Watchdog armed: timeout={}ms, enable gate={}ms",
        config.safety.watchdog_reset_ms, config.safety.enable_timeout_ms
    );

    // TMC2209 on UART1
    let mut tmc_uart_config = UartConfig::default();
    tmc_uart_config.baudrate = TMC_BAUD;
    let tmc_uart = Uart::new(
        p.UART1,
        p.PIN_8,
        p.PIN_9,
        Irqs,
        p.DMA_CH0,
        p.DMA_CH1,
        tmc_uart_config,
    );
    let tmc_config = Tmc2209Config::from(&config.motor);
    info!("TMC UART initialized");

    // Step generator on PIO0, enable pin owned by the velocity stepper
    let Pio {
        mut common, sm0, ..
    } = Pio::new(p.PIO0, Irqs);
    let steps = PioStepper::new(&mut common, sm0, p.PIN_11, p.PIN_10, false);
    let enable_level = if ENABLE_ACTIVE_LOW {
        Level::High
    } else {
        Level::Low
    };
    let enable_pin = Output::new(p.PIN_12, enable_level);
    let motor = VelocityStepper::new(&config.motor, enable_pin, ENABLE_ACTIVE_LOW);
    info!(
        "PIO stepper initialized: {} steps/rev",
        config.motor.steps_per_rev()
    );

    // Button and encoder
    let button = Input::new(p.PIN_4, Pull::Up);
    let mut i2c_config = I2cConfig::default();
    i2c_config.frequency = I2C_FREQ_HZ;
    let i2c = I2c::new_async(p.I2C0, p.PIN_1, p.PIN_0, Irqs, i2c_config);
    let encoder = As5600::new(i2c);
    info!("Sensors initialized");

    // WS2812 strip on PIO1
    let Pio {
        mut common, sm0, ..
    } = Pio::new(p.PIO1, Irqs);
    let program = WS2812_PROGRAM.init(PioWs2812Program::new(&mut common));
    let ws2812 = PioWs2812::new(&mut common, sm0, p.DMA_CH2, p.PIN_24, program);
    let segments = config.indicator.segments;
    if segments as usize > tasks::STRIP_LEN {
        warn!(
            "{} segments configured, strip has {}",
            segments,
            tasks::STRIP_LEN
        );
    }
    info!("LED strip initialized");

    // Spawn tasks
    unwrap!(spawner.spawn(tasks::tmc_init_task(
        tmc_uart,
        tmc_config,
        config.motor.config_attempts
    )));
    unwrap!(spawner.spawn(tasks::motor_task(motor, steps)));
    unwrap!(spawner.spawn(tasks::sensor_task(button, encoder, config.sensor.clone())));
    unwrap!(spawner.spawn(tasks::led_task(ws2812, segments)));
    unwrap!(spawner.spawn(tasks::control_task(config, watchdog)));

    info!("All tasks spawned, firmware running");
}
