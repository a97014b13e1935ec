//! TMC2209 configuration task
//!
//! Writes the motor driver configuration once at startup over UART1
//! (GPIO8 TX, GPIO9 RX, tied to the driver's single PDN_UART wire) and
//! verifies it through the interface counter. A failed configuration is
//! retried up to the configured budget; if every attempt fails the
//! driver keeps its power-on defaults and the firmware carries on.

use defmt::*;
use embassy_rp::uart::{Async, Uart};
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::mutex::Mutex;
use embassy_time::{with_timeout, Duration, Timer};

use tyche_core::startup::apply_with_retry;
use tyche_drivers::stepper::{Tmc2209, Tmc2209Config, Tmc2209Error, TmcUart};

/// Time for the driver to power up before the first write
const POWER_UP_DELAY: Duration = Duration::from_millis(100);

/// Pause between configuration attempts
const RETRY_DELAY: Duration = Duration::from_millis(50);

/// Longest wait for a reply
const READ_TIMEOUT: Duration = Duration::from_millis(10);

/// Async UART with a read timeout
struct TmcBus {
    uart: Uart<'static, Async>,
}

impl TmcUart for TmcBus {
    async fn write(&mut self, bytes: &[u8]) -> Result<(), Tmc2209Error> {
        self.uart.write(bytes).await.map_err(|_| Tmc2209Error::Bus)
    }

    async fn read(&mut self, buf: &mut [u8]) -> Result<(), Tmc2209Error> {
        match with_timeout(READ_TIMEOUT, self.uart.read(buf)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(_)) => Err(Tmc2209Error::Bus),
            Err(_) => Err(Tmc2209Error::Timeout),
        }
    }
}

/// TMC2209 configuration task
#[embassy_executor::task]
pub async fn tmc_init_task(uart: Uart<'static, Async>, config: Tmc2209Config, attempts: u8) {
    info!("TMC2209 init task starting...");

    Timer::after(POWER_UP_DELAY).await;

    info!(
        "Configuring TMC2209 at address {} with {}mA run current",
        config.uart_address, config.run_current_ma
    );

    let driver = Tmc2209::new(config);
    let bus = Mutex::<NoopRawMutex, _>::new(TmcBus { uart });

    let result = apply_with_retry(attempts, |attempt| {
        let driver = &driver;
        let bus = &bus;
        async move {
            if attempt > 1 {
                Timer::after(RETRY_DELAY).await;
            }
            let mut bus = bus.lock().await;
            let result = driver.configure(&mut *bus).await;
            if let Err(e) = result {
                debug!("TMC2209 attempt {} failed: {:?}", attempt, e);
            }
            result
        }
    })
    .await;

    match result {
        Ok(used) => {
            info!("TMC2209 configured after {} attempt(s)", used);
            let config = driver.config();
            debug!("  Microsteps: {}", config.microsteps);
            debug!("  Run current: {}mA", config.run_current_ma);
            debug!("  Hold current: {}mA", config.hold_current_ma);
            debug!("  StealthChop: {}", config.stealthchop);
        }
        Err(e) => {
            warn!(
                "TMC2209 configuration failed after {} attempts ({:?}), running on driver defaults",
                e.attempts, e.last_error
            );
        }
    }
}
