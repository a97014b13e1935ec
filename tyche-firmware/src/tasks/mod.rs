//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels/signals.

pub mod control;
pub mod led;
pub mod motor;
pub mod sensor;
pub mod tmc;

pub use control::control_task;
pub use led::{led_task, Ws2812, STRIP_LEN};
pub use motor::motor_task;
pub use sensor::{sensor_task, Encoder};
pub use tmc::tmc_init_task;
