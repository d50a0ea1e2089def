//! Small support modules used throughout the firmware: UART text output,
//! the `print!`/`serial_println!` macros built on it, and the `log`-crate
//! backend installed at boot.

pub mod writer;
#[macro_use]
pub mod macros;
pub mod logger;
