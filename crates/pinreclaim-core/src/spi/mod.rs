//! SPI types and command structures
//!
//! This module provides types for representing SPI transactions,
//! controller I/O modes, and the JEDEC opcodes used here.

mod command;
mod io_mode;
pub mod opcodes;

pub use command::{AddressWidth, SpiCommand};
pub use io_mode::IoMode;
pub use opcodes::*;
