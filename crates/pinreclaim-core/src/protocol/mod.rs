//! Protocol implementations
//!
//! This module contains the SPI25 status register command sequences.

mod spi25;

pub use spi25::*;
