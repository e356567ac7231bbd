//! Bus controller traits and abstractions
//!
//! This module defines the traits an embedding platform implements to give
//! the reclaim logic access to the flash chip and to the freed pins.

mod critical;
mod traits;

pub use critical::CriticalSection;
pub use traits::*;
