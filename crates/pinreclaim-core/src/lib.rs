//! pinreclaim-core - Reclaim the flash /WP and /HOLD pins as GPIOs
//!
//! On ESP8266 modules GPIO9 and GPIO10 are wired to the flash chip's IO2
//! (/WP) and IO3 (/HOLD). In DIO/DOUT mode the controller does not drive
//! them, but the flash still honours /WP and /HOLD unless its Quad Enable
//! (or WPDis) bit is set. This crate identifies the chip, sets that bit
//! with a sequence the chip actually accepts, and hands both pins back.
//!
//! It is `no_std` and talks to hardware only through the [`bus::FlashBus`]
//! and [`bus::PinControl`] traits.
//!
//! # Features
//!
//! - `std` - Implement `std::error::Error` for [`Error`]
//!
//! # Example
//!
//! ```ignore
//! use pinreclaim_core::{reclaim_pins, ReclaimConfig};
//!
//! fn setup<B: FlashBus, P: PinControl>(bus: &mut B, pins: &mut P) {
//!     if reclaim_pins(bus, pins, &ReclaimConfig::default()) {
//!         // GPIO9 and GPIO10 are inputs now, free for the application
//!     }
//! }
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

#[cfg(any(feature = "std", test))]
extern crate std;

pub mod bus;
pub mod chip;
pub mod error;
pub mod protocol;
pub mod recipe;
pub mod reclaim;
pub mod sfdp;
pub mod spi;
pub mod vendor;

pub use chip::ChipId;
pub use error::{Error, Result};
pub use reclaim::{reclaim_pins, ReclaimConfig, Reclaimer};
pub use vendor::{BuiltinTable, VendorDispatch, VendorGroups};
