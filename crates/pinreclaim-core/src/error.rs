//! Error types for pinreclaim-core
//!
//! This module provides a no_std compatible error type that can be used
//! throughout the crate.

use core::fmt;

/// Core error type - no_std compatible, Copy for efficiency
///
/// A register primitive reports one of three outcomes: `Ok`,
/// [`Error::BusTransferFailed`] or [`Error::BusyTimeout`]. The remaining
/// variants are produced by the recipe, dispatch and reclaim layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    // Bus errors
    /// SPI transaction failed
    BusTransferFailed,
    /// Busy (WIP) bit did not clear within the poll budget
    BusyTimeout,
    /// Status register index outside 1..=3
    InvalidRegister(u8),

    // Reclaim errors
    /// No built-in recipe for this chip
    UnsupportedVendor {
        /// Manufacturer byte
        vendor: u8,
        /// Memory type byte
        memory_type: u8,
    },
    /// Target bit was not observed set (or clear) after the write
    VerifyFailed,
    /// Bus controller is in a quad I/O mode, IO2/IO3 are in use
    QuadModeActive,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BusTransferFailed => write!(f, "SPI transaction failed"),
            Self::BusyTimeout => write!(f, "flash busy timeout"),
            Self::InvalidRegister(idx) => {
                write!(f, "invalid status register index {} (expected 1..=3)", idx)
            }
            Self::UnsupportedVendor {
                vendor,
                memory_type,
            } => write!(
                f,
                "no built-in handler for vendor 0x{:02X} type 0x{:02X}",
                vendor, memory_type
            ),
            Self::VerifyFailed => write!(f, "status register verify failed"),
            Self::QuadModeActive => {
                write!(f, "bus controller is configured for quad I/O (QIO/QOUT)")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type alias using the core Error type
pub type Result<T> = core::result::Result<T, Error>;
