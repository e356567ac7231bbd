//! Error types for building a simulated chip from text

use thiserror::Error;

/// Errors parsing a chip description
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SimConfigError {
    /// Quirk name not recognised
    #[error("Unknown quirk '{0}'")]
    UnknownQuirk(String),

    /// JEDEC ID not a 24-bit hex or decimal number
    #[error("Invalid chip ID '{0}', expected a 24-bit value such as 0x1640EF")]
    InvalidChipId(String),

    /// I/O mode name not recognised
    #[error("Unknown I/O mode '{0}', expected one of SPI, DOUT, DIO, QOUT, QIO")]
    UnknownIoMode(String),
}
