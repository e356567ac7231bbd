//! Chip identification

use core::fmt;

/// 24-bit JEDEC identifier as returned by RDID (9Fh)
///
/// ```text
/// 0xCCTTVV
///     | | +--- Vendor   - manufacturer ID
///     | +----- Type     - memory type
///     +------- Capacity - often log2 of the byte capacity
/// ```
///
/// The vendor byte is only unique within one JEDEC bank and nothing on the
/// bus says which bank, so distinct parts can share an identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChipId(u32);

impl ChipId {
    /// Returned when the identifier could not be read
    pub const INVALID: ChipId = ChipId(0x00FF_FFFF);

    /// Build from a raw value; bits above 23 are dropped
    pub const fn new(raw: u32) -> Self {
        Self(raw & 0x00FF_FFFF)
    }

    /// Build from the three RDID response bytes, in wire order
    pub const fn from_jedec_bytes(bytes: [u8; 3]) -> Self {
        Self(bytes[0] as u32 | (bytes[1] as u32) << 8 | (bytes[2] as u32) << 16)
    }

    /// Raw 24-bit value
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Manufacturer byte (bits 7..0)
    pub const fn vendor(self) -> u8 {
        self.0 as u8
    }

    /// Memory type byte (bits 15..8)
    pub const fn memory_type(self) -> u8 {
        (self.0 >> 8) as u8
    }

    /// Capacity code (bits 23..16)
    pub const fn capacity_code(self) -> u8 {
        (self.0 >> 16) as u8
    }

    /// Capacity in bytes, if the code follows the usual 2^N convention
    pub const fn capacity_bytes(self) -> Option<u32> {
        match self.capacity_code() {
            code @ 0x10..=0x1F => Some(1u32 << code),
            _ => None,
        }
    }

    /// Returns true for [`ChipId::INVALID`]
    pub const fn is_invalid(self) -> bool {
        self.0 == Self::INVALID.0
    }

    /// JEDEC manufacturer codes carry odd parity
    ///
    /// Informational only; the dispatch table never checks it. 0xD8 parts,
    /// for one, fail it and are still supported.
    pub const fn vendor_parity_ok(self) -> bool {
        self.vendor().count_ones() % 2 == 1
    }
}

impl fmt::Display for ChipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:06X}", self.0)
    }
}
