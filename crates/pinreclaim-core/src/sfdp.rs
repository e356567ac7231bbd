//! SFDP revision summary
//!
//! Two chips can return the same JEDEC ID and still need different
//! recipes. The SFDP header revision and the size and location of the
//! first parameter table often tell them apart, so this module reads just
//! that much: the 8-byte SFDP header and the first parameter header.

use core::fmt;

use crate::bus::FlashBus;
use crate::protocol;

/// SFDP signature ("SFDP" in little-endian)
pub const SFDP_SIGNATURE: u32 = 0x50444653;

/// A major.minor revision pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SfdpRevision {
    /// Major revision number
    pub major: u8,
    /// Minor revision number
    pub minor: u8,
}

impl SfdpRevision {
    /// Create a new revision
    pub const fn new(major: u8, minor: u8) -> Self {
        Self { major, minor }
    }
}

impl fmt::Display for SfdpRevision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// SFDP header (first 8 bytes at address 0x00)
#[derive(Debug, Clone, Copy, Default)]
pub struct SfdpHeader {
    /// Should be [`SFDP_SIGNATURE`]
    pub signature: u32,
    /// SFDP revision
    pub revision: SfdpRevision,
    /// Number of parameter headers, 0-based
    pub nph: u8,
}

impl SfdpHeader {
    /// Parse the header from raw little-endian bytes
    pub fn parse(data: &[u8; 8]) -> Self {
        Self {
            signature: u32::from_le_bytes([data[0], data[1], data[2], data[3]]),
            revision: SfdpRevision::new(data[5], data[4]),
            nph: data[6],
        }
    }

    /// Check the signature
    pub fn is_valid(&self) -> bool {
        self.signature == SFDP_SIGNATURE
    }
}

/// Parameter header (8 bytes each, starting at address 0x08)
#[derive(Debug, Clone, Copy, Default)]
pub struct ParameterHeader {
    /// Parameter ID (MSB << 8 | LSB)
    pub id: u16,
    /// Parameter table revision
    pub revision: SfdpRevision,
    /// Parameter table length in DWORDs
    pub length_dwords: u8,
    /// Parameter table pointer (24-bit byte address)
    pub table_pointer: u32,
}

impl ParameterHeader {
    /// Parse a parameter header from raw little-endian bytes
    pub fn parse(data: &[u8; 8]) -> Self {
        Self {
            id: (u16::from(data[7]) << 8) | u16::from(data[0]),
            revision: SfdpRevision::new(data[2], data[1]),
            length_dwords: data[3],
            table_pointer: u32::from_le_bytes([data[4], data[5], data[6], 0]),
        }
    }
}

/// Revision summary returned by [`read_sfdp_revision`]
///
/// All fields are zero when the chip has no SFDP table or the read failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SfdpRevInfo {
    /// SFDP header revision
    pub header: SfdpRevision,
    /// Revision of the first parameter table
    pub param: SfdpRevision,
    /// Size of the first parameter table in DWORDs
    pub table_dwords: u8,
    /// Number of parameter headers, 0-based as stored on the chip
    pub param_headers: u8,
    /// Byte address of the first parameter table
    pub table_pointer: u32,
}

impl SfdpRevInfo {
    /// Build the summary from the SFDP header and first parameter header
    ///
    /// Returns the all-zero value if the signature does not match. A
    /// missing parameter header leaves the parameter fields zero.
    pub fn from_headers(header: &[u8; 8], param: Option<&[u8; 8]>) -> Self {
        let header = SfdpHeader::parse(header);
        if !header.is_valid() {
            return Self::default();
        }

        let mut info = Self {
            header: header.revision,
            param_headers: header.nph,
            ..Self::default()
        };
        if let Some(param) = param {
            let param = ParameterHeader::parse(param);
            info.param = param.revision;
            info.table_dwords = param.length_dwords;
            info.table_pointer = param.table_pointer;
        }
        info
    }

    /// Returns true if no SFDP table was found
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl fmt::Display for SfdpRevInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("no SFDP");
        }
        write!(
            f,
            "SFDP {}, {} parameter header(s), first table rev {} at 0x{:06X} ({} DWORDs)",
            self.header,
            u16::from(self.param_headers) + 1,
            self.param,
            self.table_pointer,
            self.table_dwords
        )
    }
}

/// Read the SFDP header and first parameter header
pub fn read_sfdp_revision<B: FlashBus + ?Sized>(bus: &mut B) -> SfdpRevInfo {
    let mut header = [0u8; 8];
    if let Err(e) = protocol::read_sfdp(bus, 0x00, &mut header) {
        log::debug!("SFDP header read failed: {}", e);
        return SfdpRevInfo::default();
    }
    if !SfdpHeader::parse(&header).is_valid() {
        log::debug!("No SFDP signature");
        return SfdpRevInfo::default();
    }

    let mut param = [0u8; 8];
    match protocol::read_sfdp(bus, 0x08, &mut param) {
        Ok(()) => SfdpRevInfo::from_headers(&header, Some(&param)),
        Err(e) => {
            log::debug!("SFDP parameter header read failed: {}", e);
            SfdpRevInfo::from_headers(&header, None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Header and first parameter header read from a 0xD8 part
    const D8_HEADER: [u8; 8] = [0x53, 0x46, 0x44, 0x50, 0x06, 0x01, 0x01, 0xFF];
    const D8_PARAM: [u8; 8] = [0x00, 0x06, 0x01, 0x10, 0x30, 0x00, 0x00, 0xFF];

    #[test]
    fn test_parse_rev_info() {
        let info = SfdpRevInfo::from_headers(&D8_HEADER, Some(&D8_PARAM));
        assert_eq!(info.header, SfdpRevision::new(1, 6));
        assert_eq!(info.param, SfdpRevision::new(1, 6));
        assert_eq!(info.table_dwords, 16);
        assert_eq!(info.param_headers, 1);
        assert_eq!(info.table_pointer, 0x30);
        assert!(!info.is_empty());
    }

    #[test]
    fn test_bad_signature_is_empty() {
        let mut header = D8_HEADER;
        header[0] = 0xFF;
        let info = SfdpRevInfo::from_headers(&header, Some(&D8_PARAM));
        assert!(info.is_empty());
    }

    #[test]
    fn test_header_only() {
        let info = SfdpRevInfo::from_headers(&D8_HEADER, None);
        assert_eq!(info.header, SfdpRevision::new(1, 6));
        assert_eq!(info.table_dwords, 0);
        assert_eq!(info.table_pointer, 0);
    }

    #[test]
    fn test_parameter_header_id() {
        let param = ParameterHeader::parse(&D8_PARAM);
        assert_eq!(param.id, 0xFF00);
    }
}
