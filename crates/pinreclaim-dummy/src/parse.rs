//! Parsing chip descriptions from text

use pinreclaim_core::chip::ChipId;
use pinreclaim_core::spi::IoMode;

use crate::error::SimConfigError;
use crate::Quirks;

/// Parse a 24-bit JEDEC ID, hex with `0x` prefix or decimal
pub fn parse_chip_id(s: &str) -> Result<ChipId, SimConfigError> {
    let s = s.trim();
    let value = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16)
    } else {
        s.parse::<u32>()
    };
    match value {
        Ok(v) if v <= 0x00FF_FFFF => Ok(ChipId::new(v)),
        _ => Err(SimConfigError::InvalidChipId(s.to_string())),
    }
}

/// Parse an I/O mode name (SPI, DOUT, DIO, QOUT, QIO)
pub fn parse_io_mode(s: &str) -> Result<IoMode, SimConfigError> {
    IoMode::from_name(s.trim()).ok_or_else(|| SimConfigError::UnknownIoMode(s.to_string()))
}

impl Quirks {
    /// Parse a comma-separated list of quirk names
    pub fn from_names(list: &str) -> Result<Self, SimConfigError> {
        let mut quirks = Quirks::empty();
        for name in list.split(',').map(str::trim).filter(|n| !n.is_empty()) {
            let quirk = Self::NAMES
                .iter()
                .find(|(n, _)| *n == name)
                .map(|(_, q)| *q)
                .ok_or_else(|| SimConfigError::UnknownQuirk(name.to_string()))?;
            quirks |= quirk;
        }
        Ok(quirks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chip_id() {
        assert_eq!(parse_chip_id("0x1640EF"), Ok(ChipId::new(0x1640EF)));
        assert_eq!(parse_chip_id("1458415"), Ok(ChipId::new(0x1640EF)));
        assert!(matches!(
            parse_chip_id("0x1000000"),
            Err(SimConfigError::InvalidChipId(_))
        ));
        assert!(parse_chip_id("winbond").is_err());
    }

    #[test]
    fn test_parse_quirks() {
        assert_eq!(
            Quirks::from_names("no-16bit-write, reset-clears-qe"),
            Ok(Quirks::NO_16BIT_WRITE | Quirks::RESET_CLEARS_QE)
        );
        assert_eq!(Quirks::from_names(""), Ok(Quirks::empty()));
        assert_eq!(
            Quirks::from_names("sr3-cleared,bogus"),
            Err(SimConfigError::UnknownQuirk("bogus".to_string()))
        );
    }

    #[test]
    fn test_parse_io_mode() {
        assert_eq!(parse_io_mode("dio"), Ok(IoMode::DualIo));
        assert!(parse_io_mode("qpi").is_err());
    }
}
