//! JEDEC SPI flash opcodes used for status register access
//!
//! Only the commands needed to identify a chip and to read, modify and
//! write its status registers are listed. Values are fixed by the flash
//! vendors and must not change.

// ============================================================================
// Write control
// ============================================================================

/// Write Enable - prefix for a non-volatile status register write
pub const WREN: u8 = 0x06;
/// Write Disable - clears WEL bit in status register
pub const WRDI: u8 = 0x04;
/// Volatile Status Register Write Enable - prefix for a volatile write
///
/// Unlike WREN this does not set WEL. A WEL bit left over from an earlier
/// failed write can turn the following write non-volatile on some parts.
pub const VWREN: u8 = 0x50;

// ============================================================================
// Status register operations
// ============================================================================

/// Read Status Register 1
pub const RDSR: u8 = 0x05;
/// Read Status Register 2
pub const RDSR2: u8 = 0x35;
/// Read Status Register 3
pub const RDSR3: u8 = 0x15;
/// Write Status Register 1 (8-bit, or 16-bit SR1+SR2 on legacy parts)
pub const WRSR: u8 = 0x01;
/// Write Status Register 2
pub const WRSR2: u8 = 0x31;
/// Write Status Register 3
pub const WRSR3: u8 = 0x11;

// ============================================================================
// Identification
// ============================================================================

/// Read JEDEC ID (manufacturer, memory type, capacity)
pub const RDID: u8 = 0x9F;

/// Read SFDP (JEDEC JESD216)
pub const RDSFDP: u8 = 0x5A;

// ============================================================================
// Software Reset
// ============================================================================

/// Reset Enable
pub const RSTEN: u8 = 0x66;
/// Reset Device
pub const RST: u8 = 0x99;

// ============================================================================
// Erase
// ============================================================================

/// Chip Erase (entire chip)
pub const CE_60: u8 = 0x60;

// ============================================================================
// Status register bit definitions
// ============================================================================

/// Status Register 1: Write In Progress / Busy
pub const SR1_WIP: u8 = 0x01;
/// Status Register 1: Write Enable Latch
pub const SR1_WEL: u8 = 0x02;
/// Status Register 1: QE at S6, called WPDis on EON parts
pub const SR1_QE_S6: u8 = 0x40;
/// Status Register 2: Quad Enable (S9)
pub const SR2_QE: u8 = 0x02;
/// Status Registers 1+2 as one 16-bit value: Quad Enable (S9)
pub const SR12_QE_S9: u16 = 1 << 9;
