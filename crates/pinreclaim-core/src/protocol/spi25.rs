//! SPI25 status register protocol
//!
//! This module implements the JEDEC command sequences needed to identify a
//! flash chip and to read and write its status registers.
//!
//! None of these functions retry. A failed transaction is reported as
//! [`Error::BusTransferFailed`], a chip that stays busy as
//! [`Error::BusyTimeout`]; retry policy belongs to the caller.
//!
//! ## Volatile and non-volatile writes
//!
//! A status register write is committed either to the non-volatile register
//! (prefix WREN, 06h) or to its volatile copy (prefix VWREN, 50h). VWREN does
//! not touch WEL, and on several parts a WEL bit left set by an earlier
//! failed write turns the following "volatile" write into a non-volatile
//! one. Volatile writes therefore start with WRDI.

use core::convert::Infallible;

use crate::bus::{BusFeatures, CriticalSection, FlashBus};
use crate::chip::ChipId;
use crate::error::{Error, Result};
use crate::spi::{opcodes, SpiCommand};

/// Poll interval while a status register write completes
const STATUS_WRITE_POLL_US: u32 = 10_000;
/// Status register writes take 5-200ms on the parts seen so far
const STATUS_WRITE_TIMEOUT_US: u32 = 500_000;
/// tRST is 10us on most parts, give it twice that
const RESET_SETTLE_US: u32 = 20;
/// Reset during an erase can take tens of milliseconds to recover
const RESET_POLL_US: u32 = 1_000;
const RESET_TIMEOUT_US: u32 = 50_000;

/// One of the three 8-bit status registers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusRegister {
    /// SR1 (S7..S0)
    Status1,
    /// SR2 (S15..S8)
    Status2,
    /// SR3 (S23..S16)
    Status3,
}

impl StatusRegister {
    /// Map a 1-based register index to a register
    pub const fn from_index(index: u8) -> Result<Self> {
        match index {
            1 => Ok(Self::Status1),
            2 => Ok(Self::Status2),
            3 => Ok(Self::Status3),
            _ => Err(Error::InvalidRegister(index)),
        }
    }

    /// 1-based register index
    pub const fn index(self) -> u8 {
        match self {
            Self::Status1 => 1,
            Self::Status2 => 2,
            Self::Status3 => 3,
        }
    }

    /// Read opcode for this register
    pub const fn read_opcode(self) -> u8 {
        match self {
            Self::Status1 => opcodes::RDSR,
            Self::Status2 => opcodes::RDSR2,
            Self::Status3 => opcodes::RDSR3,
        }
    }

    /// Write opcode for this register
    pub const fn write_opcode(self) -> u8 {
        match self {
            Self::Status1 => opcodes::WRSR,
            Self::Status2 => opcodes::WRSR2,
            Self::Status3 => opcodes::WRSR3,
        }
    }
}

/// Where a status register write lands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Commit {
    /// Volatile copy, lost at power cycle or software reset
    Volatile,
    /// Non-volatile register, survives power cycles at the cost of wear
    NonVolatile,
}

impl Commit {
    /// Write-enable prefix command for this commit type
    pub const fn prefix_opcode(self) -> u8 {
        match self {
            Self::Volatile => opcodes::VWREN,
            Self::NonVolatile => opcodes::WREN,
        }
    }

    /// "volatile" or "non-volatile", for log messages
    pub const fn name(self) -> &'static str {
        match self {
            Self::Volatile => "volatile",
            Self::NonVolatile => "non-volatile",
        }
    }
}

/// Data width of a status register write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WriteWidth {
    /// One data byte
    Bits8,
    /// Two data bytes; with WRSR this is the legacy SR1+SR2 write
    Bits16,
}

impl WriteWidth {
    /// Number of data bits clocked out
    pub const fn bits(self) -> u32 {
        match self {
            Self::Bits8 => 8,
            Self::Bits16 => 16,
        }
    }
}

/// Read the 3-byte JEDEC identifier
///
/// Usable before the platform is fully initialised, since it needs nothing
/// but the bus. Any transaction failure yields [`ChipId::INVALID`], which
/// matches no entry of the built-in vendor table.
pub fn read_chip_id<B: FlashBus + ?Sized>(bus: &mut B) -> ChipId {
    let mut buf = [0u8; 3];
    let mut cmd = SpiCommand::read_reg(opcodes::RDID, &mut buf);
    match bus.execute(&mut cmd) {
        Ok(()) => ChipId::from_jedec_bytes(buf),
        Err(e) => {
            log::debug!("JEDEC ID read failed: {}", e);
            ChipId::INVALID
        }
    }
}

/// Read one status register
pub fn read_status<B: FlashBus + ?Sized>(bus: &mut B, reg: StatusRegister) -> Result<u8> {
    let mut buf = [0u8; 1];
    let mut cmd = SpiCommand::read_reg(reg.read_opcode(), &mut buf);
    bus.execute(&mut cmd)?;
    Ok(buf[0])
}

/// Read a status register by 1-based index
///
/// Fails with [`Error::InvalidRegister`] without touching the bus when the
/// index is outside 1..=3.
pub fn read_status_register<B: FlashBus + ?Sized>(bus: &mut B, index: u8) -> Result<u8> {
    read_status(bus, StatusRegister::from_index(index)?)
}

/// Read the status register 1
pub fn read_status1<B: FlashBus + ?Sized>(bus: &mut B) -> Result<u8> {
    read_status(bus, StatusRegister::Status1)
}

/// Read the status register 2
pub fn read_status2<B: FlashBus + ?Sized>(bus: &mut B) -> Result<u8> {
    read_status(bus, StatusRegister::Status2)
}

/// Read the status register 3
pub fn read_status3<B: FlashBus + ?Sized>(bus: &mut B) -> Result<u8> {
    read_status(bus, StatusRegister::Status3)
}

/// Read SR1 and SR2 as one value, SR2 in bits 15..8
pub fn read_status_registers_16<B: FlashBus + ?Sized>(bus: &mut B) -> Result<u16> {
    let sr1 = read_status1(bus)?;
    let sr2 = read_status2(bus)?;
    Ok(u16::from(sr1) | (u16::from(sr2) << 8))
}

/// Read SR1, SR2 and SR3 as one value, SR3 in bits 23..16
pub fn read_status_registers_24<B: FlashBus + ?Sized>(bus: &mut B) -> Result<u32> {
    let low = read_status_registers_16(bus)?;
    let sr3 = read_status3(bus)?;
    Ok(u32::from(low) | (u32::from(sr3) << 16))
}

/// Send the Write Disable command
pub fn write_disable<B: FlashBus + ?Sized>(bus: &mut B) -> Result<()> {
    let mut cmd = SpiCommand::simple(opcodes::WRDI);
    bus.execute(&mut cmd)
}

/// Wait for the WIP (Write In Progress) bit to clear
///
/// Polls status register 1 every `poll_delay_us` and gives up with
/// [`Error::BusyTimeout`] after `timeout_us`.
pub fn wait_ready<B: FlashBus + ?Sized>(
    bus: &mut B,
    poll_delay_us: u32,
    timeout_us: u32,
) -> Result<()> {
    let max_polls = if poll_delay_us > 0 {
        timeout_us / poll_delay_us
    } else {
        timeout_us
    };

    for _ in 0..max_polls {
        let status = read_status1(bus)?;
        if status & opcodes::SR1_WIP == 0 {
            return Ok(());
        }
        if poll_delay_us > 0 {
            bus.delay_us(poll_delay_us);
        }
    }

    Err(Error::BusyTimeout)
}

fn issue_status_write<B: FlashBus + ?Sized>(
    bus: &mut B,
    reg: StatusRegister,
    data: &[u8],
    commit: Commit,
) -> Result<()> {
    if commit == Commit::Volatile {
        // A stale WEL would make the write below non-volatile
        write_disable(bus)?;
    }
    let mut prefix = SpiCommand::simple(commit.prefix_opcode());
    bus.execute(&mut prefix)?;
    let mut cmd = SpiCommand::write_reg(reg.write_opcode(), data);
    bus.execute(&mut cmd)?;
    wait_ready(bus, STATUS_WRITE_POLL_US, STATUS_WRITE_TIMEOUT_US)
}

/// Write a status register
///
/// Sends the write-enable prefix for `commit`, the register's write command
/// with `width` data bits (low byte first), then WRDI whatever the outcome.
/// With [`WriteWidth::Bits8`] only the low byte of `value` is sent.
///
/// A successful return only means the bus accepted the commands. Several
/// parts silently ignore or truncate writes of the wrong width, so callers
/// must read the register back to learn whether it changed.
pub fn write_status_register<B: FlashBus + ?Sized>(
    bus: &mut B,
    reg: StatusRegister,
    value: u16,
    commit: Commit,
    width: WriteWidth,
) -> Result<()> {
    log::debug!(
        "SR{} {} write 0x{:04X} ({} bits)",
        reg.index(),
        commit.name(),
        value,
        width.bits()
    );
    let bytes = value.to_le_bytes();
    let data = match width {
        WriteWidth::Bits8 => &bytes[..1],
        WriteWidth::Bits16 => &bytes[..],
    };

    let result = issue_status_write(bus, reg, data, commit);
    if let Err(e) = write_disable(bus) {
        log::debug!("WRDI after SR{} write failed: {}", reg.index(), e);
    }
    result
}

/// Write the status register 1 (8-bit)
pub fn write_status1<B: FlashBus + ?Sized>(bus: &mut B, value: u8, commit: Commit) -> Result<()> {
    write_status_register(bus, StatusRegister::Status1, value.into(), commit, WriteWidth::Bits8)
}

/// Write the status register 2 (8-bit)
pub fn write_status2<B: FlashBus + ?Sized>(bus: &mut B, value: u8, commit: Commit) -> Result<()> {
    write_status_register(bus, StatusRegister::Status2, value.into(), commit, WriteWidth::Bits8)
}

/// Write the status register 3 (8-bit)
pub fn write_status3<B: FlashBus + ?Sized>(bus: &mut B, value: u8, commit: Commit) -> Result<()> {
    write_status_register(bus, StatusRegister::Status3, value.into(), commit, WriteWidth::Bits8)
}

/// Write status registers 1 and 2 with a single 16-bit WRSR
///
/// Only parts supporting the legacy 16-bit write honour this. If the
/// controller is not configured for 2-byte status writes a warning is
/// logged and the write is attempted anyway; the caller's read-back decides.
pub fn write_status_registers_16<B: FlashBus + ?Sized>(
    bus: &mut B,
    value: u16,
    commit: Commit,
) -> Result<()> {
    if !bus.features().contains(BusFeatures::TWO_BYTE_STATUS) {
        log::warn!("2-byte status write not enabled on the bus controller");
    } else {
        log::debug!("2-byte status write enabled on the bus controller");
    }
    write_status_register(
        bus,
        StatusRegister::Status1,
        value,
        commit,
        WriteWidth::Bits16,
    )
}

/// Send software reset sequence
///
/// RSTEN and RST go out back to back inside a [`CriticalSection`]; some
/// parts ignore the pair if anything else is clocked between them, and no
/// fetch from flash may happen before tRST has passed. Afterwards status
/// register 1 is polled until the chip is no longer busy.
///
/// Volatile register contents are lost. Some parts (0xD8) also clear the
/// non-volatile QE bit.
pub fn software_reset<B: FlashBus + ?Sized>(bus: &mut B) -> Result<()> {
    {
        let mut guard = CriticalSection::enter(bus);
        let mut cmd = SpiCommand::simple(opcodes::RSTEN);
        guard.execute(&mut cmd)?;
        let mut cmd = SpiCommand::simple(opcodes::RST);
        guard.execute(&mut cmd)?;
        guard.delay_us(RESET_SETTLE_US);
    }
    wait_ready(bus, RESET_POLL_US, RESET_TIMEOUT_US)
}

/// Erase the entire chip
///
/// Only returns on failure. On success the code being executed is being
/// erased from under the caller, so this spins forever.
pub fn chip_erase<B: FlashBus + ?Sized>(bus: &mut B) -> Result<Infallible> {
    let mut prefix = SpiCommand::simple(opcodes::WREN);
    bus.execute(&mut prefix)?;
    let mut cmd = SpiCommand::simple(opcodes::CE_60);
    bus.execute(&mut cmd)?;
    log::warn!("chip erase started, halting");
    loop {
        core::hint::spin_loop();
    }
}

/// Read SFDP (Serial Flash Discoverable Parameters)
pub fn read_sfdp<B: FlashBus + ?Sized>(bus: &mut B, addr: u32, buf: &mut [u8]) -> Result<()> {
    // SFDP requires 8 dummy cycles after the 24-bit address
    let mut cmd = SpiCommand::read_3b(opcodes::RDSFDP, addr, buf).with_dummy_cycles(8);
    bus.execute(&mut cmd)
}

// ============================================================================
// Status bit predicates
// ============================================================================
//
// Each predicate reads its register fresh.

/// Check if the Write Enable Latch is set
pub fn is_wel<B: FlashBus + ?Sized>(bus: &mut B) -> Result<bool> {
    let status = read_status1(bus)?;
    Ok(status & opcodes::SR1_WEL != 0)
}

/// Check if a write or erase operation is in progress
pub fn is_wip<B: FlashBus + ?Sized>(bus: &mut B) -> Result<bool> {
    let status = read_status1(bus)?;
    Ok(status & opcodes::SR1_WIP != 0)
}

/// Check if QE at S9 (SR2 bit 1) is set
pub fn is_qe<B: FlashBus + ?Sized>(bus: &mut B) -> Result<bool> {
    let status = read_status2(bus)?;
    Ok(status & opcodes::SR2_QE != 0)
}

/// Check if QE/WPDis at S6 (SR1 bit 6) is set
pub fn is_s6_qe<B: FlashBus + ?Sized>(bus: &mut B) -> Result<bool> {
    let status = read_status1(bus)?;
    Ok(status & opcodes::SR1_QE_S6 != 0)
}
