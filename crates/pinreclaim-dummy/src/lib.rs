//! pinreclaim-dummy - In-memory flash chip model for testing
//!
//! This crate provides a simulated SPI flash chip implementing
//! [`FlashBus`], with the status register behaviour the reclaim recipes
//! depend on: separate volatile and non-volatile copies of SR1..SR3, the
//! write-enable latch, the volatile write enable (50h) latch, and the
//! vendor quirks that make one recipe work on a chip and another fail.
//!
//! Every transaction is logged so tests can count writes, and any opcode
//! can be made to fail.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(feature = "std")]
mod error;
#[cfg(feature = "std")]
mod parse;

#[cfg(feature = "std")]
pub use error::SimConfigError;
#[cfg(feature = "std")]
pub use parse::{parse_chip_id, parse_io_mode};

#[cfg(feature = "alloc")]
use alloc::vec::Vec;

use bitflags::bitflags;
use pinreclaim_core::bus::{BusFeatures, FlashBus, PinControl, RestoreState};
use pinreclaim_core::chip::ChipId;
use pinreclaim_core::error::{Error, Result};
use pinreclaim_core::protocol::StatusRegister;
use pinreclaim_core::spi::{opcodes, AddressWidth, IoMode, SpiCommand};
use pinreclaim_core::vendor::ids;

bitflags! {
    /// Vendor specific deviations from the common status register behaviour
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Quirks: u32 {
        /// A 2-byte WRSR is rejected outright and WEL stays set (GigaDevice)
        const NO_16BIT_WRITE                = 1 << 0;
        /// A volatile SR1/SR2 write clears the volatile SR3 (XMC)
        const SR3_CLEARED_ON_VOLATILE_WRITE = 1 << 1;
        /// Only SR1 exists; SR2/SR3 read as zero and ignore writes (EON)
        const SINGLE_STATUS_REGISTER        = 1 << 2;
        /// Software reset also clears the non-volatile QE bit (0xD8)
        const RESET_CLEARS_QE               = 1 << 3;
    }
}

impl Quirks {
    /// Quirk names as used in chip descriptions
    pub const NAMES: [(&'static str, Quirks); 4] = [
        ("no-16bit-write", Self::NO_16BIT_WRITE),
        ("sr3-cleared", Self::SR3_CLEARED_ON_VOLATILE_WRITE),
        ("single-sr", Self::SINGLE_STATUS_REGISTER),
        ("reset-clears-qe", Self::RESET_CLEARS_QE),
    ];
}

/// SR1 bits a status write can change
const SR1_WRITABLE: u8 = !(opcodes::SR1_WIP | opcodes::SR1_WEL);

/// SFDP header and first parameter header as read from a 0xD8 part
pub const SFDP_D8: [u8; 16] = [
    0x53, 0x46, 0x44, 0x50, 0x06, 0x01, 0x01, 0xFF, // header, rev 1.6
    0x00, 0x06, 0x01, 0x10, 0x30, 0x00, 0x00, 0xFF, // BFPT rev 1.6, 16 DWORDs at 0x30
];

/// SFDP header and first parameter header of a JESD216B Winbond part
pub const SFDP_WINBOND: [u8; 16] = [
    0x53, 0x46, 0x44, 0x50, 0x05, 0x01, 0x00, 0xFF, // header, rev 1.5
    0x00, 0x05, 0x01, 0x10, 0x80, 0x00, 0x00, 0xFF, // BFPT rev 1.5, 16 DWORDs at 0x80
];

/// Configuration for the simulated chip
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// JEDEC ID returned by 9Fh
    pub id: ChipId,
    /// Vendor quirks
    pub quirks: Quirks,
    /// Mode the controller fetches in
    pub io_mode: IoMode,
    /// Controller configuration
    pub features: BusFeatures,
    /// Non-volatile SR1..SR3 at power-up
    pub status: [u8; 3],
    /// SFDP header bytes, `None` for a chip without SFDP
    pub sfdp: Option<[u8; 16]>,
    /// SR1 reads showing WIP after each status write
    pub busy_polls: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self::for_chip(ChipId::new(0x1640EF)) // Winbond W25Q32
    }
}

impl SimConfig {
    /// Configuration matching a known part, or a quirk-free chip
    ///
    /// The controller is set up the way a DIO boot leaves it.
    pub fn for_chip(id: ChipId) -> Self {
        let mut config = Self {
            id,
            quirks: Quirks::empty(),
            io_mode: IoMode::DualIo,
            features: BusFeatures::TWO_BYTE_STATUS,
            status: [0; 3],
            sfdp: None,
            busy_polls: 1,
        };
        match id.vendor() {
            ids::WINBOND_NEX => config.sfdp = Some(SFDP_WINBOND),
            ids::GIGADEVICE => config.quirks = Quirks::NO_16BIT_WRITE,
            ids::MYSTERY_D8 => {
                config.quirks = Quirks::NO_16BIT_WRITE | Quirks::RESET_CLEARS_QE;
                config.sfdp = Some(SFDP_D8);
            }
            ids::XMC => {
                config.quirks = Quirks::SR3_CLEARED_ON_VOLATILE_WRITE;
                // Driver strength 75%
                config.status[2] = 0x60;
            }
            ids::EON => config.quirks = Quirks::SINGLE_STATUS_REGISTER,
            _ => {}
        }
        config
    }
}

/// One logged bus transaction
#[cfg(feature = "alloc")]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    /// Opcode sent
    pub opcode: u8,
    /// Data phase sent after the opcode
    pub data: Vec<u8>,
    /// Issued inside a critical section
    pub in_critical: bool,
}

/// Simulated flash chip
#[cfg(feature = "alloc")]
pub struct SimChip {
    config: SimConfig,
    non_volatile: [u8; 3],
    volatile: [u8; 3],
    wel: bool,
    volatile_enabled: bool,
    reset_enabled: bool,
    busy_remaining: u32,
    erased: bool,
    log: Vec<Transaction>,
    faults: Vec<u8>,
    critical_depth: u32,
    critical_entries: u32,
    elapsed_us: u64,
}

#[cfg(feature = "alloc")]
impl SimChip {
    /// Create a chip in its power-up state
    pub fn new(config: SimConfig) -> Self {
        let status = config.status;
        Self {
            config,
            non_volatile: status,
            volatile: status,
            wel: false,
            volatile_enabled: false,
            reset_enabled: false,
            busy_remaining: 0,
            erased: false,
            log: Vec::new(),
            faults: Vec::new(),
            critical_depth: 0,
            critical_entries: 0,
            elapsed_us: 0,
        }
    }

    /// Create a chip for `id` with its known quirks
    pub fn for_chip(id: u32) -> Self {
        Self::new(SimConfig::for_chip(ChipId::new(id)))
    }

    /// Get the configuration
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Change the controller I/O mode
    pub fn set_io_mode(&mut self, mode: IoMode) {
        self.config.io_mode = mode;
    }

    /// Change the controller configuration
    pub fn set_features(&mut self, features: BusFeatures) {
        self.config.features = features;
    }

    /// Current (volatile) register contents, without WIP/WEL
    pub fn status(&self, reg: StatusRegister) -> u8 {
        self.volatile[Self::slot(reg)]
    }

    /// Non-volatile register contents
    pub fn non_volatile(&self, reg: StatusRegister) -> u8 {
        self.non_volatile[Self::slot(reg)]
    }

    /// Overwrite both copies of a register
    pub fn set_status(&mut self, reg: StatusRegister, value: u8) {
        let value = match reg {
            StatusRegister::Status1 => value & SR1_WRITABLE,
            _ => value,
        };
        self.volatile[Self::slot(reg)] = value;
        self.non_volatile[Self::slot(reg)] = value;
    }

    /// Write-enable latch
    pub fn wel(&self) -> bool {
        self.wel
    }

    /// Force the write-enable latch, as a failed boot ROM write leaves it
    pub fn set_wel(&mut self, wel: bool) {
        self.wel = wel;
    }

    /// Remove and restore power: volatile copies reload, latches clear
    pub fn power_cycle(&mut self) {
        self.volatile = self.non_volatile;
        self.wel = false;
        self.volatile_enabled = false;
        self.reset_enabled = false;
        self.busy_remaining = 0;
    }

    /// Make every transaction with `opcode` fail
    pub fn fail_opcode(&mut self, opcode: u8) {
        self.faults.push(opcode);
    }

    /// Remove all injected faults
    pub fn clear_faults(&mut self) {
        self.faults.clear();
    }

    /// All transactions since creation or the last [`SimChip::clear_log`]
    pub fn transactions(&self) -> &[Transaction] {
        &self.log
    }

    /// Opcodes of all logged transactions, in order
    pub fn opcodes(&self) -> Vec<u8> {
        self.log.iter().map(|t| t.opcode).collect()
    }

    /// Number of logged transactions with `opcode`
    pub fn count(&self, opcode: u8) -> usize {
        self.log.iter().filter(|t| t.opcode == opcode).count()
    }

    /// Number of logged status register writes (01h, 31h, 11h)
    pub fn status_writes(&self) -> usize {
        self.log
            .iter()
            .filter(|t| matches!(t.opcode, opcodes::WRSR | opcodes::WRSR2 | opcodes::WRSR3))
            .count()
    }

    /// Forget logged transactions
    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    /// Times a critical section was entered
    pub fn critical_entries(&self) -> u32 {
        self.critical_entries
    }

    /// Currently open critical sections
    pub fn critical_depth(&self) -> u32 {
        self.critical_depth
    }

    /// Returns true once a chip erase was accepted
    pub fn erased(&self) -> bool {
        self.erased
    }

    /// Total time spent in [`FlashBus::delay_us`]
    pub fn elapsed_us(&self) -> u64 {
        self.elapsed_us
    }

    fn slot(reg: StatusRegister) -> usize {
        usize::from(reg.index() - 1)
    }

    fn single_sr(&self) -> bool {
        self.config.quirks.contains(Quirks::SINGLE_STATUS_REGISTER)
    }

    fn read_sr1(&mut self) -> u8 {
        let mut value = self.volatile[0];
        if self.wel {
            value |= opcodes::SR1_WEL;
        }
        if self.busy_remaining > 0 {
            self.busy_remaining -= 1;
            value |= opcodes::SR1_WIP;
        }
        value
    }

    fn handle_status_write(&mut self, first: usize, data: &[u8]) {
        let non_volatile = if self.wel {
            true
        } else if self.volatile_enabled {
            false
        } else {
            log::trace!("status write ignored, not write enabled");
            return;
        };

        if first == 0 && data.len() >= 2 && self.config.quirks.contains(Quirks::NO_16BIT_WRITE) {
            log::trace!("2-byte WRSR rejected");
            return;
        }

        let limit = if self.single_sr() { 1 } else { 3 - first };
        for (i, &byte) in data.iter().take(limit).enumerate() {
            let slot = first + i;
            let value = if slot == 0 { byte & SR1_WRITABLE } else { byte };
            self.volatile[slot] = value;
            if non_volatile {
                self.non_volatile[slot] = value;
            }
        }

        if !non_volatile
            && first < 2
            && self
                .config
                .quirks
                .contains(Quirks::SR3_CLEARED_ON_VOLATILE_WRITE)
        {
            self.volatile[2] = 0;
        }

        self.wel = false;
        self.volatile_enabled = false;
        self.busy_remaining = self.config.busy_polls;
    }

    fn handle_software_reset(&mut self) {
        if self.config.quirks.contains(Quirks::RESET_CLEARS_QE) {
            self.non_volatile[1] &= !opcodes::SR2_QE;
        }
        self.volatile = self.non_volatile;
        self.wel = false;
        self.volatile_enabled = false;
        self.busy_remaining = 0;
    }

    fn handle_sfdp(&self, cmd: &mut SpiCommand<'_>) -> Result<()> {
        if cmd.address_width != AddressWidth::ThreeByte || cmd.dummy_cycles != 8 {
            return Err(Error::BusTransferFailed);
        }
        let start = cmd.address.unwrap_or(0) as usize;
        for (i, byte) in cmd.read_buf.iter_mut().enumerate() {
            *byte = self
                .config
                .sfdp
                .as_ref()
                .and_then(|image| image.get(start + i).copied())
                .unwrap_or(0xFF);
        }
        Ok(())
    }
}

#[cfg(feature = "alloc")]
fn fill(buf: &mut [u8], value: u8) {
    if let Some(first) = buf.first_mut() {
        *first = value;
    }
}

#[cfg(feature = "alloc")]
impl FlashBus for SimChip {
    fn features(&self) -> BusFeatures {
        self.config.features
    }

    fn io_mode(&self) -> IoMode {
        self.config.io_mode
    }

    fn execute(&mut self, cmd: &mut SpiCommand<'_>) -> Result<()> {
        self.log.push(Transaction {
            opcode: cmd.opcode,
            data: cmd.write_data.to_vec(),
            in_critical: self.critical_depth > 0,
        });
        if self.faults.contains(&cmd.opcode) {
            log::trace!("injected failure for opcode 0x{:02X}", cmd.opcode);
            return Err(Error::BusTransferFailed);
        }

        // RST is only honoured directly after RSTEN
        let reset_enabled = core::mem::take(&mut self.reset_enabled);

        match cmd.opcode {
            opcodes::RDID => {
                let bytes = self.config.id.raw().to_le_bytes();
                for (dst, src) in cmd.read_buf.iter_mut().zip(&bytes[..3]) {
                    *dst = *src;
                }
            }

            opcodes::RDSR => {
                let value = self.read_sr1();
                fill(cmd.read_buf, value);
            }
            opcodes::RDSR2 => {
                let value = if self.single_sr() { 0 } else { self.volatile[1] };
                fill(cmd.read_buf, value);
            }
            opcodes::RDSR3 => {
                let value = if self.single_sr() { 0 } else { self.volatile[2] };
                fill(cmd.read_buf, value);
            }

            opcodes::WRSR | opcodes::WRSR2 | opcodes::WRSR3
                if !matches!(cmd.write_bits(), 8 | 16) =>
            {
                log::trace!("{}-bit status write rejected", cmd.write_bits());
                return Err(Error::BusTransferFailed);
            }
            opcodes::WRSR => self.handle_status_write(0, cmd.write_data),
            // Only WRSR takes a second byte; 31h/11h ignore it
            opcodes::WRSR2 if !self.single_sr() => {
                self.handle_status_write(1, &cmd.write_data[..1])
            }
            opcodes::WRSR3 if !self.single_sr() => {
                self.handle_status_write(2, &cmd.write_data[..1])
            }
            opcodes::WRSR2 | opcodes::WRSR3 => {}

            opcodes::WREN => {
                self.wel = true;
                self.volatile_enabled = false;
            }
            opcodes::VWREN => self.volatile_enabled = true,
            opcodes::WRDI => {
                self.wel = false;
                self.volatile_enabled = false;
            }

            opcodes::RSTEN => self.reset_enabled = true,
            opcodes::RST => {
                if reset_enabled {
                    self.handle_software_reset();
                }
            }

            opcodes::RDSFDP => return self.handle_sfdp(cmd),

            opcodes::CE_60 => {
                if self.wel {
                    self.erased = true;
                    self.wel = false;
                }
            }

            _ => return Err(Error::BusTransferFailed),
        }
        Ok(())
    }

    fn delay_us(&mut self, us: u32) {
        self.elapsed_us += u64::from(us);
    }

    fn enter_critical(&mut self) -> RestoreState {
        self.critical_depth += 1;
        self.critical_entries += 1;
        RestoreState(self.critical_depth)
    }

    fn exit_critical(&mut self, state: RestoreState) {
        if state.0 != self.critical_depth {
            log::warn!(
                "critical sections closed out of order ({} != {})",
                state.0,
                self.critical_depth
            );
        }
        self.critical_depth = self.critical_depth.saturating_sub(1);
    }
}

/// Records the pins switched to input
#[cfg(feature = "alloc")]
#[derive(Debug, Default)]
pub struct SimPins {
    inputs: Vec<u8>,
}

#[cfg(feature = "alloc")]
impl SimPins {
    /// Create with no pins configured
    pub fn new() -> Self {
        Self::default()
    }

    /// Pins switched to input, in call order
    pub fn inputs(&self) -> &[u8] {
        &self.inputs
    }

    /// Returns true if `gpio` was switched to input
    pub fn is_input(&self, gpio: u8) -> bool {
        self.inputs.contains(&gpio)
    }
}

#[cfg(feature = "alloc")]
impl PinControl for SimPins {
    fn set_input(&mut self, gpio: u8) {
        self.inputs.push(gpio);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pinreclaim_core::bus::{CriticalSection, GPIO_HOLD, GPIO_WP};
    use pinreclaim_core::protocol::{self, Commit, StatusRegister};
    use pinreclaim_core::recipe::Recipe;
    use pinreclaim_core::reclaim::{reclaim_pins, ReclaimConfig, Reclaimer};
    use pinreclaim_core::sfdp::{self, SfdpRevision};
    use pinreclaim_core::vendor::{BuiltinTable, VendorDispatch, VendorGroups};

    const WINBOND: u32 = 0x1640EF;
    const GIGADEVICE: u32 = 0x1640C8;
    const MYSTERY_D8: u32 = 0x1640D8;
    const XMC: u32 = 0x164020;
    const EON: u32 = 0x16301C;

    fn reclaim(chip: &mut SimChip) -> (bool, SimPins) {
        let mut pins = SimPins::new();
        let ok = reclaim_pins(chip, &mut pins, &ReclaimConfig::default());
        (ok, pins)
    }

    #[test]
    fn test_read_chip_id() {
        let mut chip = SimChip::for_chip(WINBOND);
        let id = protocol::read_chip_id(&mut chip);
        assert_eq!(id.raw(), WINBOND);
        assert_eq!(id.vendor(), 0xEF);
        assert_eq!(id.memory_type(), 0x40);
        assert_eq!(id.capacity_bytes(), Some(4 * 1024 * 1024));
        assert_eq!(chip.opcodes(), [opcodes::RDID]);
    }

    #[test]
    fn test_read_chip_id_failure_is_sentinel() {
        let mut chip = SimChip::for_chip(WINBOND);
        chip.fail_opcode(opcodes::RDID);
        assert_eq!(protocol::read_chip_id(&mut chip), ChipId::INVALID);
    }

    #[test]
    fn test_read_status_registers() {
        let mut chip = SimChip::for_chip(XMC);
        chip.set_status(StatusRegister::Status1, 0x1C);
        chip.set_status(StatusRegister::Status2, 0x02);
        assert_eq!(protocol::read_status_registers_16(&mut chip), Ok(0x021C));
        assert_eq!(protocol::read_status_registers_24(&mut chip), Ok(0x60021C));
        assert_eq!(protocol::read_status_register(&mut chip, 3), Ok(0x60));
    }

    #[test]
    fn test_invalid_register_index_touches_nothing() {
        let mut chip = SimChip::for_chip(WINBOND);
        assert_eq!(
            protocol::read_status_register(&mut chip, 4),
            Err(Error::InvalidRegister(4))
        );
        assert!(chip.transactions().is_empty());
    }

    #[test]
    fn test_volatile_write_sequence() {
        let mut chip = SimChip::for_chip(GIGADEVICE);
        protocol::write_status2(&mut chip, 0x02, Commit::Volatile).unwrap();
        assert_eq!(
            chip.opcodes(),
            [
                opcodes::WRDI,
                opcodes::VWREN,
                opcodes::WRSR2,
                opcodes::RDSR, // busy
                opcodes::RDSR,
                opcodes::WRDI,
            ]
        );
        assert_eq!(chip.transactions()[2].data, [0x02]);
    }

    #[test]
    fn test_non_volatile_write_sequence() {
        let mut chip = SimChip::for_chip(EON);
        protocol::write_status1(&mut chip, 0x40, Commit::NonVolatile).unwrap();
        let ops = chip.opcodes();
        assert_eq!(&ops[..2], [opcodes::WREN, opcodes::WRSR]);
        assert_eq!(ops.last(), Some(&opcodes::WRDI));
        assert_eq!(chip.non_volatile(StatusRegister::Status1), 0x40);
    }

    #[test]
    fn test_volatile_write_round_trip() {
        let mut chip = SimChip::for_chip(GIGADEVICE);
        protocol::write_status2(&mut chip, 0x02, Commit::Volatile).unwrap();
        assert_eq!(protocol::read_status2(&mut chip), Ok(0x02));
        assert_eq!(chip.non_volatile(StatusRegister::Status2), 0x00);
    }

    #[test]
    fn test_power_cycle_discards_volatile_write() {
        let mut chip = SimChip::for_chip(GIGADEVICE);
        protocol::write_status2(&mut chip, 0x02, Commit::Volatile).unwrap();
        chip.power_cycle();
        assert_eq!(protocol::read_status2(&mut chip), Ok(0x00));

        protocol::write_status2(&mut chip, 0x02, Commit::NonVolatile).unwrap();
        chip.power_cycle();
        assert_eq!(protocol::read_status2(&mut chip), Ok(0x02));
    }

    #[test]
    fn test_stale_wel_does_not_leak_into_volatile_write() {
        let mut chip = SimChip::for_chip(GIGADEVICE);
        chip.set_wel(true);
        protocol::write_status2(&mut chip, 0x02, Commit::Volatile).unwrap();
        assert_eq!(chip.status(StatusRegister::Status2), 0x02);
        assert_eq!(chip.non_volatile(StatusRegister::Status2), 0x00);
        assert!(!chip.wel());
    }

    #[test]
    fn test_busy_timeout() {
        let mut config = SimConfig::for_chip(ChipId::new(GIGADEVICE));
        config.busy_polls = u32::MAX;
        let mut chip = SimChip::new(config);
        assert_eq!(
            protocol::write_status2(&mut chip, 0x02, Commit::Volatile),
            Err(Error::BusyTimeout)
        );
        assert_eq!(chip.elapsed_us(), 500_000);
        assert_eq!(chip.opcodes().last(), Some(&opcodes::WRDI));
    }

    #[test]
    fn test_write_disable_after_failed_write() {
        let mut chip = SimChip::for_chip(WINBOND);
        chip.fail_opcode(opcodes::WRSR);
        assert_eq!(
            protocol::write_status_registers_16(&mut chip, 0x0200, Commit::Volatile),
            Err(Error::BusTransferFailed)
        );
        assert_eq!(chip.opcodes().last(), Some(&opcodes::WRDI));
    }

    #[test]
    fn test_16bit_write_without_controller_support_is_attempted() {
        let mut chip = SimChip::for_chip(WINBOND);
        chip.set_features(BusFeatures::empty());
        protocol::write_status_registers_16(&mut chip, 0x0200, Commit::Volatile).unwrap();
        assert_eq!(chip.count(opcodes::WRSR), 1);
        assert_eq!(chip.status(StatusRegister::Status2), 0x02);
    }

    #[test]
    fn test_status_write_width_enforced() {
        let mut chip = SimChip::for_chip(WINBOND);
        chip.execute(&mut SpiCommand::simple(opcodes::VWREN)).unwrap();
        let three = [0x00, 0x02, 0x60];
        assert_eq!(
            chip.execute(&mut SpiCommand::write_reg(opcodes::WRSR, &three)),
            Err(Error::BusTransferFailed)
        );
        assert_eq!(
            chip.execute(&mut SpiCommand::write_reg(opcodes::WRSR2, &[])),
            Err(Error::BusTransferFailed)
        );
        assert_eq!(chip.status(StatusRegister::Status2), 0);

        // 31h takes the first byte of a 2-byte write
        chip.execute(&mut SpiCommand::write_reg(opcodes::WRSR2, &[0x02, 0x60]))
            .unwrap();
        assert_eq!(chip.status(StatusRegister::Status2), 0x02);
        assert_eq!(chip.status(StatusRegister::Status3), 0);
    }

    #[test]
    fn test_sfdp_needs_address_and_dummy_byte() {
        let mut chip = SimChip::for_chip(WINBOND);
        let mut buf = [0u8; 4];
        let mut cmd = SpiCommand::read_reg(opcodes::RDSFDP, &mut buf);
        assert_eq!(chip.execute(&mut cmd), Err(Error::BusTransferFailed));
        let mut cmd = SpiCommand::read_3b(opcodes::RDSFDP, 0, &mut buf).with_dummy_cycles(8);
        chip.execute(&mut cmd).unwrap();
        assert_eq!(&buf, b"SFDP");
    }

    #[test]
    fn test_recipe_is_idempotent() {
        let mut chip = SimChip::for_chip(WINBOND);
        Recipe::S9Sr1Write16.set(&mut chip, Commit::Volatile).unwrap();
        assert_eq!(chip.status_writes(), 1);

        chip.clear_log();
        Recipe::S9Sr1Write16.set(&mut chip, Commit::Volatile).unwrap();
        assert_eq!(chip.status_writes(), 0);
        assert!(chip
            .opcodes()
            .iter()
            .all(|op| matches!(*op, opcodes::RDSR | opcodes::RDSR2)));
    }

    #[test]
    fn test_recipe_writes_bit_alone() {
        let mut chip = SimChip::for_chip(WINBOND);
        chip.set_status(StatusRegister::Status1, 0x1C);
        Recipe::S9Sr1Write16.set(&mut chip, Commit::Volatile).unwrap();
        let write = chip
            .transactions()
            .iter()
            .find(|t| t.opcode == opcodes::WRSR)
            .unwrap();
        assert_eq!(write.data, [0x00, 0x02]);
    }

    #[test]
    fn test_recipe_verifies_by_read_back() {
        // 2-byte writes bounce off a GigaDevice part
        let mut chip = SimChip::for_chip(GIGADEVICE);
        assert_eq!(
            Recipe::S9Sr1Write16.set(&mut chip, Commit::Volatile),
            Err(Error::VerifyFailed)
        );
        assert!(!chip.wel());
        assert_eq!(Recipe::S9Sr2Write8.set(&mut chip, Commit::Volatile), Ok(()));
    }

    #[test]
    fn test_recipe_clear() {
        let mut chip = SimChip::for_chip(EON);
        Recipe::S6Sr1Write8.set(&mut chip, Commit::NonVolatile).unwrap();
        assert_eq!(chip.non_volatile(StatusRegister::Status1), 0x40);
        Recipe::S6Sr1Write8.clear(&mut chip, Commit::NonVolatile).unwrap();
        assert_eq!(chip.non_volatile(StatusRegister::Status1), 0x00);

        chip.clear_log();
        Recipe::S6Sr1Write8.clear(&mut chip, Commit::NonVolatile).unwrap();
        assert_eq!(chip.status_writes(), 0);
    }

    #[test]
    fn test_reclaim_winbond() {
        let mut chip = SimChip::for_chip(WINBOND);
        let (ok, pins) = reclaim(&mut chip);
        assert!(ok);
        assert_eq!(chip.status(StatusRegister::Status2) & opcodes::SR2_QE, opcodes::SR2_QE);
        assert_eq!(chip.non_volatile(StatusRegister::Status2), 0);
        assert_eq!(pins.inputs(), [GPIO_WP, GPIO_HOLD]);
        assert_eq!(chip.opcodes().first(), Some(&opcodes::RDID));
        assert_eq!(chip.opcodes().last(), Some(&opcodes::WRDI));
    }

    #[test]
    fn test_reclaim_gigadevice_and_d8() {
        for id in [GIGADEVICE, MYSTERY_D8] {
            let mut chip = SimChip::for_chip(id);
            let (ok, pins) = reclaim(&mut chip);
            assert!(ok, "0x{:06X}", id);
            assert_eq!(chip.count(opcodes::WRSR), 0);
            assert_eq!(chip.count(opcodes::WRSR2), 1);
            assert!(pins.is_input(GPIO_WP) && pins.is_input(GPIO_HOLD));
        }
    }

    #[test]
    fn test_reclaim_eon_persists() {
        let mut chip = SimChip::for_chip(EON);
        let (ok, _) = reclaim(&mut chip);
        assert!(ok);
        assert_eq!(chip.non_volatile(StatusRegister::Status1), opcodes::SR1_QE_S6);

        // Next boot finds the bit already set
        chip.power_cycle();
        chip.clear_log();
        let (ok, pins) = reclaim(&mut chip);
        assert!(ok);
        assert_eq!(chip.status_writes(), 0);
        assert_eq!(pins.inputs().len(), 2);
    }

    #[test]
    fn test_reclaim_xmc_restores_sr3() {
        let mut chip = SimChip::for_chip(XMC);
        let (ok, _) = reclaim(&mut chip);
        assert!(ok);
        assert_eq!(chip.count(opcodes::WRSR3), 1);
        let restore = chip
            .transactions()
            .iter()
            .find(|t| t.opcode == opcodes::WRSR3)
            .unwrap();
        assert_eq!(restore.data, [0x60]);
        assert_eq!(chip.status(StatusRegister::Status3), 0x60);
    }

    #[test]
    fn test_reclaim_xmc_restore_failure_still_succeeds() {
        let mut chip = SimChip::for_chip(XMC);
        chip.fail_opcode(opcodes::WRSR3);
        let (ok, pins) = reclaim(&mut chip);
        assert!(ok);
        assert_eq!(chip.count(opcodes::WRSR3), 1);
        assert_eq!(chip.status(StatusRegister::Status3), 0x00);
        assert_eq!(pins.inputs().len(), 2);
    }

    #[test]
    fn test_reclaim_xmc_without_anomaly_skips_restore() {
        let mut config = SimConfig::for_chip(ChipId::new(XMC));
        config.quirks = Quirks::empty();
        let mut chip = SimChip::new(config);
        let (ok, _) = reclaim(&mut chip);
        assert!(ok);
        assert_eq!(chip.count(opcodes::WRSR3), 0);
    }

    #[test]
    fn test_quad_mode_gate() {
        for mode in [IoMode::QuadIo, IoMode::QuadOut] {
            let mut chip = SimChip::for_chip(WINBOND);
            chip.set_io_mode(mode);
            let mut pins = SimPins::new();
            let result = Reclaimer::default().try_reclaim_pins(&mut chip, &mut pins);
            assert_eq!(result, Err(Error::QuadModeActive));
            assert!(chip.transactions().is_empty());
            assert!(pins.inputs().is_empty());
        }
    }

    #[test]
    fn test_invalid_id_not_reclaimed() {
        let mut chip = SimChip::for_chip(WINBOND);
        chip.fail_opcode(opcodes::RDID);
        let mut pins = SimPins::new();
        let result = Reclaimer::default().try_reclaim_pins(&mut chip, &mut pins);
        assert_eq!(
            result,
            Err(Error::UnsupportedVendor {
                vendor: 0xFF,
                memory_type: 0xFF
            })
        );
        assert!(pins.inputs().is_empty());
        assert_eq!(chip.status_writes(), 0);
        assert_eq!(chip.opcodes().last(), Some(&opcodes::WRDI));
    }

    #[test]
    fn test_unknown_chip_not_reclaimed() {
        let mut chip = SimChip::for_chip(0x16709D);
        let (ok, pins) = reclaim(&mut chip);
        assert!(!ok);
        assert!(pins.inputs().is_empty());
    }

    #[test]
    fn test_capacity_zero_ids_follow_table_keys() {
        // No row for vendor 0x14, and EON rows are keyed on type 0x30
        for id in [0x004014, 0x00401C] {
            let mut chip = SimChip::for_chip(id);
            let (ok, pins) = reclaim(&mut chip);
            assert!(!ok, "{:06X}", id);
            assert!(pins.inputs().is_empty());
            assert_eq!(chip.status_writes(), 0);
        }

        let mut chip = SimChip::for_chip(0x00301C);
        let (ok, _) = reclaim(&mut chip);
        assert!(ok);
        assert_eq!(chip.non_volatile(StatusRegister::Status1) & 0x40, 0x40);
    }

    #[test]
    fn test_disabled_group_not_reclaimed() {
        let mut chip = SimChip::for_chip(EON);
        let mut pins = SimPins::new();
        let config = ReclaimConfig {
            groups: VendorGroups::all() - VendorGroups::EON_WPDIS,
            ..ReclaimConfig::default()
        };
        assert!(!reclaim_pins(&mut chip, &mut pins, &config));
        assert_eq!(chip.status_writes(), 0);
        assert_eq!(chip.non_volatile(StatusRegister::Status1), 0);
    }

    #[test]
    fn test_stuck_wel_cleared_before_dispatch() {
        let mut chip = SimChip::for_chip(WINBOND);
        chip.set_wel(true);
        let (ok, _) = reclaim(&mut chip);
        assert!(ok);
        assert_eq!(
            &chip.opcodes()[..3],
            [opcodes::RDID, opcodes::RDSR, opcodes::WRDI]
        );
        // Still a volatile write
        assert_eq!(chip.non_volatile(StatusRegister::Status2), 0);
    }

    #[test]
    fn test_verify_failure_leaves_pins() {
        // Behaves like a GigaDevice part but identifies as Winbond
        let mut config = SimConfig::for_chip(ChipId::new(WINBOND));
        config.quirks = Quirks::NO_16BIT_WRITE;
        let mut chip = SimChip::new(config);
        let mut pins = SimPins::new();
        let result = Reclaimer::default().try_reclaim_pins(&mut chip, &mut pins);
        assert_eq!(result, Err(Error::VerifyFailed));
        assert!(pins.inputs().is_empty());
        assert!(!chip.wel());
    }

    #[test]
    fn test_early_boot_runs_in_critical_section() {
        let mut chip = SimChip::for_chip(WINBOND);
        let mut pins = SimPins::new();
        let config = ReclaimConfig {
            early_boot: true,
            ..ReclaimConfig::default()
        };
        assert!(reclaim_pins(&mut chip, &mut pins, &config));
        assert_eq!(chip.critical_entries(), 1);
        assert_eq!(chip.critical_depth(), 0);
        assert!(chip.transactions().iter().all(|t| t.in_critical));
    }

    #[test]
    fn test_critical_section_left_on_error() {
        let mut chip = SimChip::for_chip(WINBOND);
        chip.fail_opcode(opcodes::RDSR2);
        let mut pins = SimPins::new();
        let reclaimer = Reclaimer::new(&ReclaimConfig {
            early_boot: true,
            ..ReclaimConfig::default()
        });
        assert!(!reclaimer.reclaim_pins(&mut chip, &mut pins));
        assert_eq!(chip.critical_depth(), 0);
    }

    #[test]
    fn test_custom_dispatch() {
        let table = BuiltinTable::default();
        let custom = |bus: &mut SimChip, id: ChipId| match id.raw() {
            // EN25Q32C variant with WPDis at S6
            0x16331C => Recipe::S6Sr1Write8.set(bus, Commit::NonVolatile),
            _ => table.dispatch(bus, id),
        };
        let reclaimer = Reclaimer::with_dispatch(custom, false);

        let mut chip = SimChip::for_chip(0x16331C);
        let mut pins = SimPins::new();
        assert!(reclaimer.reclaim_pins(&mut chip, &mut pins));
        assert_eq!(chip.non_volatile(StatusRegister::Status1), 0x40);

        let mut chip = SimChip::for_chip(WINBOND);
        let mut pins = SimPins::new();
        assert!(reclaimer.reclaim_pins(&mut chip, &mut pins));
        assert_eq!(pins.inputs().len(), 2);
    }

    #[test]
    fn test_software_reset() {
        let mut chip = SimChip::for_chip(GIGADEVICE);
        protocol::write_status2(&mut chip, 0x02, Commit::Volatile).unwrap();
        chip.clear_log();

        protocol::software_reset(&mut chip).unwrap();
        assert_eq!(protocol::is_qe(&mut chip), Ok(false));
        let ops = chip.transactions();
        assert_eq!(ops[0].opcode, opcodes::RSTEN);
        assert_eq!(ops[1].opcode, opcodes::RST);
        assert!(ops[0].in_critical && ops[1].in_critical);
        assert!(!ops[2].in_critical);
        assert_eq!(chip.critical_depth(), 0);
    }

    #[test]
    fn test_software_reset_clears_non_volatile_qe_on_d8() {
        let mut chip = SimChip::for_chip(MYSTERY_D8);
        protocol::write_status2(&mut chip, 0x02, Commit::NonVolatile).unwrap();
        protocol::software_reset(&mut chip).unwrap();
        assert_eq!(protocol::is_qe(&mut chip), Ok(false));
        assert_eq!(chip.non_volatile(StatusRegister::Status2), 0);

        let mut chip = SimChip::for_chip(GIGADEVICE);
        protocol::write_status2(&mut chip, 0x02, Commit::NonVolatile).unwrap();
        protocol::software_reset(&mut chip).unwrap();
        assert_eq!(protocol::is_qe(&mut chip), Ok(true));
    }

    #[test]
    fn test_critical_section_guard_nesting() {
        let mut chip = SimChip::for_chip(WINBOND);
        {
            let mut outer = CriticalSection::enter(&mut chip);
            {
                let inner = CriticalSection::enter(&mut *outer);
                assert_eq!(inner.critical_depth(), 2);
            }
            assert_eq!(outer.critical_depth(), 1);
        }
        assert_eq!(chip.critical_depth(), 0);
        assert_eq!(chip.critical_entries(), 2);
    }

    #[test]
    fn test_sfdp_revision() {
        let mut chip = SimChip::for_chip(MYSTERY_D8);
        let info = sfdp::read_sfdp_revision(&mut chip);
        assert_eq!(info.header, SfdpRevision::new(1, 6));
        assert_eq!(info.table_dwords, 16);
        assert_eq!(info.table_pointer, 0x30);

        let mut chip = SimChip::for_chip(EON);
        assert!(sfdp::read_sfdp_revision(&mut chip).is_empty());

        let mut chip = SimChip::for_chip(WINBOND);
        chip.fail_opcode(opcodes::RDSFDP);
        assert!(sfdp::read_sfdp_revision(&mut chip).is_empty());
    }

    #[test]
    fn test_predicates() {
        let mut chip = SimChip::for_chip(WINBOND);
        assert_eq!(protocol::is_wel(&mut chip), Ok(false));
        chip.set_wel(true);
        assert_eq!(protocol::is_wel(&mut chip), Ok(true));
        assert_eq!(protocol::is_wip(&mut chip), Ok(false));
        chip.set_status(StatusRegister::Status1, 0x40);
        assert_eq!(protocol::is_s6_qe(&mut chip), Ok(true));
        assert_eq!(protocol::is_qe(&mut chip), Ok(false));
    }

    #[test]
    fn test_chip_erase_failure_returns() {
        let mut chip = SimChip::for_chip(WINBOND);
        chip.fail_opcode(opcodes::CE_60);
        assert_eq!(protocol::chip_erase(&mut chip), Err(Error::BusTransferFailed));
        assert!(!chip.erased());
    }
}
