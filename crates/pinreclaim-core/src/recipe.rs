//! Quad Enable recipes
//!
//! Freeing /WP and /HOLD comes down to setting one status register bit,
//! either QE at S9 (SR2 bit 1) or QE/WPDis at S6 (SR1 bit 6), using a write
//! the chip actually honours. A [`Recipe`] names one such combination of
//! bit position and write command.
//!
//! Every recipe:
//!
//! 1. reads the target bit and returns early if it already has the wanted
//!    value, so a non-volatile bit set on an earlier boot costs no writes;
//! 2. writes a value holding the target bit alone (the boot ROM writes the
//!    status registers the same way, so no other bit is worth preserving);
//! 3. reads the register back and fails with [`Error::VerifyFailed`] unless
//!    the bit changed. The write's own return code is not evidence.

use core::fmt;

use crate::bus::FlashBus;
use crate::error::{Error, Result};
use crate::protocol::{self, Commit};
use crate::spi::opcodes;

/// Position of the bit that disables /WP and /HOLD
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QeBit {
    /// SR1 bit 6 (QE on some parts, WPDis on EON)
    S6,
    /// SR2 bit 1, bit 9 of the 16-bit SR1+SR2 value
    S9,
}

/// A bit position paired with the write command used to change it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Recipe {
    /// QE/WPDis at S6 through an 8-bit SR1 write (01h)
    S6Sr1Write8,
    /// QE at S9 through an 8-bit SR2 write (31h)
    S9Sr2Write8,
    /// QE at S9 through a legacy 16-bit SR1+SR2 write (01h)
    S9Sr1Write16,
}

impl Recipe {
    /// All recipes
    pub const ALL: [Recipe; 3] = [Self::S6Sr1Write8, Self::S9Sr2Write8, Self::S9Sr1Write16];

    /// Bit this recipe changes
    pub const fn bit(self) -> QeBit {
        match self {
            Self::S6Sr1Write8 => QeBit::S6,
            Self::S9Sr2Write8 | Self::S9Sr1Write16 => QeBit::S9,
        }
    }

    /// Short name, as accepted by the command line
    pub const fn name(self) -> &'static str {
        match self {
            Self::S6Sr1Write8 => "s6-sr1-8",
            Self::S9Sr2Write8 => "s9-sr2-8",
            Self::S9Sr1Write16 => "s9-sr1-16",
        }
    }

    /// Look up a recipe by its short name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.name() == name)
    }

    /// Read the target bit
    pub fn is_set<B: FlashBus + ?Sized>(self, bus: &mut B) -> Result<bool> {
        match self {
            Self::S6Sr1Write8 => {
                let sr1 = protocol::read_status1(bus)?;
                Ok(sr1 & opcodes::SR1_QE_S6 != 0)
            }
            Self::S9Sr2Write8 => {
                let sr2 = protocol::read_status2(bus)?;
                Ok(sr2 & opcodes::SR2_QE != 0)
            }
            Self::S9Sr1Write16 => {
                let sr12 = protocol::read_status_registers_16(bus)?;
                Ok(sr12 & opcodes::SR12_QE_S9 != 0)
            }
        }
    }

    fn write<B: FlashBus + ?Sized>(self, bus: &mut B, set: bool, commit: Commit) -> Result<()> {
        match self {
            Self::S6Sr1Write8 => {
                let value = if set { opcodes::SR1_QE_S6 } else { 0 };
                protocol::write_status1(bus, value, commit)
            }
            Self::S9Sr2Write8 => {
                let value = if set { opcodes::SR2_QE } else { 0 };
                protocol::write_status2(bus, value, commit)
            }
            Self::S9Sr1Write16 => {
                let value = if set { opcodes::SR12_QE_S9 } else { 0 };
                protocol::write_status_registers_16(bus, value, commit)
            }
        }
    }

    fn verify<B: FlashBus + ?Sized>(self, bus: &mut B) -> Result<bool> {
        let set = match self.bit() {
            QeBit::S6 => protocol::is_s6_qe(bus)?,
            QeBit::S9 => protocol::is_qe(bus)?,
        };
        log::debug!("  {} bit {} set", self.bit(), if set { "confirmed" } else { "NOT" });
        Ok(set)
    }

    fn drive<B: FlashBus + ?Sized>(self, bus: &mut B, set: bool, commit: Commit) -> Result<()> {
        let current = self.is_set(bus)?;
        log::debug!("  {} bit {} set", self.bit(), if current { "confirmed" } else { "NOT" });
        if current == set {
            return Ok(());
        }

        log::debug!(
            "  {} {} {} bit - {}-bit write",
            if set { "Setting" } else { "Clearing" },
            commit.name(),
            self.bit(),
            self.width_bits()
        );
        if let Err(e) = self.write(bus, set, commit) {
            // Not conclusive, some parts report errors for writes they took
            log::debug!("  status write reported: {}", e);
        }

        if self.verify(bus)? == set {
            Ok(())
        } else {
            Err(Error::VerifyFailed)
        }
    }

    /// Set the target bit, verifying by read-back
    pub fn set<B: FlashBus + ?Sized>(self, bus: &mut B, commit: Commit) -> Result<()> {
        self.drive(bus, true, commit)
    }

    /// Clear the target bit, verifying by read-back
    pub fn clear<B: FlashBus + ?Sized>(self, bus: &mut B, commit: Commit) -> Result<()> {
        self.drive(bus, false, commit)
    }

    const fn width_bits(self) -> u32 {
        match self {
            Self::S6Sr1Write8 | Self::S9Sr2Write8 => 8,
            Self::S9Sr1Write16 => 16,
        }
    }
}

impl fmt::Display for QeBit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::S6 => f.write_str("S6/QE/WPDis"),
            Self::S9 => f.write_str("QE/S9"),
        }
    }
}

impl fmt::Display for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::S6Sr1Write8 => f.write_str("set S6 via 8-bit SR1 write"),
            Self::S9Sr2Write8 => f.write_str("set S9 via 8-bit SR2 write"),
            Self::S9Sr1Write16 => f.write_str("set S9 via 16-bit SR1+SR2 write"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipe_names_round_trip() {
        for recipe in Recipe::ALL {
            assert_eq!(Recipe::from_name(recipe.name()), Some(recipe));
        }
        assert_eq!(Recipe::from_name("s9-sr3-8"), None);
    }

    #[test]
    fn test_recipe_bits() {
        assert_eq!(Recipe::S6Sr1Write8.bit(), QeBit::S6);
        assert_eq!(Recipe::S9Sr2Write8.bit(), QeBit::S9);
        assert_eq!(Recipe::S9Sr1Write16.bit(), QeBit::S9);
    }
}
