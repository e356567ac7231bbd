//! Bus controller trait definitions

use crate::error::Result;
use crate::spi::{IoMode, SpiCommand};
use bitflags::bitflags;

bitflags! {
    /// Bus controller feature flags
    ///
    /// These flags describe how the controller is currently configured,
    /// not what the flash chip supports.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BusFeatures: u32 {
        /// Controller is set up for 2-byte status register writes
        const TWO_BYTE_STATUS = 1 << 0;
    }
}

impl Default for BusFeatures {
    fn default() -> Self {
        BusFeatures::empty()
    }
}

/// Saved cache and interrupt state, returned by [`FlashBus::enter_critical`]
///
/// The contents are platform defined; the core only hands the value back
/// to [`FlashBus::exit_critical`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestoreState(pub u32);

/// Flash bus controller trait
///
/// This trait represents the controller that owns the flash chip. The
/// production binding drives memory-mapped controller registers; tests use
/// an in-memory chip model.
///
/// Transactions are blocking and strictly sequential. The implementation is
/// assumed to be the only user of the bus while these calls run.
pub trait FlashBus {
    /// Get the current controller configuration
    fn features(&self) -> BusFeatures;

    /// I/O mode the controller uses for flash fetches
    fn io_mode(&self) -> IoMode;

    /// Execute a single SPI command
    ///
    /// The command is a complete transaction: opcode, optional address and
    /// dummy cycles, then the write or read data phase.
    fn execute(&mut self, cmd: &mut SpiCommand<'_>) -> Result<()>;

    /// Delay for the specified number of microseconds
    fn delay_us(&mut self, us: u32);

    /// Suspend the flash cache and mask interrupts
    ///
    /// Called before command sequences that must not be interleaved with
    /// fetches from the same flash. The default does nothing.
    fn enter_critical(&mut self) -> RestoreState {
        RestoreState::default()
    }

    /// Restore the state saved by [`FlashBus::enter_critical`]
    fn exit_critical(&mut self, _state: RestoreState) {}
}

/// GPIO control for the pins released by a successful reclaim
pub trait PinControl {
    /// Put `gpio` in the default input mode
    fn set_input(&mut self, gpio: u8);
}

/// GPIO number wired to flash /WP (IO2)
pub const GPIO_WP: u8 = 9;
/// GPIO number wired to flash /HOLD (IO3)
pub const GPIO_HOLD: u8 = 10;
