//! Reclaim orchestrator
//!
//! [`Reclaimer::try_reclaim_pins`] runs the whole sequence:
//!
//! 1. refuse if the controller fetches in a quad mode (IO2/IO3 are data
//!    lines then), before any flash transaction;
//! 2. read the JEDEC ID;
//! 3. clear a write-enable latch left set by an earlier write the chip did
//!    not accept;
//! 4. hand the ID to the vendor dispatcher;
//! 5. send WRDI whatever the outcome;
//! 6. on success, switch GPIO9 and GPIO10 to input.
//!
//! There is no partial success: if anything fails the pins are not touched.

use crate::bus::{CriticalSection, FlashBus, PinControl, GPIO_HOLD, GPIO_WP};
use crate::error::{Error, Result};
use crate::protocol;
use crate::vendor::{BuiltinTable, VendorDispatch, VendorGroups};

/// Reclaim settings, evaluated once when the [`Reclaimer`] is built
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReclaimConfig {
    /// Vendor groups enabled in the built-in table
    pub groups: VendorGroups,
    /// Run the whole reclaim inside a [`CriticalSection`]
    ///
    /// Needed when called before the runtime has set up the flash cache,
    /// where an interrupt fetching from flash would land mid-sequence.
    pub early_boot: bool,
}

/// Runs the reclaim sequence with a given dispatcher
#[derive(Debug, Clone)]
pub struct Reclaimer<D = BuiltinTable> {
    dispatch: D,
    early_boot: bool,
}

impl Reclaimer<BuiltinTable> {
    /// Reclaimer using the built-in table restricted to `config.groups`
    pub fn new(config: &ReclaimConfig) -> Self {
        Self {
            dispatch: BuiltinTable::new(config.groups),
            early_boot: config.early_boot,
        }
    }
}

impl Default for Reclaimer<BuiltinTable> {
    fn default() -> Self {
        Self::new(&ReclaimConfig::default())
    }
}

impl<D> Reclaimer<D> {
    /// Reclaimer using a caller supplied dispatcher instead of the table
    pub fn with_dispatch(dispatch: D, early_boot: bool) -> Self {
        Self {
            dispatch,
            early_boot,
        }
    }

    /// The dispatcher in use
    pub fn dispatcher(&self) -> &D {
        &self.dispatch
    }

    /// Free /WP and /HOLD and hand GPIO9 and GPIO10 over as inputs
    pub fn try_reclaim_pins<B, P>(&self, bus: &mut B, pins: &mut P) -> Result<()>
    where
        B: FlashBus + ?Sized,
        P: PinControl + ?Sized,
        D: VendorDispatch<B>,
    {
        if self.early_boot {
            let mut guard = CriticalSection::enter(bus);
            self.run(&mut *guard, pins)
        } else {
            self.run(bus, pins)
        }
    }

    /// Same as [`Reclaimer::try_reclaim_pins`], reporting only success
    pub fn reclaim_pins<B, P>(&self, bus: &mut B, pins: &mut P) -> bool
    where
        B: FlashBus + ?Sized,
        P: PinControl + ?Sized,
        D: VendorDispatch<B>,
    {
        match self.try_reclaim_pins(bus, pins) {
            Ok(()) => true,
            Err(e) => {
                log::info!("GPIO9/GPIO10 not reclaimed: {}", e);
                false
            }
        }
    }

    fn run<B, P>(&self, bus: &mut B, pins: &mut P) -> Result<()>
    where
        B: FlashBus + ?Sized,
        P: PinControl + ?Sized,
        D: VendorDispatch<B>,
    {
        let mode = bus.io_mode();
        if mode.requires_quad() {
            log::warn!("Flash is accessed in {} mode, IO2/IO3 are not available", mode);
            return Err(Error::QuadModeActive);
        }

        let id = protocol::read_chip_id(bus);
        log::debug!("Flash chip ID: {}", id);

        match protocol::is_wel(bus) {
            Ok(true) => {
                // Usually a 16-bit status write from the boot ROM the chip
                // did not accept
                log::warn!("WEL bit found set, clearing with WRDI");
                if let Err(e) = protocol::write_disable(bus) {
                    log::debug!("WRDI failed: {}", e);
                }
            }
            Ok(false) => {}
            Err(e) => log::debug!("WEL check failed: {}", e),
        }

        let result = self.dispatch.dispatch(bus, id);

        if let Err(e) = protocol::write_disable(bus) {
            log::debug!("Final WRDI failed: {}", e);
        }
        result?;

        pins.set_input(GPIO_WP);
        pins.set_input(GPIO_HOLD);
        log::info!("GPIO{} and GPIO{} reclaimed", GPIO_WP, GPIO_HOLD);
        Ok(())
    }
}

/// Reclaim GPIO9 and GPIO10 using the built-in table
///
/// Returns true if both pins are now free. See [`Reclaimer`] to supply a
/// custom dispatcher or to learn why a reclaim failed.
pub fn reclaim_pins<B, P>(bus: &mut B, pins: &mut P, config: &ReclaimConfig) -> bool
where
    B: FlashBus + ?Sized,
    P: PinControl + ?Sized,
{
    Reclaimer::new(config).reclaim_pins(bus, pins)
}
