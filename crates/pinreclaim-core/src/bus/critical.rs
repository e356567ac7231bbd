//! Scoped cache-disable / interrupt-mask section

use core::ops::{Deref, DerefMut};

use super::{FlashBus, RestoreState};

/// Guard holding the bus inside a critical section
///
/// Created with [`CriticalSection::enter`]. The saved state is restored when
/// the guard is dropped, so every exit path (including `?` early returns)
/// leaves the cache and interrupt state as it was found. The guard derefs to
/// the bus so commands are issued through it.
pub struct CriticalSection<'a, B: FlashBus + ?Sized> {
    bus: &'a mut B,
    state: RestoreState,
}

impl<'a, B: FlashBus + ?Sized> CriticalSection<'a, B> {
    /// Suspend cache and interrupts for the lifetime of the guard
    pub fn enter(bus: &'a mut B) -> Self {
        let state = bus.enter_critical();
        log::trace!("critical section entered (state 0x{:08X})", state.0);
        Self { bus, state }
    }
}

impl<B: FlashBus + ?Sized> Deref for CriticalSection<'_, B> {
    type Target = B;

    fn deref(&self) -> &B {
        self.bus
    }
}

impl<B: FlashBus + ?Sized> DerefMut for CriticalSection<'_, B> {
    fn deref_mut(&mut self) -> &mut B {
        self.bus
    }
}

impl<B: FlashBus + ?Sized> Drop for CriticalSection<'_, B> {
    fn drop(&mut self) {
        self.bus.exit_critical(self.state);
        log::trace!("critical section left");
    }
}
