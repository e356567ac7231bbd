//! Reclaim command

use pinreclaim_core::protocol;
use pinreclaim_core::Reclaimer;
use pinreclaim_dummy::{SimChip, SimPins};
use std::error::Error;

use super::status::format_status;
use crate::config::Settings;

/// Run the reclaim over `boots` simulated boots
///
/// Volatile recipes write on every boot, non-volatile ones only on the
/// first; the per-boot write count shows the difference.
pub fn run(chip: &mut SimChip, settings: &Settings, boots: u32) -> Result<(), Box<dyn Error>> {
    let reclaimer = Reclaimer::new(&settings.reclaim);

    for boot in 1..=boots.max(1) {
        if boot > 1 {
            chip.power_cycle();
        }
        chip.clear_log();

        let mut pins = SimPins::new();
        let result = reclaimer.try_reclaim_pins(chip, &mut pins);
        let writes = chip.status_writes();
        let transactions = chip.transactions().len();

        let status = protocol::read_status_registers_24(chip)?;
        println!(
            "Boot {}: {} ({} transactions, {} status writes) {}",
            boot,
            match &result {
                Ok(()) => "GPIO9/GPIO10 reclaimed".to_string(),
                Err(e) => format!("not reclaimed: {}", e),
            },
            transactions,
            writes,
            format_status(status)
        );
        if boot == boots.max(1) {
            result?;
        }
    }
    Ok(())
}
