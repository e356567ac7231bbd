//! Probe command

use pinreclaim_core::protocol;
use pinreclaim_core::sfdp;
use pinreclaim_core::vendor::{ids, BuiltinTable, VendorGroups};
use pinreclaim_dummy::SimChip;
use std::error::Error;

use crate::config::Settings;

/// Identify the chip and show which recipe the table would pick
pub fn run(chip: &mut SimChip, settings: &Settings) -> Result<(), Box<dyn Error>> {
    let id = protocol::read_chip_id(chip);
    if id.is_invalid() {
        return Err("Failed to read the JEDEC ID".into());
    }

    println!("JEDEC ID:   {}", id);
    println!(
        "Vendor:     0x{:02X} ({}){}",
        id.vendor(),
        ids::vendor_name(id.vendor()).unwrap_or("unknown"),
        if id.vendor_parity_ok() {
            ""
        } else {
            ", bad parity"
        }
    );
    println!("Type:       0x{:02X}", id.memory_type());
    match id.capacity_bytes() {
        Some(bytes) => println!("Capacity:   {} KiB", bytes / 1024),
        None => println!("Capacity:   unknown (code 0x{:02X})", id.capacity_code()),
    }
    println!("I/O mode:   {}", settings.sim.io_mode);
    println!("SFDP:       {}", sfdp::read_sfdp_revision(chip));

    let table = BuiltinTable::new(settings.reclaim.groups);
    match table.lookup(id) {
        Some(entry) => println!(
            "Recipe:     {}, {}{} [{}]",
            entry.plan.recipe,
            entry.plan.commit.name(),
            if entry.plan.restore_sr3 {
                ", SR3 restored"
            } else {
                ""
            },
            entry.group.name().unwrap_or("?")
        ),
        None => {
            let disabled = BuiltinTable::new(VendorGroups::all()).lookup(id);
            match disabled {
                Some(entry) => println!(
                    "Recipe:     none, group '{}' is disabled",
                    entry.group.name().unwrap_or("?")
                ),
                None => println!("Recipe:     none, a custom handler is needed"),
            }
        }
    }
    Ok(())
}
